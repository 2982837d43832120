//! Carrier media.
//!
//! A carrier is any medium exposing a fixed-length sequence of integer sample
//! cells the bit engine can address: image pixels (red channel only) or PCM
//! audio samples. The adapters here own the decoded media plus the container
//! metadata needed to re-encode it; the engine sees nothing but [`Carrier`].

pub mod audio;
pub mod image;

pub use audio::AudioCarrier;
pub use image::ImageCarrier;

use thiserror::Error;

/// Errors that can occur while loading or saving carrier media.
#[derive(Error, Debug)]
pub enum CarrierError {
    #[error("Unsupported carrier format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load carrier: {0}")]
    LoadFailed(String),

    #[error("Failed to save carrier: {0}")]
    SaveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Addressable-cell view of a carrier medium.
///
/// Cells are indexed `0..capacity`. Embedding mutates bit 0 of a cell through
/// [`flip_lsb`](Carrier::flip_lsb); bit 1 is only ever read, serving as the
/// pseudo-random mask for LSB matching. The seed must be derivable from the
/// carrier alone, so encoder and decoder agree without any extra storage.
pub trait Carrier {
    /// Number of addressable cells.
    fn capacity(&self) -> usize;

    /// Permutation seed derived from carrier metadata.
    fn seed(&self) -> u64;

    /// Bit 0 of the cell at `idx`.
    fn lsb(&self, idx: usize) -> u8;

    /// Bit 1 of the cell at `idx`.
    fn mask_bit(&self, idx: usize) -> u8;

    /// Flips bit 0 of the cell at `idx`.
    fn flip_lsb(&mut self, idx: usize);
}
