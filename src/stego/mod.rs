//! Bit embedding and extraction.
//!
//! The envelope travels through the carrier one bit per cell, in the order
//! given by the seeded permutation: first a 64-bit big-endian length header,
//! then the envelope bytes MSB-first. Instead of overwriting the least
//! significant bit with the payload bit outright, each cell's bit 1 acts as a
//! mask: bit 0 receives `payload_bit XOR bit1`, flipped only when it already
//! differs. Bit 1 is read but never written, so extraction rebuilds the same
//! mask, and the flip decision follows the carrier's own noise rather than
//! the payload.

pub mod permute;

pub use permute::permutation;

use thiserror::Error;

use crate::carrier::Carrier;

/// Cells reserved for the 64-bit envelope-length header.
pub const HEADER_CELLS: usize = 64;

/// Errors that can occur during embedding or extraction.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Carrier too small: need {required} cells, have {available}")]
    InsufficientCapacity { required: u64, available: usize },

    #[error(
        "Recovered payload length of {claimed} bytes exceeds carrier capacity; \
         wrong carrier or mismatched permutation seed"
    )]
    LengthOutOfBounds { claimed: u64 },
}

/// Number of cells an envelope of `envelope_len` bytes occupies, header
/// included. `None` when the count overflows.
pub fn required_cells(envelope_len: u64) -> Option<u64> {
    envelope_len
        .checked_mul(8)
        .and_then(|bits| bits.checked_add(HEADER_CELLS as u64))
}

/// Embeds `envelope` into `carrier`.
///
/// The capacity check runs before the permutation is generated and before any
/// cell is touched; on error the carrier is left unmodified.
pub fn embed<C: Carrier + ?Sized>(carrier: &mut C, envelope: &[u8]) -> Result<(), StegoError> {
    let available = carrier.capacity();
    let required = required_cells(envelope.len() as u64).ok_or(StegoError::InsufficientCapacity {
        required: u64::MAX,
        available,
    })?;
    if required > available as u64 {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }

    let perm = permutation(carrier.seed(), available);

    let file_size = envelope.len() as u64;
    for i in 0..HEADER_CELLS {
        let bit = ((file_size >> (63 - i)) & 1) as u8;
        write_bit(carrier, perm[i], bit);
    }

    for (i, byte) in envelope.iter().enumerate() {
        for bit in 0..8 {
            let value = (byte >> (7 - bit)) & 1;
            write_bit(carrier, perm[HEADER_CELLS + i * 8 + bit], value);
        }
    }

    Ok(())
}

/// Recovers the envelope embedded in `carrier`.
pub fn extract<C: Carrier + ?Sized>(carrier: &C) -> Result<Vec<u8>, StegoError> {
    let available = carrier.capacity();
    if available < HEADER_CELLS {
        return Err(StegoError::InsufficientCapacity {
            required: HEADER_CELLS as u64,
            available,
        });
    }

    let perm = permutation(carrier.seed(), available);

    let mut file_size: u64 = 0;
    for i in 0..HEADER_CELLS {
        file_size = (file_size << 1) | u64::from(read_bit(carrier, perm[i]));
    }

    // A header produced with another seed or carrier decodes to noise; reject
    // implausible lengths before allocating anything
    let required =
        required_cells(file_size).ok_or(StegoError::LengthOutOfBounds { claimed: file_size })?;
    if required > available as u64 {
        return Err(StegoError::LengthOutOfBounds { claimed: file_size });
    }

    let mut envelope = vec![0u8; file_size as usize];
    for (i, byte) in envelope.iter_mut().enumerate() {
        for bit in 0..8 {
            *byte = (*byte << 1) | read_bit(carrier, perm[HEADER_CELLS + i * 8 + bit]);
        }
    }

    Ok(envelope)
}

fn write_bit<C: Carrier + ?Sized>(carrier: &mut C, idx: usize, bit: u8) {
    let want = bit ^ carrier.mask_bit(idx);
    if carrier.lsb(idx) != want {
        carrier.flip_lsb(idx);
    }
}

fn read_bit<C: Carrier + ?Sized>(carrier: &C, idx: usize) -> u8 {
    carrier.lsb(idx) ^ carrier.mask_bit(idx)
}
