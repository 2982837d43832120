//! Hiding a secret inside a carrier.
//!
//! Orchestrates the encode path: compress and encrypt the secret under the
//! recipient's public key, assemble the envelope, and scatter it over the
//! carrier with the bit engine. The carrier is only mutated once the capacity
//! check has passed.

use rsa::RsaPublicKey;
use thiserror::Error;

use crate::carrier::Carrier;
use crate::envelope::{self, EnvelopeError};
use crate::stego::{self, StegoError};

/// Errors that can occur while hiding a secret.
#[derive(Error, Debug)]
pub enum HideError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Stego(#[from] StegoError),
}

/// Summary of a successful embedding.
#[derive(Debug, Clone, Copy)]
pub struct EmbedReport {
    /// Envelope size in bytes.
    pub envelope_len: usize,
    /// Cells carrying data, header included.
    pub cells_used: u64,
    /// Addressable cells in the carrier.
    pub capacity: usize,
}

/// Hides `secret` (stored under `filename`) inside `carrier` for the holder
/// of the private key matching `public_key`.
pub fn hide<C: Carrier + ?Sized>(
    carrier: &mut C,
    secret: &[u8],
    filename: &[u8],
    public_key: &RsaPublicKey,
) -> Result<EmbedReport, HideError> {
    let envelope = envelope::build(secret, filename, public_key)?;
    stego::embed(carrier, &envelope)?;

    let cells_used = stego::required_cells(envelope.len() as u64).unwrap_or(u64::MAX);

    Ok(EmbedReport {
        envelope_len: envelope.len(),
        cells_used,
        capacity: carrier.capacity(),
    })
}
