//! Recovering a secret from a carrier.
//!
//! Mirror of the encoder: extract the envelope bits under the carrier-derived
//! permutation, then parse and decrypt the envelope with the private key. The
//! carrier is never mutated.

use rsa::RsaPrivateKey;
use thiserror::Error;

use crate::carrier::Carrier;
use crate::envelope::{self, EnvelopeError};
use crate::stego::{self, StegoError};

/// Errors that can occur while extracting a secret.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Stego(#[from] StegoError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// A recovered secret and the filename it was stored under.
#[derive(Debug, Clone)]
pub struct ExtractedSecret {
    /// The secret file contents.
    pub data: Vec<u8>,
    /// The original filename embedded alongside the data.
    pub filename: String,
}

/// Extracts the secret hidden in `carrier` using the recipient's private key.
pub fn extract<C: Carrier + ?Sized>(
    carrier: &C,
    private_key: &RsaPrivateKey,
) -> Result<ExtractedSecret, ExtractError> {
    let envelope = stego::extract(carrier)?;
    let (data, filename) = envelope::parse(&envelope, private_key)?;

    Ok(ExtractedSecret { data, filename })
}
