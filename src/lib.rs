//! # Veilbyte - hide encrypted files inside images and audio
//!
//! Veilbyte embeds an arbitrary secret file into a lossless image (PNG, BMP,
//! TGA, TIFF) or an integer-PCM WAV so that only the holder of the matching
//! RSA private key can recover it, while touching nothing but the least
//! significant bit of a pseudo-randomly permuted subset of carrier samples.
//!
//! ## How it works
//!
//! - The secret is zlib-compressed, encrypted with AES-256-CBC under a key
//!   derived (PBKDF2-HMAC-SHA256) from a random session key, and the session
//!   key is wrapped with RSA-OAEP. Everything is packed into a
//!   self-describing envelope together with the original filename.
//! - A permutation of all carrier cells, seeded by metadata the carrier
//!   itself discloses (image dimensions, audio frame count), decides which
//!   cell carries which bit. No state beyond the carrier is exchanged.
//! - Each bit lands in a cell's least significant bit masked by the cell's
//!   bit 1 (LSB matching): the LSB is flipped only when needed, and bit 1 is
//!   never written, so the decoder can rebuild the same mask.
//!
//! ## Example
//!
//! ```no_run
//! use veilbyte::crypto::KeyPair;
//! use veilbyte::{extract, hide, ImageCarrier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = KeyPair::generate(2048)?;
//!
//! let mut carrier = ImageCarrier::from_file("host.png".as_ref())?;
//! hide(&mut carrier, b"attack at dawn", b"orders.txt", keys.public_key())?;
//! carrier.save("host-secret.png".as_ref())?;
//!
//! let carrier = ImageCarrier::from_file("host-secret.png".as_ref())?;
//! let secret = extract(&carrier, keys.private_key())?;
//! assert_eq!(secret.filename, "orders.txt");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`carrier`]: image and audio carrier adapters
//! - [`crypto`]: hybrid cipher, compression, RSA key material
//! - [`envelope`]: the embedded payload format
//! - [`stego`]: permutation, bit engine, capacity planning
//! - [`encoder`] / [`decoder`]: end-to-end hide and extract
//! - [`quality`]: PSNR measurement

pub mod carrier;
pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod envelope;
pub mod quality;
pub mod stego;

// Re-export commonly used types at the crate root
pub use carrier::{AudioCarrier, Carrier, CarrierError, ImageCarrier};
pub use decoder::{extract, ExtractError, ExtractedSecret};
pub use encoder::{hide, EmbedReport, HideError};
pub use envelope::EnvelopeError;
pub use stego::{StegoError, HEADER_CELLS};
