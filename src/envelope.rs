//! Envelope codec.
//!
//! The envelope is the self-describing blob that actually gets embedded into a
//! carrier:
//!
//! | field | size |
//! |---|---|
//! | filename length | 4 bytes, big-endian |
//! | filename | variable |
//! | wrapped session key | RSA modulus size |
//! | salt | 16 bytes |
//! | iv | 16 bytes |
//! | ciphertext | remainder |
//!
//! The total envelope length travels out-of-band (the bit engine embeds it as
//! a 64-bit header), so the ciphertext needs no delimiter of its own. The
//! wrapped-key width is recovered from the private key modulus at parse time,
//! which makes a matching key size a hard precondition of [`parse`].

use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

use crate::crypto::{self, CompressionError, CryptoError, BLOCK_LEN, IV_LEN, SALT_LEN};

/// Errors that can occur while building or parsing an envelope.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Envelope truncated while reading {field}")]
    Truncated { field: &'static str },

    #[error("Filename of {len} bytes does not fit the length field")]
    FilenameTooLong { len: usize },

    #[error("Embedded filename is not valid UTF-8")]
    InvalidFilename,

    #[error(
        "Ciphertext length {len} is not a positive multiple of the cipher block size; \
         was the envelope built with a different RSA key size?"
    )]
    CiphertextMisaligned { len: usize },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// Builds the envelope for `secret` under the recipient's public key.
///
/// The secret is compressed, encrypted, and concatenated with the filename and
/// the symmetric parameters in wire order.
pub fn build(
    secret: &[u8],
    filename: &[u8],
    public_key: &RsaPublicKey,
) -> Result<Vec<u8>, EnvelopeError> {
    let filename_len = u32::try_from(filename.len()).map_err(|_| EnvelopeError::FilenameTooLong {
        len: filename.len(),
    })?;

    let compressed = crypto::compress(secret)?;
    let sealed = crypto::encrypt(&compressed, public_key)?;

    let mut envelope = Vec::with_capacity(
        4 + filename.len() + sealed.wrapped_key.len() + SALT_LEN + IV_LEN + sealed.ciphertext.len(),
    );
    envelope.extend_from_slice(&filename_len.to_be_bytes());
    envelope.extend_from_slice(filename);
    envelope.extend_from_slice(&sealed.wrapped_key);
    envelope.extend_from_slice(&sealed.salt);
    envelope.extend_from_slice(&sealed.iv);
    envelope.extend_from_slice(&sealed.ciphertext);

    Ok(envelope)
}

/// Parses an envelope and recovers the secret bytes and filename.
///
/// `private_key` must have the same modulus size as the public key the
/// envelope was built with; the wrapped-key field boundary depends on it.
pub fn parse(
    envelope: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<(Vec<u8>, String), EnvelopeError> {
    let mut cursor = Cursor::new(envelope);

    let len_bytes = cursor.take(4, "filename length")?;
    let filename_len =
        u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;

    let filename = cursor.take(filename_len, "filename")?;
    let filename =
        String::from_utf8(filename.to_vec()).map_err(|_| EnvelopeError::InvalidFilename)?;

    let wrapped_key = cursor.take(private_key.size(), "wrapped session key")?;

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(cursor.take(SALT_LEN, "salt")?);

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(cursor.take(IV_LEN, "iv")?);

    let ciphertext = cursor.rest();
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(EnvelopeError::CiphertextMisaligned {
            len: ciphertext.len(),
        });
    }

    let compressed = crypto::decrypt(wrapped_key, &salt, &iv, ciphertext, private_key)?;
    let secret = crypto::decompress(&compressed)?;

    Ok((secret, filename))
}

/// Forward-only view over the envelope bytes.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], EnvelopeError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(EnvelopeError::Truncated { field })?;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or(EnvelopeError::Truncated { field })?;
        self.pos = end;
        Ok(slice)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice
    }
}
