//! Cryptographic operations.
//!
//! The secret never meets RSA directly. A random 256-bit session key is
//! wrapped with RSA-OAEP; the payload itself is encrypted with AES-256-CBC
//! under a key derived from the session key with PBKDF2. Payload size thus
//! stays independent of the RSA modulus, and the derived AES key never
//! travels: only its inputs do, recoverable solely by the private-key holder.

pub mod compression;
pub mod keys;

pub use compression::{compress, decompress, CompressionError};
pub use keys::{load_private_key, load_public_key, KeyError, KeyPair, DEFAULT_KEY_BITS};

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Session key length in bytes.
pub const SESSION_KEY_LEN: usize = 32;

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;

/// AES-CBC IV length in bytes.
pub const IV_LEN: usize = 16;

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 200_000;

/// Errors that can occur during hybrid encryption.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// RSA unwrap, key derivation, and AES unpadding failures all collapse
    /// into this one variant so callers cannot tell which step failed.
    #[error("Decryption failed: wrong key or corrupted payload")]
    DecryptionFailed,
}

/// Output of [`encrypt`]: the wrapped session key and the symmetric
/// parameters that must travel alongside the ciphertext.
pub struct SealedPayload {
    /// RSA-OAEP ciphertext of the session key; as wide as the RSA modulus.
    pub wrapped_key: Vec<u8>,
    /// PBKDF2 salt.
    pub salt: [u8; SALT_LEN],
    /// AES-CBC initialization vector.
    pub iv: [u8; IV_LEN],
    /// AES-256-CBC ciphertext of the PKCS#7-padded plaintext.
    pub ciphertext: Vec<u8>,
}

/// Encrypts `plaintext` for the holder of the key matching `public_key`.
pub fn encrypt(plaintext: &[u8], public_key: &RsaPublicKey) -> Result<SealedPayload, CryptoError> {
    let mut session_key = [0u8; SESSION_KEY_LEN];
    OsRng.fill_bytes(&mut session_key);

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_cipher_key(&session_key, &salt);

    let ciphertext =
        Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    // The session key is wrapped, never the derived AES key
    let wrapped_key = public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &session_key)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(SealedPayload {
        wrapped_key,
        salt,
        iv,
        ciphertext,
    })
}

/// Inverse of [`encrypt`].
pub fn decrypt(
    wrapped_key: &[u8],
    salt: &[u8; SALT_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let session_key = private_key
        .decrypt(Oaep::new::<Sha256>(), wrapped_key)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    let key = derive_cipher_key(&session_key, salt);

    Aes256CbcDec::new(&key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Derives the AES-256 key from the session key and salt.
fn derive_cipher_key(session_key: &[u8], salt: &[u8; SALT_LEN]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(session_key, salt, PBKDF2_ROUNDS, &mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keypair() -> KeyPair {
        KeyPair::generate(1024).unwrap()
    }

    #[test]
    fn roundtrip() {
        let pair = test_keypair();
        let plaintext = b"the eagle lands at midnight";

        let sealed = encrypt(plaintext, pair.public_key()).unwrap();
        let decrypted = decrypt(
            &sealed.wrapped_key,
            &sealed.salt,
            &sealed.iv,
            &sealed.ciphertext,
            pair.private_key(),
        )
        .unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn roundtrip_empty_plaintext() {
        let pair = test_keypair();

        let sealed = encrypt(b"", pair.public_key()).unwrap();
        // PKCS#7 always pads, so even an empty plaintext fills one block
        assert_eq!(sealed.ciphertext.len(), BLOCK_LEN);

        let decrypted = decrypt(
            &sealed.wrapped_key,
            &sealed.salt,
            &sealed.iv,
            &sealed.ciphertext,
            pair.private_key(),
        )
        .unwrap();

        assert!(decrypted.is_empty());
    }

    #[test]
    fn wrong_key_fails() {
        let pair = test_keypair();
        let other = test_keypair();

        let sealed = encrypt(b"secret", pair.public_key()).unwrap();
        let result = decrypt(
            &sealed.wrapped_key,
            &sealed.salt,
            &sealed.iv,
            &sealed.ciphertext,
            other.private_key(),
        );

        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn tampered_wrapped_key_fails() {
        let pair = test_keypair();

        let mut sealed = encrypt(b"secret", pair.public_key()).unwrap();
        sealed.wrapped_key[0] ^= 0xFF;

        let result = decrypt(
            &sealed.wrapped_key,
            &sealed.salt,
            &sealed.iv,
            &sealed.ciphertext,
            pair.private_key(),
        );

        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn derived_key_is_deterministic() {
        let session_key = [7u8; SESSION_KEY_LEN];
        let salt = [3u8; SALT_LEN];

        assert_eq!(
            derive_cipher_key(&session_key, &salt),
            derive_cipher_key(&session_key, &salt)
        );
    }

    #[test]
    fn fresh_randomness_per_call() {
        let pair = test_keypair();

        let a = encrypt(b"same input", pair.public_key()).unwrap();
        let b = encrypt(b"same input", pair.public_key()).unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
