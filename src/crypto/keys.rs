//! RSA key material.
//!
//! Recipient keys come from PEM files: public keys in SPKI ("PUBLIC KEY") or
//! PKCS#1 ("RSA PUBLIC KEY") form, private keys in PKCS#8 ("PRIVATE KEY"),
//! passphrase-protected PKCS#8 ("ENCRYPTED PRIVATE KEY"), or PKCS#1 form.
//! Generated pairs are written as `<prefix>.pub` / `<prefix>.key`.

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default modulus size for generated keys, in bits.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Errors that can occur while loading, saving, or generating keys.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid public key in {path}: {reason}")]
    InvalidPublicKey { path: PathBuf, reason: String },

    #[error("Invalid private key in {path}: {reason}")]
    InvalidPrivateKey { path: PathBuf, reason: String },

    #[error("Private key in {path} is passphrase-protected; supply a passphrase")]
    PassphraseRequired { path: PathBuf },

    #[error("Key generation failed: {0}")]
    GenerationFailed(String),

    #[error("Key encoding failed: {0}")]
    EncodingFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads an RSA public key from a PEM file (SPKI, falling back to PKCS#1).
pub fn load_public_key(path: &Path) -> Result<RsaPublicKey, KeyError> {
    let pem = fs::read_to_string(path)?;

    if let Ok(key) = RsaPublicKey::from_public_key_pem(&pem) {
        return Ok(key);
    }

    RsaPublicKey::from_pkcs1_pem(&pem).map_err(|e| KeyError::InvalidPublicKey {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Loads an RSA private key from a PEM file.
///
/// Encrypted PKCS#8 keys require `passphrase`; unencrypted PKCS#8 and PKCS#1
/// keys ignore it.
pub fn load_private_key(
    path: &Path,
    passphrase: Option<&str>,
) -> Result<RsaPrivateKey, KeyError> {
    let pem = fs::read_to_string(path)?;
    let encrypted = pem.contains("ENCRYPTED PRIVATE KEY");

    if encrypted {
        let Some(pass) = passphrase else {
            return Err(KeyError::PassphraseRequired {
                path: path.to_path_buf(),
            });
        };
        return RsaPrivateKey::from_pkcs8_encrypted_pem(&pem, pass).map_err(|e| {
            KeyError::InvalidPrivateKey {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        });
    }

    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(&pem) {
        return Ok(key);
    }

    RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|e| KeyError::InvalidPrivateKey {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// An RSA key pair.
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose private key material in debug output
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

impl KeyPair {
    /// Generates a fresh key pair with a modulus of `bits` bits.
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| KeyError::GenerationFailed(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Returns the public half.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Returns the private half.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Writes `<prefix>.pub` and `<prefix>.key`.
    ///
    /// The private PEM is PKCS#5-encrypted when a passphrase is given.
    /// Returns the two paths written, public first.
    pub fn save_to_files(
        &self,
        prefix: &Path,
        passphrase: Option<&str>,
    ) -> Result<(PathBuf, PathBuf), KeyError> {
        let pub_path = prefix.with_extension("pub");
        let key_path = prefix.with_extension("key");

        let public_pem = self
            .public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::EncodingFailed(e.to_string()))?;
        fs::write(&pub_path, public_pem)?;

        let private_pem = match passphrase {
            Some(pass) => self
                .private
                .to_pkcs8_encrypted_pem(&mut OsRng, pass, LineEnding::LF)
                .map_err(|e| KeyError::EncodingFailed(e.to_string()))?,
            None => self
                .private
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| KeyError::EncodingFailed(e.to_string()))?,
        };
        fs::write(&key_path, private_pem.as_bytes())?;

        Ok((pub_path, key_path))
    }
}
