//! Authenticated encryption of session records.
//!
//! A `Session` is serialized to JSON, encrypted with AES-256-GCM under a key
//! derived from the cookie password, and encoded as
//! `base64url(nonce || ciphertext)`. GCM's auth tag covers the whole record,
//! so a tampered or truncated blob fails to unseal.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use super::types::Session;

const NONCE_SIZE: usize = 12;

/// Minimum cookie password length. Anything shorter gives less than the
/// 256 bits of input the key derivation expects from a generated secret.
pub const MIN_COOKIE_PASSWORD_LENGTH: usize = 32;

/// Opaque seal/unseal failure.
///
/// Deliberately carries no detail: whether decoding, decryption, or
/// deserialization failed, the caller treats the blob as "no session".
#[derive(Debug)]
pub struct SealError;

impl std::fmt::Display for SealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid session blob")
    }
}

impl std::error::Error for SealError {}

/// Seals and unseals session cookies with a shared secret.
#[derive(Clone)]
pub struct Sealer {
    cipher: Aes256Gcm,
}

impl Sealer {
    /// Create a sealer from the cookie password.
    /// The 256-bit cipher key is the SHA-256 digest of the password.
    pub fn new(password: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        Self {
            cipher: Aes256Gcm::new(&key.into()),
        }
    }

    /// Seal a session into an opaque cookie-safe string.
    pub fn seal(&self, session: &Session) -> Result<String, SealError> {
        let plaintext = serde_json::to_vec(session).map_err(|_| SealError)?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|_| SealError)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(blob))
    }

    /// Unseal a cookie value back into a session.
    pub fn unseal(&self, sealed: &str) -> Result<Session, SealError> {
        let blob = URL_SAFE_NO_PAD.decode(sealed).map_err(|_| SealError)?;
        if blob.len() <= NONCE_SIZE {
            return Err(SealError);
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SealError)?;

        serde_json::from_slice(&plaintext).map_err(|_| SealError)
    }
}
