//! Cookie sealing module
//!
//! Provides AES-256-GCM sealing for values stored in client cookies.
//! A sealed value cannot be read or altered by the client.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use rand::RngCore;
use thiserror::Error;

const NONCE_LEN: usize = 12;

/// Error types for sealing operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Cookie sealing service using AES-256-GCM
///
/// The sealed format is:
/// - 12 bytes nonce
/// - Encrypted data
/// - 16 bytes authentication tag (appended by AES-GCM)
///
/// The final output is URL-safe base64 without padding, so it can be
/// placed in a cookie value as is.
pub struct CookieSealer {
    cipher: Aes256Gcm,
}

impl CookieSealer {
    /// Create a new sealer with a 32-byte (256-bit) key
    pub fn new(key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(key.into());
        Self { cipher }
    }

    /// Create a new sealer from a URL-safe base64-encoded key
    ///
    /// Padded and unpadded encodings are both accepted.
    pub fn from_base64_key(key: &str) -> CryptoResult<Self> {
        let key = key.trim();
        let key_bytes = URL_SAFE
            .decode(key)
            .or_else(|_| URL_SAFE_NO_PAD.decode(key))
            .map_err(|e| CryptoError::Base64Error(e.to_string()))?;

        let key_array: [u8; 32] = key_bytes.try_into().map_err(|bytes: Vec<u8>| {
            CryptoError::InvalidKey(format!("Key must be 32 bytes, got {}", bytes.len()))
        })?;

        Ok(Self::new(&key_array))
    }

    /// Generate a new random 256-bit key
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        rand::rng().fill_bytes(&mut key);
        key
    }

    /// Generate a new random key and return it URL-safe base64 encoded
    pub fn generate_base64_key() -> String {
        URL_SAFE.encode(Self::generate_key())
    }

    /// Seal plaintext data
    pub fn seal(&self, plaintext: &str) -> CryptoResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(combined))
    }

    /// Open a value produced by [`CookieSealer::seal`]
    pub fn unseal(&self, sealed: &str) -> CryptoResult<String> {
        let combined = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|e| CryptoError::Base64Error(e.to_string()))?;

        if combined.len() < NONCE_LEN {
            return Err(CryptoError::InvalidData(
                "Ciphertext too short".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext_bytes) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext_bytes)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for CookieSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSealer").finish_non_exhaustive()
    }
}
