//! Passphrase-protected configuration documents.
//!
//! Envelopes carry base64 ciphertext, nonce and salt. The key is derived with
//! PBKDF2-HMAC-SHA256 and the payload sealed with AES-256-GCM, matching what
//! WebCrypto and the Python `cryptography` package produce for the same
//! parameters.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::Hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use crate::constants::{
    ENVELOPE_ALGORITHM, ENVELOPE_VERSION, KDF_ITERATIONS, KEY_LEN, NONCE_LEN, SALT_LEN,
};

/// Wrong passphrase and corrupted ciphertext are deliberately one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("decryption failed: wrong passphrase or corrupted data")]
pub struct DecryptionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("encryption failed")]
pub struct EncryptionError;

/// Wire form of an encrypted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub encrypted: bool,
    pub version: String,
    pub algorithm: String,
    pub data: String,
    pub iv: String,
    pub salt: String,
}

impl EncryptedEnvelope {
    /// Open this envelope with `passphrase`.
    ///
    /// # Errors
    ///
    /// Returns [`DecryptionError`] for any failure.
    pub fn open(&self, passphrase: &str) -> Result<String, DecryptionError> {
        decrypt(&self.data, &self.iv, &self.salt, passphrase)
    }
}

/// Structural check for an encrypted envelope.
#[must_use]
pub fn is_encrypted(raw: &Value) -> bool {
    let Some(fields) = raw.as_object() else {
        return false;
    };
    fields.get("encrypted").and_then(Value::as_bool) == Some(true)
        && ["version", "algorithm", "data", "iv", "salt"]
            .iter()
            .all(|key| fields.get(*key).is_some_and(Value::is_string))
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Option<[u8; KEY_LEN]> {
    let mut key = [0_u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, KDF_ITERATIONS, &mut key).ok()?;
    Some(key)
}

/// Decrypt base64 `data` using base64 `iv` and `salt`.
///
/// # Errors
///
/// Returns [`DecryptionError`] for malformed base64, a nonce of the wrong
/// length, an authentication failure, or non-UTF-8 plaintext.
pub fn decrypt(data: &str, iv: &str, salt: &str, passphrase: &str) -> Result<String, DecryptionError> {
    let ciphertext = STANDARD.decode(data).map_err(|_| DecryptionError)?;
    let nonce = STANDARD.decode(iv).map_err(|_| DecryptionError)?;
    let salt = STANDARD.decode(salt).map_err(|_| DecryptionError)?;
    if nonce.len() != NONCE_LEN {
        return Err(DecryptionError);
    }

    let key = derive_key(passphrase, &salt).ok_or(DecryptionError)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| DecryptionError)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map_err(|_| DecryptionError)?;
    String::from_utf8(plaintext).map_err(|_| DecryptionError)
}

/// Seal `plaintext` under a fresh random salt and nonce.
///
/// # Errors
///
/// Returns [`EncryptionError`] if key derivation or sealing fails.
pub fn encrypt<R: RngCore + ?Sized>(
    plaintext: &str,
    passphrase: &str,
    rng: &mut R,
) -> Result<EncryptedEnvelope, EncryptionError> {
    let mut salt = [0_u8; SALT_LEN];
    let mut nonce = [0_u8; NONCE_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt).ok_or(EncryptionError)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| EncryptionError)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| EncryptionError)?;

    Ok(EncryptedEnvelope {
        encrypted: true,
        version: ENVELOPE_VERSION.to_string(),
        algorithm: ENVELOPE_ALGORITHM.to_string(),
        data: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(nonce),
        salt: STANDARD.encode(salt),
    })
}
