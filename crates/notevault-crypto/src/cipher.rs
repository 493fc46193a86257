//! Content encryption: AES-256-GCM with an explicit HMAC-SHA256 transport tag
//!
//! Encrypted message (wire format): three text fields —
//! `ciphertext` (base64, GCM output with its tag appended), `iv` (base64,
//! 16 bytes, fresh per message), and `authTag` (64 hex characters:
//! HMAC-SHA256 over ciphertext bytes || IV bytes, keyed by the content key).
//!
//! The transport tag is verified in constant time before the AEAD runs, so
//! a tampered message never reaches the cipher.

use aes::cipher::consts::U16;
use aes::Aes256;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::AesGcm;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::ContentKey;
use crate::IV_SIZE;

/// AES-256-GCM with the 16-byte IV this wire format prescribes.
type ContentAead = AesGcm<Aes256, U16>;
type ContentNonce = aes_gcm::Nonce<U16>;
type HmacSha256 = Hmac<Sha256>;

/// One encrypted message. Serializes with camelCase field names
/// (`ciphertext`, `iv`, `authTag`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMessage {
    /// Base64 AES-GCM output (ciphertext with the GCM tag appended)
    pub ciphertext: String,
    /// Base64 16-byte IV
    pub iv: String,
    /// Hex HMAC-SHA256 over ciphertext || IV, keyed by the content key
    pub auth_tag: String,
}

/// Encrypt UTF-8 text under the content key.
///
/// A fresh random IV is drawn per call; an IV is never reused under the
/// same key. Empty plaintext is valid and round-trips to the empty string.
pub fn encrypt(plaintext: &str, key: &ContentKey) -> CryptoResult<EncryptedMessage> {
    let cipher = ContentAead::new(key.as_bytes().into());

    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(ContentNonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|_| CryptoError::UnderlyingCipherFailure("content encryption failed".into()))?;

    let auth_tag = hex::encode(tag_mac(key, &ciphertext, &iv)?.finalize().into_bytes());

    Ok(EncryptedMessage {
        ciphertext: BASE64.encode(&ciphertext),
        iv: BASE64.encode(iv),
        auth_tag,
    })
}

/// Decrypt an [`EncryptedMessage`] under the content key.
///
/// The transport tag is recomputed and compared in constant time first; on
/// mismatch this fails with [`CryptoError::AuthenticationFailure`] without
/// attempting decryption. A rejection by the AEAD itself (reachable only if
/// the tag was forged or key material is corrupted) surfaces as
/// [`CryptoError::UnderlyingCipherFailure`].
pub fn decrypt(msg: &EncryptedMessage, key: &ContentKey) -> CryptoResult<String> {
    let ciphertext = BASE64
        .decode(&msg.ciphertext)
        .map_err(|e| CryptoError::MalformedInput(format!("ciphertext base64: {e}")))?;
    let iv = BASE64
        .decode(&msg.iv)
        .map_err(|e| CryptoError::MalformedInput(format!("iv base64: {e}")))?;
    if iv.len() != IV_SIZE {
        return Err(CryptoError::MalformedInput(format!(
            "iv is {} bytes (expected {IV_SIZE})",
            iv.len()
        )));
    }
    let expected = hex::decode(&msg.auth_tag)
        .map_err(|e| CryptoError::MalformedInput(format!("authTag hex: {e}")))?;

    tag_mac(key, &ciphertext, &iv)?
        .verify_slice(&expected)
        .map_err(|_| CryptoError::AuthenticationFailure)?;

    let cipher = ContentAead::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(ContentNonce::from_slice(&iv), ciphertext.as_ref())
        .map_err(|_| CryptoError::UnderlyingCipherFailure("content decryption rejected".into()))?;

    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::MalformedInput("decrypted content is not UTF-8".into()))
}

/// HMAC-SHA256 over ciphertext || IV, keyed by the raw content key bytes.
fn tag_mac(key: &ContentKey, ciphertext: &[u8], iv: &[u8]) -> CryptoResult<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::UnderlyingCipherFailure("HMAC key setup failed".into()))?;
    mac.update(ciphertext);
    mac.update(iv);
    Ok(mac)
}
