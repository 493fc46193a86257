//! Content key generation and recovery-code key wrapping
//!
//! Wrapped-key envelope (wire format):
//! ```text
//! base64( JSON {"salt": b64(16 bytes), "iv": b64(16 bytes), "data": b64(ciphertext)} )
//! ```
//!
//! The ciphertext is AES-256-CBC/PKCS7 over the base64 text of the content
//! key, under a key derived from the recovery code and the envelope's salt.
//! The envelope carries no authentication tag: unwrapping with a wrong code
//! usually fails at the padding or base64 step, but it can also hand back
//! wrong key bytes without any error. Callers must verify the recovered key
//! against known material before trusting it.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::derive_wrapping_key;
use crate::recovery::RecoveryCode;
use crate::{IV_SIZE, KEY_SIZE, SALT_SIZE};

type WrapEncryptor = cbc::Encryptor<Aes256>;
type WrapDecryptor = cbc::Decryptor<Aes256>;

/// A 256-bit content key. Zeroized on drop.
///
/// Exactly one content key is active per service instance; it leaves process
/// memory only in its base64 rendering.
#[derive(Clone)]
pub struct ContentKey {
    bytes: [u8; KEY_SIZE],
}

impl ContentKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Base64 rendering used wherever the key is persisted.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Decode the base64 rendering; must be exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let mut raw = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::MalformedInput(format!("content key base64: {e}")))?;
        if raw.len() != KEY_SIZE {
            raw.zeroize();
            return Err(CryptoError::MalformedInput(format!(
                "content key is {} bytes (expected {KEY_SIZE})",
                raw.len()
            )));
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        Ok(Self { bytes })
    }
}

impl Drop for ContentKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random 256-bit content key.
pub fn generate_content_key() -> ContentKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    ContentKey::from_bytes(bytes)
}

#[derive(Serialize, Deserialize)]
struct WrapEnvelope {
    salt: String,
    iv: String,
    data: String,
}

/// Wrap (encrypt) a content key under a key derived from the recovery code.
///
/// A fresh random salt and IV are drawn per call, so wrapping the same key
/// twice produces different envelopes.
pub fn wrap_key(key: &ContentKey, code: &RecoveryCode) -> CryptoResult<String> {
    let mut salt = [0u8; SALT_SIZE];
    let mut iv = [0u8; IV_SIZE];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    let mut wrapping_key = derive_wrapping_key(code.as_str().as_bytes(), &salt)?;
    let ciphertext = WrapEncryptor::new(&wrapping_key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(key.to_base64().as_bytes());
    wrapping_key.zeroize();

    let envelope = WrapEnvelope {
        salt: BASE64.encode(salt),
        iv: BASE64.encode(iv),
        data: BASE64.encode(&ciphertext),
    };
    let json = serde_json::to_vec(&envelope)
        .map_err(|e| CryptoError::MalformedInput(format!("envelope serialization: {e}")))?;
    Ok(BASE64.encode(json))
}

/// Unwrap (decrypt) a content key using the recovery code and the envelope's
/// embedded salt and IV.
///
/// Round-trip invariant: `unwrap_key(wrap_key(k, r), r) == k`.
pub fn unwrap_key(wrapped: &str, code: &RecoveryCode) -> CryptoResult<ContentKey> {
    let json = BASE64
        .decode(wrapped)
        .map_err(|e| CryptoError::MalformedInput(format!("envelope base64: {e}")))?;
    let envelope: WrapEnvelope = serde_json::from_slice(&json)
        .map_err(|e| CryptoError::MalformedInput(format!("envelope JSON: {e}")))?;

    let salt = decode_fixed::<SALT_SIZE>(&envelope.salt, "salt")?;
    let iv = decode_fixed::<IV_SIZE>(&envelope.iv, "iv")?;
    let ciphertext = BASE64
        .decode(&envelope.data)
        .map_err(|e| CryptoError::MalformedInput(format!("envelope data base64: {e}")))?;

    let mut wrapping_key = derive_wrapping_key(code.as_str().as_bytes(), &salt)?;
    let decrypted = WrapDecryptor::new(&wrapping_key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext);
    wrapping_key.zeroize();

    let mut plaintext = decrypted.map_err(|_| {
        CryptoError::UnderlyingCipherFailure(
            "key unwrap rejected: wrong recovery code or corrupted envelope".into(),
        )
    })?;

    let key = std::str::from_utf8(&plaintext)
        .map_err(|_| CryptoError::MalformedInput("unwrapped key is not base64 text".into()))
        .and_then(ContentKey::from_base64);
    plaintext.zeroize();
    key
}

fn decode_fixed<const N: usize>(field: &str, name: &str) -> CryptoResult<[u8; N]> {
    let raw = BASE64
        .decode(field)
        .map_err(|e| CryptoError::MalformedInput(format!("envelope {name} base64: {e}")))?;
    if raw.len() != N {
        return Err(CryptoError::MalformedInput(format!(
            "envelope {name} is {} bytes (expected {N})",
            raw.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&raw);
    Ok(out)
}
