//! notevault-crypto: symmetric encryption and key recovery for NoteVault
//!
//! Key hierarchy:
//! ```text
//! Content Key (256-bit, random)
//!   ├── Content cipher: AES-256-GCM (16-byte IV)
//!   │     └── Transport tag: HMAC-SHA256(ciphertext || IV), keyed by the content key
//!   └── Wrapped copy: AES-256-CBC under PBKDF2-HMAC-SHA256(recovery code, salt)
//!         └── Envelope: base64( JSON {salt, iv, data} ), each field base64
//! ```
//!
//! The wrapped copy is the recovery path: a 10-digit code shown to the user
//! once can re-derive the content key without the primary stored copy.

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod recovery;

pub use cipher::{decrypt, encrypt, EncryptedMessage};
pub use error::{CryptoError, CryptoResult};
pub use kdf::derive_wrapping_key;
pub use keys::{generate_content_key, unwrap_key, wrap_key, ContentKey};
pub use recovery::RecoveryCode;

/// Size of a content key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES IV in bytes (both the GCM nonce and the CBC IV)
pub const IV_SIZE: usize = 16;

/// Size of a key-wrapping salt in bytes
pub const SALT_SIZE: usize = 16;

/// Number of decimal digits in a recovery code
pub const RECOVERY_CODE_LEN: usize = 10;
