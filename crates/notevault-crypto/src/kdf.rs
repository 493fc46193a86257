//! Key derivation: PBKDF2-HMAC-SHA256 recovery code → wrapping key

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, SALT_SIZE};

/// PBKDF2 iteration count for wrapping-key derivation.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Derive a 256-bit wrapping key from a password-like secret and a 16-byte
/// salt using PBKDF2-HMAC-SHA256.
///
/// The salt is randomly generated and stored alongside the wrapped key (it
/// does not need to be secret). Deterministic for identical `(secret, salt)`.
/// An empty secret is rejected.
pub fn derive_wrapping_key(
    secret: &[u8],
    salt: &[u8; SALT_SIZE],
) -> CryptoResult<[u8; KEY_SIZE]> {
    if secret.is_empty() {
        return Err(CryptoError::MalformedInput("empty derivation secret".into()));
    }
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(secret, salt, PBKDF2_ROUNDS, &mut key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kdf_deterministic() {
        let salt = [1u8; SALT_SIZE];
        let key1 = derive_wrapping_key(b"0123456789", &salt).unwrap();
        let key2 = derive_wrapping_key(b"0123456789", &salt).unwrap();
        assert_eq!(key1, key2, "KDF must be deterministic");
    }

    #[test]
    fn test_kdf_different_secrets() {
        let salt = [1u8; SALT_SIZE];
        let key1 = derive_wrapping_key(b"0000000000", &salt).unwrap();
        let key2 = derive_wrapping_key(b"0000000001", &salt).unwrap();
        assert_ne!(key1, key2, "different secrets must produce different keys");
    }

    #[test]
    fn test_kdf_different_salts() {
        let key1 = derive_wrapping_key(b"0123456789", &[1u8; SALT_SIZE]).unwrap();
        let key2 = derive_wrapping_key(b"0123456789", &[2u8; SALT_SIZE]).unwrap();
        assert_ne!(key1, key2, "different salts must produce different keys");
    }

    #[test]
    fn test_kdf_rejects_empty_secret() {
        let result = derive_wrapping_key(b"", &[1u8; SALT_SIZE]);
        assert!(matches!(result, Err(CryptoError::MalformedInput(_))));
    }
}
