//! Recovery code generation and validation
//!
//! A recovery code is 10 decimal digits drawn independently from a CSPRNG,
//! so leading zeros are as likely as any other digit. The code is shown to
//! the user once and later typed back in to unwrap the stored content key.

use rand::Rng;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::RECOVERY_CODE_LEN;

/// A 10-digit numeric recovery secret. Zeroized on drop.
#[derive(Clone)]
pub struct RecoveryCode(String);

impl RecoveryCode {
    /// Generate a fresh code: 10 independent uniform draws from `'0'..='9'`.
    ///
    /// Successive calls are independent; uniqueness is not enforced
    /// (collisions over the 10^10 space are statistically negligible).
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..RECOVERY_CODE_LEN)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(code)
    }

    /// Validate a user-entered code: exactly 10 ASCII decimal digits.
    pub fn parse(input: &str) -> CryptoResult<Self> {
        if input.len() != RECOVERY_CODE_LEN || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CryptoError::MalformedInput(format!(
                "recovery code must be exactly {RECOVERY_CODE_LEN} decimal digits"
            )));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for RecoveryCode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for RecoveryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryCode")
            .field("digits", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let code = RecoveryCode::generate();
        assert_eq!(code.as_str().len(), RECOVERY_CODE_LEN);
        assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_generate_independent() {
        let a = RecoveryCode::generate();
        let b = RecoveryCode::generate();
        assert_ne!(a.as_str(), b.as_str(), "successive codes must differ");
    }

    #[test]
    fn test_parse_roundtrip() {
        let code = RecoveryCode::parse("0012345678").unwrap();
        assert_eq!(code.as_str(), "0012345678", "leading zeros must survive");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(RecoveryCode::parse("123456789").is_err());
        assert!(RecoveryCode::parse("12345678901").is_err());
        assert!(RecoveryCode::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(RecoveryCode::parse("12345abcde").is_err());
        assert!(RecoveryCode::parse("12345 6789").is_err());
        // Unicode digits are not ASCII digits
        assert!(RecoveryCode::parse("１２３４５６７８９０").is_err());
    }
}
