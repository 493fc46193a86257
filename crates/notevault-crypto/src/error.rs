use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The transport authentication tag did not match: tampering or wrong key.
    #[error("authentication tag mismatch")]
    AuthenticationFailure,

    /// Unparseable envelope, invalid base64/hex, or a wrong-length field.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The cipher primitive itself rejected the input.
    #[error("cipher failure: {0}")]
    UnderlyingCipherFailure(String),
}
