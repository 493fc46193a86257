use notevault_crypto::CryptoError;
use thiserror::Error;

pub type KeystoreResult<T> = Result<T, KeystoreError>;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("storage backend: {0}")]
    Storage(#[from] anyhow::Error),
}
