//! Key lifecycle: load-or-generate the key bundle, expose cipher operations
//!
//! On first start the service generates a content key, a recovery code, and
//! a wrapped copy of the key, and persists all three under well-known entry
//! names. Later starts adopt the stored bundle verbatim. Two instances
//! racing to initialize against the same backend can each generate a bundle
//! and overwrite the other's entries (the storage interface has no
//! compare-and-swap); serializing initialization is the caller's job.

use notevault_crypto::{
    decrypt, encrypt, generate_content_key, unwrap_key, wrap_key, ContentKey, EncryptedMessage,
    RecoveryCode,
};

use crate::error::KeystoreResult;
use crate::store::{keys, KeyValueStore};

/// The three persisted values, verbatim as stored: base64 content key,
/// recovery code digits, wrapped-key envelope.
///
/// These are raw secrets; display policy is the caller's. No `Debug` impl.
#[derive(Clone)]
pub struct KeyBundle {
    pub content_key: String,
    pub recovery_code: String,
    pub wrapped_key: String,
}

/// Orchestrates key generation, persistence, and the cipher operations.
///
/// Holds the single active content key in memory for its own lifetime; the
/// key is zeroized when the service is dropped.
pub struct KeyService<S> {
    store: S,
    content_key: ContentKey,
    bundle: KeyBundle,
}

impl<S: KeyValueStore> KeyService<S> {
    /// Load the stored key bundle, or generate and persist a fresh one.
    ///
    /// All three entries must be present for the stored bundle to be
    /// adopted (without writing anything); if any is missing, a new bundle
    /// is generated and all three entries are rewritten sequentially.
    pub async fn initialize(store: S) -> KeystoreResult<Self> {
        let stored_key = store.read(keys::CONTENT_KEY).await?;
        let stored_code = store.read(keys::RECOVERY_CODE).await?;
        let stored_wrapped = store.read(keys::WRAPPED_KEY).await?;

        let bundle = match (stored_key, stored_code, stored_wrapped) {
            (Some(content_key), Some(recovery_code), Some(wrapped_key)) => {
                tracing::debug!("adopting stored key bundle");
                KeyBundle {
                    content_key,
                    recovery_code,
                    wrapped_key,
                }
            }
            _ => {
                let key = generate_content_key();
                let code = RecoveryCode::generate();
                let wrapped = wrap_key(&key, &code)?;
                let bundle = KeyBundle {
                    content_key: key.to_base64(),
                    recovery_code: code.as_str().to_string(),
                    wrapped_key: wrapped,
                };

                store.write(keys::CONTENT_KEY, &bundle.content_key).await?;
                store.write(keys::RECOVERY_CODE, &bundle.recovery_code).await?;
                store.write(keys::WRAPPED_KEY, &bundle.wrapped_key).await?;
                tracing::debug!("generated and persisted new key bundle");
                bundle
            }
        };

        let content_key = ContentKey::from_base64(&bundle.content_key)?;
        Ok(Self {
            store,
            content_key,
            bundle,
        })
    }

    /// Encrypt UTF-8 text under the in-memory content key.
    pub fn encrypt(&self, plaintext: &str) -> KeystoreResult<EncryptedMessage> {
        Ok(encrypt(plaintext, &self.content_key)?)
    }

    /// Decrypt a message produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, msg: &EncryptedMessage) -> KeystoreResult<String> {
        Ok(decrypt(msg, &self.content_key)?)
    }

    /// The persisted bundle values, verbatim.
    pub fn bundle(&self) -> &KeyBundle {
        &self.bundle
    }

    /// Check that the stored content key still matches the in-memory one.
    pub async fn verify_stored_key(&self) -> KeystoreResult<bool> {
        let stored = self.store.read(keys::CONTENT_KEY).await?;
        Ok(stored.as_deref() == Some(self.bundle.content_key.as_str()))
    }

    /// Recover the content key from the wrapped copy and a recovery code —
    /// the secondary path, independent of the stored plaintext copy.
    ///
    /// The wrapped envelope carries no integrity tag of its own: a wrong
    /// code may fail here or may yield wrong bytes, so compare the result
    /// against known material before trusting it.
    pub fn recover_content_key(&self, code: &RecoveryCode) -> KeystoreResult<ContentKey> {
        Ok(unwrap_key(&self.bundle.wrapped_key, code)?)
    }

    /// Delete every stored entry and consume the service. The in-memory
    /// content key is zeroized on drop.
    pub async fn reset(self) -> KeystoreResult<()> {
        self.store.delete_all().await?;
        tracing::debug!("deleted key bundle from storage");
        Ok(())
    }
}
