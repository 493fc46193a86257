//! Integration tests for the key lifecycle against an in-memory backend.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use notevault_crypto::RecoveryCode;
use notevault_keystore::store::keys;
use notevault_keystore::{KeyService, KeyValueStore, MemoryStore};

#[tokio::test]
async fn initialize_empty_backend_persists_three_entries() {
    let store = MemoryStore::new();
    let service = KeyService::initialize(store.clone()).await.unwrap();

    assert_eq!(store.len().await, 3);
    assert_eq!(store.write_count().await, 3);

    let bundle = service.bundle();
    assert_eq!(BASE64.decode(&bundle.content_key).unwrap().len(), 32);
    assert_eq!(bundle.recovery_code.len(), 10);
    assert!(bundle.recovery_code.bytes().all(|b| b.is_ascii_digit()));
    BASE64.decode(&bundle.wrapped_key).unwrap();
}

#[tokio::test]
async fn second_initialize_adopts_stored_bundle_without_writes() {
    let store = MemoryStore::new();
    let first = KeyService::initialize(store.clone()).await.unwrap();
    let first_bundle = first.bundle().clone();

    let second = KeyService::initialize(store.clone()).await.unwrap();

    assert_eq!(store.write_count().await, 3, "adoption must not write");
    assert_eq!(second.bundle().content_key, first_bundle.content_key);
    assert_eq!(second.bundle().recovery_code, first_bundle.recovery_code);
    assert_eq!(second.bundle().wrapped_key, first_bundle.wrapped_key);
}

#[tokio::test]
async fn missing_entry_triggers_regeneration() {
    let store = MemoryStore::new();
    // Two of the three entries present: not a valid bundle.
    store.write(keys::CONTENT_KEY, "stale").await.unwrap();
    store.write(keys::RECOVERY_CODE, "0123456789").await.unwrap();

    let service = KeyService::initialize(store.clone()).await.unwrap();

    assert_eq!(store.len().await, 3);
    assert_ne!(service.bundle().content_key, "stale");
    assert_ne!(service.bundle().recovery_code, "0123456789");
}

#[tokio::test]
async fn encrypt_decrypt_through_service() {
    let service = KeyService::initialize(MemoryStore::new()).await.unwrap();

    let msg = service.encrypt("dear diary").unwrap();
    assert_eq!(service.decrypt(&msg).unwrap(), "dear diary");
}

#[tokio::test]
async fn messages_survive_restart() {
    let store = MemoryStore::new();
    let first = KeyService::initialize(store.clone()).await.unwrap();
    let msg = first.encrypt("written before restart").unwrap();
    drop(first);

    let second = KeyService::initialize(store).await.unwrap();
    assert_eq!(second.decrypt(&msg).unwrap(), "written before restart");
}

#[tokio::test]
async fn recovery_code_unwraps_content_key() {
    let service = KeyService::initialize(MemoryStore::new()).await.unwrap();

    let code = RecoveryCode::parse(&service.bundle().recovery_code).unwrap();
    let recovered = service.recover_content_key(&code).unwrap();
    assert_eq!(recovered.to_base64(), service.bundle().content_key);
}

#[tokio::test]
async fn wrong_recovery_code_never_recovers_original_key() {
    let service = KeyService::initialize(MemoryStore::new()).await.unwrap();

    // Flip the first digit so the code is valid in shape but wrong.
    let mut digits = service.bundle().recovery_code.clone();
    let first = digits.remove(0);
    let flipped = char::from(b'0' + (first as u8 - b'0' + 1) % 10);
    digits.insert(0, flipped);
    let wrong = RecoveryCode::parse(&digits).unwrap();

    match service.recover_content_key(&wrong) {
        Err(_) => {}
        Ok(recovered) => assert_ne!(
            recovered.to_base64(),
            service.bundle().content_key,
            "wrong code must never reproduce the original key"
        ),
    }
}

#[tokio::test]
async fn verify_stored_key_detects_clobbered_entry() {
    let store = MemoryStore::new();
    let service = KeyService::initialize(store.clone()).await.unwrap();
    assert!(service.verify_stored_key().await.unwrap());

    let other = BASE64.encode([0u8; 32]);
    store.write(keys::CONTENT_KEY, &other).await.unwrap();
    assert!(!service.verify_stored_key().await.unwrap());
}

#[tokio::test]
async fn reset_deletes_all_entries() {
    let store = MemoryStore::new();
    let service = KeyService::initialize(store.clone()).await.unwrap();
    assert_eq!(store.len().await, 3);

    service.reset().await.unwrap();
    assert!(store.is_empty().await);
}
