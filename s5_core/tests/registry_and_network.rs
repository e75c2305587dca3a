use s5_core::crypto::DefaultCrypto;
use s5_core::identity::Identity;
use s5_core::network::Network;
use s5_core::registry::RegistryEntry;
use s5_core::testutil::MemoryNetwork;

#[tokio::test]
async fn registry_entry_published_by_one_identity_is_readable_by_another() {
    let crypto = DefaultCrypto;
    let net = MemoryNetwork::new();

    let (priv_seed, public) = crypto.ed25519_keypair(&[42u8; 32]);
    let entry = RegistryEntry::sign(&crypto, public, &priv_seed, 1, b"pointer-v1".to_vec())
        .unwrap();
    net.registry_set(entry).await.unwrap();

    let fetched = net.registry_get(&public).await.unwrap().expect("entry missing");
    assert_eq!(fetched.data, b"pointer-v1");
    assert!(fetched.verify(&crypto));
}

#[tokio::test]
async fn blob_upload_then_download_preserves_content() {
    let net = MemoryNetwork::new();
    let payload = bytes::Bytes::from_static(b"a directory snapshot's worth of bytes");
    let blob_ref = net.upload_blob(payload.clone()).await.unwrap();
    let roundtripped = net.download_blob(blob_ref).await.unwrap();
    assert_eq!(roundtripped, payload);
}

#[tokio::test]
async fn identity_signing_slot_can_publish_to_the_registry() {
    let crypto = DefaultCrypto;
    let net = MemoryNetwork::new();

    // A persisted identity blob is just the 11 sub-seeds concatenated;
    // skip the seed-phrase decoding path and exercise restoration directly.
    let identity = Identity::from_bytes(&crypto, &[9u8; 11 * 32]).unwrap();

    let public = identity.signing_public_key;
    let priv_seed = identity.signing_priv_seed();
    let entry = RegistryEntry::sign(&crypto, public, priv_seed, 1, b"root".to_vec()).unwrap();
    net.registry_set(entry).await.unwrap();

    let fetched = net.registry_get(&public).await.unwrap().unwrap();
    assert_eq!(fetched.data, b"root");
}
