//! Integration test: full card lifecycle.
//!
//! Tests the complete lifecycle against an in-memory card service:
//! 1. Issue and publish a card
//! 2. Fetch it back by id
//! 3. Rotate to a new key
//! 4. Search and observe the linked chain
//! 5. Export and import out of band
//! 6. Revoke

use std::sync::Arc;

use card_registry::auth::{GeneratorJwtProvider, Jwt, JwtGenerator};
use card_registry::card::{is_valid_card_id, CardParams};
use card_registry::client::InMemoryCardClient;
use card_registry::crypto::{CardCrypto, Ed25519Crypto, KeyPair};
use card_registry::manager::CardManager;
use card_registry::model::ExtraFields;
use card_registry::verification::SignatureCardVerifier;
use card_registry::{CardError, SignedModel};

#[test]
fn full_workflow_publish_to_revoke() {
    let crypto = Ed25519Crypto::new();
    let api_key = KeyPair::generate();
    let service_key = KeyPair::generate();

    let service = Arc::new(
        InMemoryCardClient::new(crypto)
            .with_service_signer("virgil", service_key.private_key().clone()),
    );
    let generator =
        JwtGenerator::new(crypto, api_key.private_key().clone(), "api-key", "app", 3600);
    let manager = CardManager::builder(crypto)
        .token_provider(GeneratorJwtProvider::new(generator, "backend"))
        .card_client(Arc::clone(&service))
        .verifier(
            SignatureCardVerifier::new(crypto).trusted_signer("virgil", *service_key.public_key()),
        )
        .build()
        .expect("manager should build");

    // ── Step 1: Issue and publish ───────────────────────────────────────
    let laptop = KeyPair::generate();
    let mut extra = ExtraFields::new();
    extra.insert("device".into(), "laptop".into());
    let first = manager
        .publish_card(
            &CardParams::<Ed25519Crypto>::new(laptop.public_key(), laptop.private_key())
                .identity("alice@example.com")
                .extra_fields(extra),
        )
        .expect("publish should succeed");

    assert!(is_valid_card_id(&first.id));
    assert_eq!(first.identity, "alice@example.com");
    assert_eq!(&first.public_key, laptop.public_key());
    assert_eq!(first.signatures.len(), 2, "self + service signatures");
    let self_sig = first.signature_by("self").expect("self signature");
    assert_eq!(
        self_sig.extra_fields.as_ref().and_then(|e| e.get("device")),
        Some(&"laptop".into())
    );

    // ── Step 2: Fetch by id ─────────────────────────────────────────────
    let fetched = manager.get_card(&first.id).expect("get should succeed");
    assert_eq!(fetched, first);
    assert!(!fetched.is_outdated);

    // ── Step 3: Rotate ──────────────────────────────────────────────────
    let phone = KeyPair::generate();
    let second = manager
        .publish_card(
            &CardParams::<Ed25519Crypto>::new(phone.public_key(), phone.private_key())
                .identity("alice@example.com")
                .previous_card_id(first.id.clone()),
        )
        .expect("rotation should succeed");
    assert_eq!(second.previous_card_id.as_deref(), Some(first.id.as_str()));
    assert!(
        manager.get_card(&first.id).unwrap().is_outdated,
        "first card should be superseded after rotation"
    );

    // ── Step 4: Search ──────────────────────────────────────────────────
    let found = manager
        .search_cards("alice@example.com")
        .expect("search should succeed");
    assert_eq!(found.len(), 1, "rotation collapses to one chain");
    assert_eq!(found[0].id, second.id);
    let previous = found[0].previous_card.as_ref().expect("linked previous card");
    assert_eq!(previous.id, first.id);
    assert!(previous.is_outdated);
    assert!(previous.previous_card.is_none());

    assert!(manager.search_cards("bob@example.com").unwrap().is_empty());

    // ── Step 5: Export and import ───────────────────────────────────────
    let exported = manager.export_card_as_string(&second).unwrap();
    let imported = manager.import_card_from_string(&exported).unwrap();
    assert_eq!(imported.id, second.id);
    assert_eq!(imported.signatures, second.signatures);

    let json = manager.export_card_as_json(&second).unwrap();
    assert_eq!(SignedModel::from_json(&json).unwrap(), second.to_signed_model());

    // ── Step 6: Revoke ──────────────────────────────────────────────────
    manager.revoke_card(&second.id).expect("revoke should succeed");
    assert!(matches!(
        manager.get_card(&second.id),
        Err(CardError::Client { .. })
    ));

    // Every call presented a fresh token signed by the API key.
    let tokens = service.received_tokens();
    assert_eq!(tokens.len(), 8);
    for token in &tokens {
        let jwt: Jwt = token.parse().expect("service received a valid JWT");
        assert!(jwt.verify_signature(&crypto, api_key.public_key()).unwrap());
    }
    let identities: Vec<String> = tokens
        .iter()
        .map(|t| t.parse::<Jwt>().unwrap().identity().to_string())
        .collect();
    assert_eq!(identities[0], "alice@example.com");
    assert_eq!(identities[1], "backend", "get falls back to the default identity");
}

#[test]
fn full_workflow_untrusted_service_rejected() {
    let crypto = Ed25519Crypto::new();
    let impostor = KeyPair::generate();
    let expected = KeyPair::generate();

    let manager = CardManager::builder(crypto)
        .token_provider(GeneratorJwtProvider::new(
            JwtGenerator::new(crypto, KeyPair::generate().private_key().clone(), "k", "app", 60),
            "backend",
        ))
        .card_client(
            InMemoryCardClient::new(crypto)
                .with_service_signer("virgil", impostor.private_key().clone()),
        )
        .verifier(
            SignatureCardVerifier::new(crypto).trusted_signer("virgil", *expected.public_key()),
        )
        .build()
        .unwrap();

    let kp = KeyPair::generate();
    let result = manager.publish_card(
        &CardParams::<Ed25519Crypto>::new(kp.public_key(), kp.private_key()).identity("mallory"),
    );
    assert!(matches!(result, Err(CardError::Verification(_))));
}

#[test]
fn full_workflow_card_id_is_snapshot_hash() {
    let crypto = Ed25519Crypto::new();
    let manager = CardManager::builder(crypto)
        .token_provider(GeneratorJwtProvider::new(
            JwtGenerator::new(crypto, KeyPair::generate().private_key().clone(), "k", "app", 60),
            "backend",
        ))
        .card_client(InMemoryCardClient::new(crypto))
        .build()
        .unwrap();

    let kp = KeyPair::generate();
    let card = manager
        .publish_card(
            &CardParams::<Ed25519Crypto>::new(kp.public_key(), kp.private_key()).identity("erin"),
        )
        .unwrap();

    let digest = crypto.hash(&card.content_snapshot).unwrap();
    assert_eq!(card.id, hex::encode(&digest[..32]));
}
