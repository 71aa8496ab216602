//! Stress test: one card manager shared across threads.

use std::sync::Arc;
use std::thread;

use card_registry::auth::{GeneratorJwtProvider, JwtGenerator};
use card_registry::card::CardParams;
use card_registry::client::InMemoryCardClient;
use card_registry::crypto::{Ed25519Crypto, KeyPair};
use card_registry::manager::CardManager;
use card_registry::verification::SignatureCardVerifier;

const THREADS: usize = 8;
const CARDS_PER_THREAD: usize = 25;

type Service = InMemoryCardClient<Ed25519Crypto>;

fn shared_manager() -> (Arc<CardManager<Ed25519Crypto>>, Arc<Service>) {
    let crypto = Ed25519Crypto::new();
    let service = Arc::new(InMemoryCardClient::new(crypto));
    let generator = JwtGenerator::new(
        crypto,
        KeyPair::generate().private_key().clone(),
        "kid",
        "app",
        3600,
    );
    let manager = CardManager::builder(crypto)
        .token_provider(GeneratorJwtProvider::new(generator, "backend"))
        .card_client(Arc::clone(&service))
        .verifier(SignatureCardVerifier::new(crypto))
        .build()
        .expect("manager should build");
    (Arc::new(manager), service)
}

#[test]
fn stress_concurrent_publish_and_search() {
    let (manager, service) = shared_manager();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let identity = format!("worker-{t}");
                let mut ids = Vec::with_capacity(CARDS_PER_THREAD);
                for _ in 0..CARDS_PER_THREAD {
                    let kp = KeyPair::generate();
                    let card = manager
                        .publish_card(
                            &CardParams::<Ed25519Crypto>::new(kp.public_key(), kp.private_key())
                                .identity(identity.clone()),
                        )
                        .expect("publish should succeed");
                    ids.push(card.id);
                }
                (identity, ids)
            })
        })
        .collect();

    let results: Vec<(String, Vec<String>)> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic"))
        .collect();

    assert_eq!(service.len(), THREADS * CARDS_PER_THREAD);
    for (identity, ids) in results {
        let found = manager.search_cards(&identity).expect("search should succeed");
        assert_eq!(found.len(), CARDS_PER_THREAD);
        for id in ids {
            assert!(found.iter().any(|c| c.id == id), "card {id} missing for {identity}");
        }
    }
}

#[test]
fn stress_concurrent_rotations_keep_chains_separate() {
    let (manager, _) = shared_manager();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let identity = format!("rotator-{t}");
                let first_key = KeyPair::generate();
                let first = manager
                    .publish_card(
                        &CardParams::<Ed25519Crypto>::new(
                            first_key.public_key(),
                            first_key.private_key(),
                        )
                        .identity(identity.clone()),
                    )
                    .unwrap();
                let second_key = KeyPair::generate();
                let second = manager
                    .publish_card(
                        &CardParams::<Ed25519Crypto>::new(
                            second_key.public_key(),
                            second_key.private_key(),
                        )
                        .identity(identity.clone())
                        .previous_card_id(first.id.clone()),
                    )
                    .unwrap();
                (identity, first.id, second.id)
            })
        })
        .collect();

    for handle in handles {
        let (identity, first_id, second_id) = handle.join().unwrap();
        let found = manager.search_cards(&identity).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, second_id);
        assert_eq!(found[0].previous_card.as_ref().unwrap().id, first_id);
        assert!(manager.get_card(&first_id).unwrap().is_outdated);
    }
}

#[test]
fn stress_concurrent_import_export() {
    let (manager, _) = shared_manager();
    let kp = KeyPair::generate();
    let model = manager
        .generate_raw_card(
            &CardParams::<Ed25519Crypto>::new(kp.public_key(), kp.private_key()).identity("shared"),
        )
        .unwrap();
    let exported = manager
        .export_card_as_string(&manager.import_card(&model).unwrap())
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let exported = exported.clone();
            thread::spawn(move || {
                (0..100)
                    .map(|_| manager.import_card_from_string(&exported).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.extend(handle.join().unwrap());
    }
    assert_eq!(ids.len(), 1, "the same bytes always yield the same id");
}
