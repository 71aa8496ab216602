//! Integration test: card manager over the HTTP protocol layer.
//!
//! A scripted `HttpClient` records every request and answers from a
//! closure, so the routes, headers and bodies the card service sees can be
//! checked without a network.

use std::sync::{Arc, Mutex};

use card_registry::auth::{ConstAccessTokenProvider, JwtGenerator};
use card_registry::card::{derive_card_id, CardParams};
use card_registry::client::http::{AGENT_HEADER, SUPERSEDED_HEADER};
use card_registry::client::{HttpCardClient, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use card_registry::crypto::{Ed25519Crypto, KeyPair};
use card_registry::manager::CardManager;
use card_registry::model::{CardContent, SignedModel, CARD_VERSION};
use card_registry::signer::ModelSigner;
use card_registry::{CardError, Result};

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

#[derive(Clone)]
struct ScriptedHttp {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedHttp {
    fn new(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(Box::new(responder)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedHttp {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

fn ok(body: String) -> Result<HttpResponse> {
    Ok(HttpResponse {
        status: 200,
        headers: Vec::new(),
        body,
    })
}

fn manager(http: ScriptedHttp) -> CardManager<Ed25519Crypto> {
    let token = JwtGenerator::new(
        Ed25519Crypto::new(),
        KeyPair::generate().private_key().clone(),
        "kid",
        "app",
        3600,
    )
    .generate_token("alice", None)
    .unwrap();

    CardManager::builder(Ed25519Crypto::new())
        .token_provider(ConstAccessTokenProvider::new(token))
        .card_client(HttpCardClient::new(http).with_service_url("https://cards.test/"))
        .build()
        .unwrap()
}

fn signed_model(identity: &str, previous: Option<&str>) -> SignedModel {
    let kp = KeyPair::generate();
    let snapshot = CardContent::encode(
        identity,
        &kp.public_key_bytes(),
        CARD_VERSION,
        1_700_000_000,
        previous,
    )
    .unwrap();
    ModelSigner::new(&Ed25519Crypto::new())
        .self_sign(&SignedModel::new(snapshot, Vec::new()), kp.private_key(), None)
        .unwrap()
}

#[test]
fn http_publish_sends_model_and_headers() {
    let http = ScriptedHttp::new(|req| ok(req.body.clone().unwrap_or_default()));
    let manager = manager(http.clone());

    let kp = KeyPair::generate();
    let card = manager
        .publish_card(
            &CardParams::<Ed25519Crypto>::new(kp.public_key(), kp.private_key()).identity("alice"),
        )
        .expect("publish should succeed");

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, "https://cards.test/card/v5");
    assert!(req.header("authorization").unwrap().starts_with("Virgil "));
    assert!(req.header(AGENT_HEADER).unwrap().starts_with("card-registry;rust;"));

    let sent = SignedModel::from_json(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, card.to_signed_model());
}

#[test]
fn http_get_reads_superseded_header() {
    let model = signed_model("alice", None);
    let id = derive_card_id(&Ed25519Crypto::new(), model.content_snapshot()).unwrap();
    let body = model.to_json().unwrap();
    let http = ScriptedHttp::new(move |_| {
        Ok(HttpResponse {
            status: 200,
            headers: vec![(SUPERSEDED_HEADER.to_string(), "true".to_string())],
            body: body.clone(),
        })
    });
    let manager = manager(http.clone());

    let card = manager.get_card(&id).unwrap();
    assert!(card.is_outdated);
    assert_eq!(card.id, id);

    let req = &http.requests()[0];
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, format!("https://cards.test/card/v5/{id}"));
    assert!(req.body.is_none());
}

#[test]
fn http_search_links_results() {
    let older = signed_model("alice", None);
    let older_id = derive_card_id(&Ed25519Crypto::new(), older.content_snapshot()).unwrap();
    let newer = signed_model("alice", Some(&older_id));
    let body = format!("[{},{}]", older.to_json().unwrap(), newer.to_json().unwrap());
    let http = ScriptedHttp::new(move |_| ok(body.clone()));
    let manager = manager(http.clone());

    let cards = manager.search_cards("alice").unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].previous_card.as_ref().unwrap().id, older_id);

    let req = &http.requests()[0];
    assert_eq!(req.url, "https://cards.test/card/v5/actions/search");
    let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, serde_json::json!({ "identity": "alice" }));
}

#[test]
fn http_revoke_posts_empty_body() {
    let http = ScriptedHttp::new(|_| ok(String::new()));
    let manager = manager(http.clone());

    manager.revoke_card("abc123").unwrap();

    let req = &http.requests()[0];
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, "https://cards.test/card/v5/actions/revoke/abc123");
    assert_eq!(req.body.as_deref(), Some(""));
}

#[test]
fn http_error_body_maps_to_client_error() {
    let http = ScriptedHttp::new(|_| {
        Ok(HttpResponse {
            status: 401,
            headers: Vec::new(),
            body: r#"{"code":20304,"message":"JWT token is expired"}"#.to_string(),
        })
    });
    match manager(http).get_card("abc") {
        Err(CardError::Client { code, message }) => {
            assert_eq!(code, 20304);
            assert_eq!(message, "JWT token is expired");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn http_malformed_error_body_uses_defaults() {
    let http = ScriptedHttp::new(|_| {
        Ok(HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "<html>bad gateway</html>".to_string(),
        })
    });
    match manager(http).search_cards("alice") {
        Err(CardError::Client { code, message }) => {
            assert_eq!(code, 20000);
            assert_eq!(message, "error during request serving");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn http_transport_failure_propagates() {
    let http = ScriptedHttp::new(|_| Err(CardError::Transport("connection refused".into())));
    assert!(matches!(
        manager(http).revoke_card("abc"),
        Err(CardError::Transport(_))
    ));
}

#[test]
fn http_malformed_success_body_is_format_error() {
    let http = ScriptedHttp::new(|_| ok("{\"not\":\"a card\"}".to_string()));
    assert!(matches!(
        manager(http).get_card("abc"),
        Err(CardError::Format(_))
    ));
}
