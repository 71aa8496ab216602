//! HTTP protocol for the card service.
//!
//! [`HttpCardClient`] knows the card service routes, headers and body
//! formats. Moving bytes over the network is left to an injected
//! [`HttpClient`], which owns connection, timeout and TLS policy.
//!
//! Routes (relative to the service URL):
//! - `POST /card/v5`: publish, body is the SignedModel JSON
//! - `GET /card/v5/{id}`: fetch one card
//! - `POST /card/v5/actions/search`: body `{"identity": ...}`
//! - `POST /card/v5/actions/revoke/{id}`: empty body

use serde_json::Value;

use crate::error::{CardError, Result};
use crate::model::SignedModel;

use super::{CardClient, ClientResponse, ErrorResponse, GetCardResponse};

pub const DEFAULT_SERVICE_URL: &str = "https://api.virgilsecurity.com";

/// Response header set to `true` when a fetched card has been superseded.
pub const SUPERSEDED_HEADER: &str = "X-Virgil-Is-Superseeded";
pub const AGENT_HEADER: &str = "virgil-agent";

const DEFAULT_ERROR_CODE: i64 = 20000;
const DEFAULT_ERROR_MESSAGE: &str = "error during request serving";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Sends a single HTTP request. Failures should be reported as
/// [`CardError::Transport`].
pub trait HttpClient: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Card service client speaking the HTTP protocol over `H`.
pub struct HttpCardClient<H: HttpClient> {
    http: H,
    service_url: String,
    agent: String,
}

impl<H: HttpClient> HttpCardClient<H> {
    pub fn new(http: H) -> Self {
        Self {
            http,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            agent: format!(
                "card-registry;rust;{};{}",
                std::env::consts::OS,
                env!("CARGO_PKG_VERSION")
            ),
        }
    }

    /// Point the client at another service URL. A trailing `/` is dropped.
    pub fn with_service_url(mut self, service_url: &str) -> Self {
        self.service_url = service_url.trim_end_matches('/').to_string();
        self
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        token: &str,
    ) -> Result<HttpResponse> {
        let request = HttpRequest {
            method,
            url: format!("{}{path}", self.service_url),
            headers: vec![
                ("Authorization".to_string(), format!("Virgil {token}")),
                (AGENT_HEADER.to_string(), self.agent.clone()),
            ],
            body,
        };
        log::debug!("{} {}", method.as_str(), request.url);
        let response = self.http.send(&request)?;
        log::debug!("{} {} -> {}", method.as_str(), request.url, response.status);
        Ok(response)
    }
}

/// Parse a non-success body, falling back to defaults for anything missing.
pub fn parse_error_response(body: &str) -> ErrorResponse {
    let mut error = ErrorResponse {
        code: DEFAULT_ERROR_CODE,
        message: DEFAULT_ERROR_MESSAGE.to_string(),
    };

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let code = map.get("code").and_then(|code| match code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        if let Some(code) = code {
            error.code = code;
        }
        match map.get("message") {
            Some(Value::String(message)) => error.message = message.clone(),
            Some(Value::Null) | None => {}
            Some(other) => error.message = other.to_string(),
        }
    }

    error
}

impl<H: HttpClient> CardClient for HttpCardClient<H> {
    fn publish_card(
        &self,
        model: &SignedModel,
        token: &str,
    ) -> Result<ClientResponse<SignedModel>> {
        let response = self.request(HttpMethod::Post, "/card/v5", Some(model.to_json()?), token)?;
        if !response.is_success() {
            return Ok(ClientResponse::Failure(parse_error_response(&response.body)));
        }
        Ok(ClientResponse::Success(SignedModel::from_json(&response.body)?))
    }

    fn get_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<GetCardResponse>> {
        let response =
            self.request(HttpMethod::Get, &format!("/card/v5/{card_id}"), None, token)?;
        if !response.is_success() {
            return Ok(ClientResponse::Failure(parse_error_response(&response.body)));
        }
        let is_outdated = response
            .header(SUPERSEDED_HEADER)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        Ok(ClientResponse::Success(GetCardResponse {
            model: SignedModel::from_json(&response.body)?,
            is_outdated,
        }))
    }

    fn search_cards(
        &self,
        identity: &str,
        token: &str,
    ) -> Result<ClientResponse<Vec<SignedModel>>> {
        let body = serde_json::json!({ "identity": identity }).to_string();
        let response =
            self.request(HttpMethod::Post, "/card/v5/actions/search", Some(body), token)?;
        if !response.is_success() {
            return Ok(ClientResponse::Failure(parse_error_response(&response.body)));
        }
        let raw: Vec<Value> = serde_json::from_str(&response.body).map_err(|e| {
            CardError::Format(format!("search response is not a list of cards: {e}"))
        })?;
        let models = raw
            .into_iter()
            .map(SignedModel::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(ClientResponse::Success(models))
    }

    fn revoke_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<()>> {
        let response = self.request(
            HttpMethod::Post,
            &format!("/card/v5/actions/revoke/{card_id}"),
            Some(String::new()),
            token,
        )?;
        if !response.is_success() {
            return Ok(ClientResponse::Failure(parse_error_response(&response.body)));
        }
        Ok(ClientResponse::Success(()))
    }
}
