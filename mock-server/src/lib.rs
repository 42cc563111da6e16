//! In-process imitation of the two DocuSign endpoints the client calls.
//!
//! Checks the `X-DocuSign-Authentication` header, parses multipart envelope
//! uploads, verifies that every `documentId` in the JSON part has a matching
//! `file; documentid=<n>` part, and records what it received so tests can
//! inspect it.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const AUTH_HEADER: &str = "x-docusign-authentication";

/// Credentials and account the mock accepts.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub integrator_key: String,
    pub account_id: String,
    pub account_name: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "mock-user".to_string(),
            password: "mock-pass".to_string(),
            integrator_key: "mock-key".to_string(),
            account_id: "1234567".to_string(),
            account_name: "Mock Account".to_string(),
        }
    }
}

/// One part of a received multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPart {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReceivedEnvelope {
    pub envelope_id: Uuid,
    pub account_id: String,
    pub definition: Value,
    pub files: Vec<ReceivedPart>,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub login_requests: usize,
    pub envelopes: Vec<ReceivedEnvelope>,
}

#[derive(Clone, Default)]
pub struct MockState {
    config: Arc<MockConfig>,
    recorded: Arc<RwLock<Recorded>>,
}

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            recorded: Arc::default(),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn recorded(&self) -> &Arc<RwLock<Recorded>> {
        &self.recorded
    }
}

pub fn app() -> Router {
    app_with_state(MockState::default())
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route("/restapi/{version}/login_information", get(login_information))
        .route("/restapi/{version}/accounts/{account_id}/envelopes", post(create_envelope))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn login_information(
    State(state): State<MockState>,
    Path(version): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = authenticate(&state.config, &headers) {
        return rejection;
    }
    state.recorded.write().await.login_requests += 1;
    info!(%version, "login_information");

    let config = &state.config;
    Json(json!({
        "loginAccounts": [{
            "name": config.account_name,
            "accountId": config.account_id,
            "baseUrl": format!("https://demo.docusign.net/restapi/{version}/accounts/{}", config.account_id),
            "isDefault": "true",
            "userName": config.username,
            "email": config.username,
        }]
    }))
    .into_response()
}

async fn create_envelope(
    State(state): State<MockState>,
    Path((version, account_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(rejection) = authenticate(&state.config, &headers) {
        return rejection;
    }
    if account_id != state.config.account_id {
        return api_error(
            StatusCode::BAD_REQUEST,
            "ACCOUNT_LACKS_PERMISSIONS",
            format!("account {account_id} is not accessible"),
        );
    }

    let (definition, files) = match parse_envelope_upload(&headers, &body) {
        Ok(parsed) => parsed,
        Err(message) => {
            warn!(%message, "rejected envelope upload");
            return api_error(StatusCode::BAD_REQUEST, "INVALID_MULTI_PART_REQUEST", message);
        }
    };

    let envelope_id = Uuid::new_v4();
    let status = definition["status"].as_str().unwrap_or("created").to_string();
    info!(%version, %account_id, %envelope_id, documents = files.len(), "envelope created");
    state.recorded.write().await.envelopes.push(ReceivedEnvelope {
        envelope_id,
        account_id,
        definition,
        files,
    });

    (
        StatusCode::CREATED,
        Json(json!({
            "envelopeId": envelope_id,
            "uri": format!("/envelopes/{envelope_id}"),
            "status": status,
        })),
    )
        .into_response()
}

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (status, Json(json!({ "errorCode": code, "message": message.into() }))).into_response()
}

fn authenticate(config: &MockConfig, headers: &HeaderMap) -> Result<(), Response> {
    let rejected = |message: &str| {
        api_error(StatusCode::UNAUTHORIZED, "USER_AUTHENTICATION_FAILED", message)
    };
    let raw = headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| rejected("missing authentication header"))?;

    let credentials =
        parse_credentials(raw).map_err(|e| rejected(&format!("malformed authentication header: {e}")))?;
    let matches = credentials.username == config.username
        && credentials.password == config.password
        && credentials.integrator_key == config.integrator_key;
    if matches {
        Ok(())
    } else {
        Err(rejected("one or both of Username and Password are invalid"))
    }
}

/// Body of the `X-DocuSign-Authentication` header.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DocuSignCredentials {
    pub username: String,
    pub password: String,
    pub integrator_key: String,
}

pub fn parse_credentials(xml: &str) -> Result<DocuSignCredentials, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

/// Validate an envelope upload and split it into the JSON definition and
/// the file parts.
fn parse_envelope_upload(headers: &HeaderMap, body: &[u8]) -> Result<(Value, Vec<ReceivedPart>), String> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("multipart/") {
        return Err(format!("expected a multipart body, got {content_type:?}"));
    }
    let boundary = disposition_param(content_type, "boundary").ok_or("missing multipart boundary")?;

    let mut parts = parse_multipart(body, &boundary)?.into_iter();
    let json_part = parts.next().ok_or("empty multipart body")?;
    if !json_part
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json"))
    {
        return Err("first part must be the application/json envelope definition".to_string());
    }
    let definition: Value =
        serde_json::from_slice(&json_part.body).map_err(|e| format!("invalid envelope JSON: {e}"))?;

    let files: Vec<ReceivedPart> = parts.collect();
    let document_ids: Vec<String> = definition["documents"]
        .as_array()
        .ok_or("envelope definition has no documents array")?
        .iter()
        .map(|doc| doc["documentId"].as_str().unwrap_or_default().to_string())
        .collect();
    if document_ids.len() != files.len() {
        return Err(format!(
            "{} documents declared but {} file parts uploaded",
            document_ids.len(),
            files.len()
        ));
    }

    for (document_id, file) in document_ids.iter().zip(&files) {
        let disposition = file.content_disposition.as_deref().unwrap_or_default();
        if !disposition.starts_with("file;") {
            return Err(format!("document part has disposition {disposition:?}"));
        }
        let part_id = disposition_param(disposition, "documentid");
        if part_id.as_deref() != Some(document_id.as_str()) {
            return Err(format!(
                "documentId {document_id} does not match part documentid {part_id:?}"
            ));
        }
    }
    Ok((definition, files))
}

/// Value of `key=value` in a `;`-separated header, unquoted.
pub fn disposition_param(header_value: &str, key: &str) -> Option<String> {
    header_value.split(';').find_map(|param| {
        let (k, v) = param.trim().split_once('=')?;
        k.trim()
            .eq_ignore_ascii_case(key)
            .then(|| v.trim().trim_matches('"').to_string())
    })
}

/// Split a multipart body into parts.
pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<Vec<ReceivedPart>, String> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut closing = b"\r\n".to_vec();
    closing.extend_from_slice(&delimiter);

    let start = find(body, &delimiter).ok_or("missing opening boundary")?;
    let mut rest = &body[start + delimiter.len()..];
    let mut parts = Vec::new();
    loop {
        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        rest = rest.strip_prefix(b"\r\n").ok_or("malformed boundary line")?;

        let header_end = find(rest, b"\r\n\r\n").ok_or("unterminated part headers")?;
        let head = std::str::from_utf8(&rest[..header_end]).map_err(|_| "non-UTF-8 part headers")?;
        rest = &rest[header_end + 4..];

        let body_end = find(rest, &closing).ok_or("missing closing boundary")?;
        let part_body = rest[..body_end].to_vec();
        rest = &rest[body_end + closing.len()..];

        let mut part = ReceivedPart {
            content_type: None,
            content_disposition: None,
            body: part_body,
        };
        for line in head.split("\r\n") {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "content-type" => part.content_type = Some(value.trim().to_string()),
                "content-disposition" => part.content_disposition = Some(value.trim().to_string()),
                _ => {}
            }
        }
        parts.push(part);
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
