//! DocuSign client facade.
//!
//! # Design
//! Each remote operation is split into a pure `build_*` method producing an
//! `HttpRequest` and a facade method that runs it through the client's
//! `Transport` and returns the raw `HttpResponse`. Non-2xx responses are
//! handed back unchanged; the only response this client reads is
//! login information, to learn the account id.
//!
//! The account id is memoized behind a `Mutex` that stays locked for the
//! whole lookup, so concurrent callers share a single login request.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::envelope::EnvelopeRequest;
use crate::error::{DocuSignError, Result};
use crate::headers::build_headers;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartBody;
use crate::transport::{Transport, UreqTransport};
use crate::types::LoginInformation;
use crate::uri::build_uri;

/// Synchronous client for the DocuSign REST API.
#[derive(Debug)]
pub struct DocuSignClient<T: Transport = UreqTransport> {
    config: ClientConfig,
    transport: T,
    account_id: Mutex<Option<String>>,
}

impl DocuSignClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout, config.accept_invalid_certs);
        Self::with_transport(config, transport)
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> DocuSignClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        if config.accept_invalid_certs {
            warn!(endpoint = %config.endpoint, "TLS certificate verification is disabled");
        }
        let account_id = Mutex::new(config.account_id.clone());
        Ok(Self {
            config,
            transport,
            account_id,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Default `Accept`, then caller overrides, then the auth header.
    pub fn build_headers(&self, overrides: &[(String, String)]) -> Vec<(String, String)> {
        build_headers(&self.config.credentials, overrides)
    }

    pub fn build_uri(&self, relative_path: &str) -> Result<::http::Uri> {
        build_uri(&self.config.endpoint, &self.config.api_version, relative_path)
    }

    pub fn build_login_information(&self, overrides: &[(String, String)]) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            uri: self.build_uri("/login_information")?,
            headers: self.build_headers(overrides),
            body: None,
        })
    }

    /// Build the multipart envelope-creation request. Reads every document.
    pub fn build_create_envelope(
        &self,
        account_id: &str,
        request: &mut EnvelopeRequest,
        overrides: &[(String, String)],
    ) -> Result<HttpRequest> {
        let uri = self.build_uri(&format!("/accounts/{account_id}/envelopes"))?;

        let mut multipart = MultipartBody::new();
        multipart.json_part(request.to_json()?);
        for (i, document) in request.documents.iter_mut().enumerate() {
            let content = document.read_content()?;
            multipart.document_part(i + 1, &document.name, &document.content_type, content);
        }

        let mut headers = self.build_headers(overrides);
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
        headers.push(("Content-Type".to_string(), multipart.content_type()));

        Ok(HttpRequest {
            method: HttpMethod::Post,
            uri,
            headers,
            body: Some(multipart.to_bytes()),
        })
    }

    /// Extract `loginAccounts[0].accountId` from a login-information response.
    pub fn parse_account_id(response: &HttpResponse) -> Result<String> {
        if !response.is_success() {
            return Err(DocuSignError::AccountResolution(format!(
                "login_information returned HTTP {}: {}",
                response.status,
                response.text()
            )));
        }
        let info: LoginInformation = serde_json::from_slice(&response.body)
            .map_err(|e| DocuSignError::AccountResolution(e.to_string()))?;
        info.login_accounts
            .into_iter()
            .next()
            .map(|account| account.account_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DocuSignError::AccountResolution("no login accounts returned".to_string()))
    }

    /// `GET {endpoint}/{version}/login_information`.
    pub fn login_information(&self, overrides: &[(String, String)]) -> Result<HttpResponse> {
        let request = self.build_login_information(overrides)?;
        self.transport.execute(request)
    }

    /// Cached account id, looked up remotely at most once per client.
    pub fn account_id(&self) -> Result<String> {
        let mut cached = self.account_id.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }
        let response = self.login_information(&[])?;
        let id = Self::parse_account_id(&response)?;
        info!(account_id = %id, "resolved DocuSign account id");
        *cached = Some(id.clone());
        Ok(id)
    }

    /// `POST {endpoint}/{version}/accounts/{accountId}/envelopes`.
    pub fn create_envelope_from_document(
        &self,
        mut request: EnvelopeRequest,
        overrides: &[(String, String)],
    ) -> Result<HttpResponse> {
        let account_id = self.account_id()?;
        let http_request = self.build_create_envelope(&account_id, &mut request, overrides)?;
        self.transport.execute(http_request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::Credentials;
    use crate::envelope::{DocumentRef, EnvelopeStatus, Signer};
    use crate::headers::AUTH_HEADER;

    const LOGIN_BODY: &str = r#"{"loginAccounts":[{"accountId":"1234567","name":"Acme","isDefault":"true"},{"accountId":"7654321"}]}"#;

    /// Answers every request with a fixed response and records what it saw.
    #[derive(Clone)]
    struct FakeTransport {
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
        status: u16,
        body: &'static str,
        delay: Duration,
    }

    impl FakeTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
                status,
                body,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Err(DocuSignError::Transport("connection refused".to_string()))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new(
            "https://api.example.com",
            Credentials::new("user@example.com", "s3cret", "KEY-1"),
        )
    }

    fn client(transport: FakeTransport) -> DocuSignClient<FakeTransport> {
        DocuSignClient::with_transport(config(), transport).unwrap()
    }

    #[test]
    fn build_login_information_produces_correct_request() {
        let req = client(FakeTransport::new(200, LOGIN_BODY))
            .build_login_information(&[])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.uri.to_string(), "https://api.example.com/v2/login_information");
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header(AUTH_HEADER).unwrap().contains("<IntegratorKey>KEY-1</IntegratorKey>"));
        assert!(req.body.is_none());
    }

    #[test]
    fn account_id_is_resolved_once() {
        let transport = FakeTransport::new(200, LOGIN_BODY);
        let client = client(transport.clone());
        assert_eq!(client.account_id().unwrap(), "1234567");
        assert_eq!(client.account_id().unwrap(), "1234567");
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn configured_account_id_skips_lookup() {
        let transport = FakeTransport::new(200, LOGIN_BODY);
        let client = DocuSignClient::with_transport(config().with_account_id("42"), transport.clone()).unwrap();
        assert_eq!(client.account_id().unwrap(), "42");
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn concurrent_callers_share_one_lookup() {
        let mut transport = FakeTransport::new(200, LOGIN_BODY);
        transport.delay = Duration::from_millis(50);
        let client = client(transport.clone());
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| client.account_id())).collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap(), "1234567");
            }
        });
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn empty_login_accounts_fail_resolution() {
        let transport = FakeTransport::new(200, r#"{"loginAccounts":[]}"#);
        let client = client(transport.clone());
        assert!(matches!(client.account_id(), Err(DocuSignError::AccountResolution(_))));
        // Failures are not cached.
        assert!(client.account_id().is_err());
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn unparsable_login_body_fails_resolution() {
        let client = client(FakeTransport::new(200, "<html>maintenance</html>"));
        assert!(matches!(client.account_id(), Err(DocuSignError::AccountResolution(_))));
    }

    #[test]
    fn rejected_login_fails_resolution() {
        let client = client(FakeTransport::new(
            401,
            r#"{"errorCode":"USER_AUTHENTICATION_FAILED"}"#,
        ));
        match client.account_id().unwrap_err() {
            DocuSignError::AccountResolution(msg) => assert!(msg.contains("401")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let client = DocuSignClient::with_transport(config(), FailingTransport).unwrap();
        assert!(matches!(client.login_information(&[]), Err(DocuSignError::Transport(_))));
    }

    #[test]
    fn login_information_returns_non_2xx_verbatim() {
        let client = client(FakeTransport::new(500, "upstream down"));
        let resp = client.login_information(&[]).unwrap();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, b"upstream down");
    }

    #[test]
    fn create_envelope_posts_multipart_to_account() {
        let transport = FakeTransport::new(200, LOGIN_BODY);
        let client = client(transport.clone());
        let request = EnvelopeRequest::new("Please sign")
            .email_blurb("Thanks")
            .signer(Signer::new("a@x.com", "A"))
            .document(DocumentRef::from_bytes("doc1.pdf", b"%PDF-1.4".to_vec()))
            .status(EnvelopeStatus::Created);

        client
            .create_envelope_from_document(request, &[("Content-Type".to_string(), "text/plain".to_string())])
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let post = &seen[1];
        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.uri.to_string(), "https://api.example.com/v2/accounts/1234567/envelopes");
        let content_type = post.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(
            post.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("content-type")).count(),
            1
        );
        let body = String::from_utf8(post.body.clone().unwrap()).unwrap();
        assert!(body.contains("Content-Disposition: file; documentid=1; name=\"file1\""));
        assert!(body.contains("\"status\":\"created\""));
        assert!(body.contains("%PDF-1.4"));
    }

    #[test]
    fn create_envelope_reports_unreadable_document() {
        let transport = FakeTransport::new(200, LOGIN_BODY);
        let client = DocuSignClient::with_transport(config().with_account_id("1"), transport.clone()).unwrap();
        let request = EnvelopeRequest::new("s").document(DocumentRef::from_path("/no/such/file.pdf"));
        assert!(matches!(
            client.create_envelope_from_document(request, &[]),
            Err(DocuSignError::Document { .. })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = ClientConfig::new("ftp://example.com", Credentials::new("u", "p", "k"));
        assert!(matches!(
            DocuSignClient::with_transport(bad, FakeTransport::new(200, "")),
            Err(DocuSignError::Configuration(_))
        ));
    }

    #[test]
    fn disabling_tls_verification_still_builds() {
        let client = DocuSignClient::new(config().accept_invalid_certs(true)).unwrap();
        assert!(client.config().accept_invalid_certs);
    }
}
