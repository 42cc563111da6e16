//! Executes `HttpRequest` values over the network.
//!
//! # Design
//! `Transport` is the seam between the pure request builders and real I/O,
//! so tests can count or script round-trips without a server. The default
//! `UreqTransport` builds a fresh agent per call: the connection is opened
//! for one request and released when the agent drops, on every exit path.
//! Status codes are never treated as errors here.

use std::time::Duration;

use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::{DocuSignError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Upper bound on a buffered response body.
pub const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Blocking HTTPS transport backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl UreqTransport {
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Self {
        Self {
            timeout,
            accept_invalid_certs,
        }
    }

    fn agent(&self) -> Agent {
        let tls = TlsConfig::builder()
            .disable_verification(self.accept_invalid_certs)
            .build();
        Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(self.timeout))
            .tls_config(tls)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let agent = self.agent();
        let uri = request.uri.to_string();
        debug!(method = request.method.as_str(), %uri, "sending request");

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = agent.get(uri.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = agent.post(uri.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_slice()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| DocuSignError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                let value = String::from_utf8_lossy(v.as_bytes()).into_owned();
                (k.as_str().to_string(), value)
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .map_err(|e| DocuSignError::Transport(e.to_string()))?;
        debug!(status, %uri, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
