//! Error types for the DocuSign client.
//!
//! # Design
//! Non-2xx responses are not errors at this layer: the facade hands back the
//! raw `HttpResponse`, and callers opt into `RemoteApi` through
//! `HttpResponse::error_for_status`. Everything else that can go wrong
//! before or during the round-trip has its own variant.

use thiserror::Error;

/// Errors returned by `DocuSignClient` and its builders.
#[derive(Debug, Error)]
pub enum DocuSignError {
    /// Missing or invalid credentials, endpoint or API version.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `endpoint + "/" + version + path` is not an absolute URI.
    #[error("malformed URI {uri:?}: {reason}")]
    MalformedUri { uri: String, reason: String },

    /// Connection, TLS or timeout failure in the underlying transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The login-information response was unusable.
    #[error("could not resolve account id: {0}")]
    AccountResolution(String),

    /// A document's content could not be read.
    #[error("failed to read document {name:?}: {source}")]
    Document {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The envelope payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote API answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    RemoteApi { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, DocuSignError>;
