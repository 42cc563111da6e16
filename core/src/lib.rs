//! Synchronous client core for the DocuSign e-signature REST API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values, sends them through a
//! `Transport`, and returns raw `HttpResponse` values. Two operations are
//! exposed: fetching login information and creating an envelope from one or
//! more uploaded documents.
//!
//! # Design
//! - `DocuSignClient` holds an immutable `ClientConfig` and one piece of
//!   mutable state: the memoized account id.
//! - Each operation has a pure `build_*` method, so request construction is
//!   testable without a network.
//! - Signers and documents are numbered from 1 by position; the envelope JSON
//!   and the multipart file parts share that numbering.
//!
//! ```no_run
//! use docusign_core::{DocuSignClient, DocumentRef, EnvelopeRequest, Signer};
//!
//! let client = DocuSignClient::from_env()?;
//! let request = EnvelopeRequest::new("Please sign")
//!     .email_blurb("The contract is attached.")
//!     .signer(Signer::new("jane@example.com", "Jane Doe"))
//!     .document(DocumentRef::from_path("contract.pdf"));
//! let response = client.create_envelope_from_document(request, &[])?;
//! println!("{}: {}", response.status, response.text());
//! # Ok::<(), docusign_core::DocuSignError>(())
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod http;
pub mod multipart;
pub mod transport;
pub mod types;
pub mod uri;

pub use client::DocuSignClient;
pub use config::{ClientConfig, Credentials};
pub use envelope::{
    documents_fragment, envelope_body, signers_fragment, DocumentContent, DocumentEntry, DocumentRef,
    EnvelopeRequest, EnvelopeStatus, Signer, SignerEntry,
};
pub use error::{DocuSignError, Result};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use multipart::{MultipartBody, Part};
pub use transport::{Transport, UreqTransport};
pub use types::{LoginAccount, LoginInformation};
