//! Envelope request model and its JSON payload.
//!
//! # Design
//! Signers and documents are numbered by position, starting at 1, each list
//! independently. The remote API correlates uploaded file parts with the
//! `documents` array through `documentId`, so the same numbering is reused
//! by the multipart builder. Ids are string-typed to match DocuSign's
//! envelope-definition schema.
//!
//! The payload is serialized from typed records with `serde_json`; names and
//! subjects may contain quotes, backslashes or control characters.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocuSignError, Result};

pub const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// A recipient who signs the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub email: String,
    pub name: String,
}

impl Signer {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Where a document's bytes come from.
pub enum DocumentContent {
    Bytes(Vec<u8>),
    /// An already-open stream, read to the end when the envelope is sent.
    Reader(Box<dyn Read + Send>),
    /// Opened and closed by the client while building the request.
    Path(PathBuf),
}

impl fmt::Debug for DocumentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentContent::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            DocumentContent::Reader(_) => f.write_str("Reader"),
            DocumentContent::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

/// A document to upload, with the display name shown to recipients.
#[derive(Debug)]
pub struct DocumentRef {
    pub name: String,
    pub content_type: String,
    pub content: DocumentContent,
}

impl DocumentRef {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_content(name, DocumentContent::Bytes(bytes.into()))
    }

    pub fn from_reader(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self::with_content(name, DocumentContent::Reader(Box::new(reader)))
    }

    /// The display name is the path's file name, never the full path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::with_content(name, DocumentContent::Path(path.to_path_buf()))
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    fn with_content(name: impl Into<String>, content: DocumentContent) -> Self {
        Self {
            name: name.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content,
        }
    }

    /// Load the document's bytes. Consumes reader content.
    pub fn read_content(&mut self) -> Result<Vec<u8>> {
        let io_err = |source| DocuSignError::Document {
            name: self.name.clone(),
            source,
        };
        match &mut self.content {
            DocumentContent::Bytes(bytes) => Ok(bytes.clone()),
            DocumentContent::Reader(reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).map_err(io_err)?;
                Ok(buf)
            }
            DocumentContent::Path(path) => std::fs::read(path).map_err(io_err),
        }
    }
}

/// Envelope status at creation: send now, or save as a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    #[default]
    Sent,
    Created,
}

impl fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeStatus::Sent => f.write_str("sent"),
            EnvelopeStatus::Created => f.write_str("created"),
        }
    }
}

/// Everything needed to create an envelope from uploaded documents.
#[derive(Debug)]
pub struct EnvelopeRequest {
    pub email_subject: String,
    pub email_blurb: String,
    pub documents: Vec<DocumentRef>,
    pub signers: Vec<Signer>,
    pub status: EnvelopeStatus,
}

impl EnvelopeRequest {
    pub fn new(email_subject: impl Into<String>) -> Self {
        Self {
            email_subject: email_subject.into(),
            email_blurb: String::new(),
            documents: Vec::new(),
            signers: Vec::new(),
            status: EnvelopeStatus::default(),
        }
    }

    pub fn email_blurb(mut self, blurb: impl Into<String>) -> Self {
        self.email_blurb = blurb.into();
        self
    }

    pub fn document(mut self, document: DocumentRef) -> Self {
        self.documents.push(document);
        self
    }

    pub fn signer(mut self, signer: Signer) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn status(mut self, status: EnvelopeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        envelope_body(
            &self.email_subject,
            &self.email_blurb,
            &self.documents,
            &self.signers,
            self.status,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerEntry {
    pub email: String,
    pub name: String,
    pub recipient_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub document_id: String,
    pub name: String,
}

#[derive(Serialize)]
struct Recipients {
    signers: Vec<SignerEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeDefinition<'a> {
    email_blurb: &'a str,
    email_subject: &'a str,
    documents: Vec<DocumentEntry>,
    recipients: Recipients,
    status: EnvelopeStatus,
}

/// Number signers 1..N in input order.
pub fn signers_fragment(signers: &[Signer]) -> Vec<SignerEntry> {
    signers
        .iter()
        .enumerate()
        .map(|(i, s)| SignerEntry {
            email: s.email.clone(),
            name: s.name.clone(),
            recipient_id: (i + 1).to_string(),
        })
        .collect()
}

/// Number documents 1..N in input order.
pub fn documents_fragment(documents: &[DocumentRef]) -> Vec<DocumentEntry> {
    documents
        .iter()
        .enumerate()
        .map(|(i, d)| DocumentEntry {
            document_id: (i + 1).to_string(),
            name: d.name.clone(),
        })
        .collect()
}

/// Serialize the envelope-definition JSON sent alongside the file parts.
pub fn envelope_body(
    email_subject: &str,
    email_blurb: &str,
    documents: &[DocumentRef],
    signers: &[Signer],
    status: EnvelopeStatus,
) -> Result<String> {
    let definition = EnvelopeDefinition {
        email_blurb,
        email_subject,
        documents: documents_fragment(documents),
        recipients: Recipients {
            signers: signers_fragment(signers),
        },
        status,
    };
    Ok(serde_json::to_string(&definition)?)
}
