//! Multipart body for envelope creation.
//!
//! # Design
//! DocuSign expects the envelope-definition JSON as the first part, then one
//! part per document whose `Content-Disposition` starts with
//! `file; documentid=<n>`. Generic form-data encoders always emit
//! `form-data; name=...` first, so the body is written here directly.
//! Part `n` is named `file<n>` and carries the same `n` as the JSON
//! `documentId`.

use uuid::Uuid;

const CRLF: &[u8] = b"\r\n";

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Part {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::with_boundary(format!("docusign-{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// `Content-Type` value for the enclosing request.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// The envelope-definition JSON part.
    pub fn json_part(&mut self, json: String) -> &mut Self {
        self.parts.push(Part {
            name: "post_body".to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Content-Disposition".to_string(), "form-data".to_string()),
            ],
            body: json.into_bytes(),
        });
        self
    }

    /// A document part tagged with its 1-based `document_id`.
    pub fn document_part(
        &mut self,
        document_id: usize,
        filename: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> &mut Self {
        let name = format!("file{document_id}");
        let disposition = format!(
            "file; documentid={document_id}; name=\"{name}\"; filename=\"{}\"",
            quote_filename(filename)
        );
        self.parts.push(Part {
            name,
            headers: vec![
                ("Content-Type".to_string(), strip_line_breaks(content_type)),
                ("Content-Disposition".to_string(), disposition),
            ],
            body: content,
        });
        self
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let delimiter = format!("--{}", self.boundary);
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(delimiter.as_bytes());
            out.extend_from_slice(CRLF);
            for (name, value) in &part.headers {
                out.extend_from_slice(format!("{name}: {value}").as_bytes());
                out.extend_from_slice(CRLF);
            }
            out.extend_from_slice(CRLF);
            out.extend_from_slice(&part.body);
            out.extend_from_slice(CRLF);
        }
        out.extend_from_slice(delimiter.as_bytes());
        out.extend_from_slice(b"--");
        out.extend_from_slice(CRLF);
        out
    }
}

fn strip_line_breaks(raw: &str) -> String {
    raw.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

fn quote_filename(raw: &str) -> String {
    strip_line_breaks(raw).replace('\\', "\\\\").replace('"', "\\\"")
}
