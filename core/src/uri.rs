//! Absolute URI construction from endpoint, API version and relative path.

use ::http::Uri;

use crate::error::{DocuSignError, Result};

/// `endpoint + "/" + api_version + relative_path`, parsed.
///
/// No slash normalization happens; `relative_path` should start with `/`.
pub fn build_uri(endpoint: &str, api_version: &str, relative_path: &str) -> Result<Uri> {
    let raw = format!("{endpoint}/{api_version}{relative_path}");
    let uri: Uri = raw.parse().map_err(|e: ::http::uri::InvalidUri| DocuSignError::MalformedUri {
        uri: raw.clone(),
        reason: e.to_string(),
    })?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(DocuSignError::MalformedUri {
            uri: raw,
            reason: "not an absolute URI".to_string(),
        });
    }
    Ok(uri)
}
