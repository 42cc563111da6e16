//! Request header merging.
//!
//! Precedence, lowest to highest: the `Accept` default, caller overrides,
//! then the authentication header. Names compare case-insensitively.

use quick_xml::escape::escape;

use crate::config::Credentials;

pub const AUTH_HEADER: &str = "X-DocuSign-Authentication";
pub const ACCEPT: &str = "Accept";
pub const DEFAULT_ACCEPT: &str = "application/json";

/// Merge caller headers over the defaults and append the auth header.
pub fn build_headers(credentials: &Credentials, overrides: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = vec![(ACCEPT.to_string(), DEFAULT_ACCEPT.to_string())];
    for (name, value) in overrides {
        set_header(&mut headers, name, value);
    }
    set_header(&mut headers, AUTH_HEADER, &auth_value(credentials));
    headers
}

/// XML credential fragment carried in `X-DocuSign-Authentication`.
pub fn auth_value(credentials: &Credentials) -> String {
    format!(
        "<DocuSignCredentials><Username>{}</Username><Password>{}</Password><IntegratorKey>{}</IntegratorKey></DocuSignCredentials>",
        escape(&credentials.username),
        escape(&credentials.password),
        escape(&credentials.integrator_key),
    )
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("user@example.com", "s3cret", "KEY-1")
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    fn get<'a>(headers: &'a [(String, String)], name: &str) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn defaults_to_json_accept_and_auth() {
        let headers = build_headers(&creds(), &[]);
        assert_eq!(
            headers,
            vec![
                pair("Accept", "application/json"),
                pair(
                    "X-DocuSign-Authentication",
                    "<DocuSignCredentials><Username>user@example.com</Username><Password>s3cret</Password><IntegratorKey>KEY-1</IntegratorKey></DocuSignCredentials>"
                ),
            ]
        );
    }

    #[test]
    fn caller_accept_overrides_default() {
        let headers = build_headers(&creds(), &[pair("accept", "application/xml")]);
        assert_eq!(get(&headers, "Accept"), vec!["application/xml"]);
    }

    #[test]
    fn caller_cannot_override_auth_header() {
        let headers = build_headers(&creds(), &[pair("x-docusign-authentication", "forged")]);
        let auth = get(&headers, AUTH_HEADER);
        assert_eq!(auth.len(), 1);
        assert!(auth[0].contains("<Username>user@example.com</Username>"));
    }

    #[test]
    fn extra_headers_are_kept_in_order() {
        let headers = build_headers(
            &creds(),
            &[pair("X-Request-Id", "abc"), pair("Content-Type", "text/plain")],
        );
        let names: Vec<&str> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["Accept", "X-Request-Id", "Content-Type", "X-DocuSign-Authentication"]
        );
    }

    #[test]
    fn credentials_are_xml_escaped() {
        let value = auth_value(&Credentials::new("a&b", "<pw>\"'", "k"));
        assert!(value.contains("<Username>a&amp;b</Username>"));
        assert!(value.contains("<Password>&lt;pw&gt;&quot;&apos;</Password>"));
    }
}
