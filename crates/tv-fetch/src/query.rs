// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Query parameters that drive the fetch path

use url::{Url, form_urlencoded};

use crate::error::{FetchError, FetchResult};

/// Query key holding the payload URL.
pub const PAYLOAD_PARAM: &str = "payload";
/// Query key holding the path prefix for source location resolution.
pub const PATH_PREFIX_PARAM: &str = "pathPrefix";

/// The viewer's query parameters relevant to payload loading.
///
/// Repeated keys keep their first value; values are trimmed and blank
/// values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadQuery {
    payload: Option<String>,
    path_prefix: Option<String>,
}

impl PayloadQuery {
    /// Parse a raw query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut parsed = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                PAYLOAD_PARAM => &mut parsed.payload,
                PATH_PREFIX_PARAM => &mut parsed.path_prefix,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.trim().to_string());
            }
        }
        parsed.payload = parsed.payload.filter(|v| !v.is_empty());
        parsed.path_prefix = parsed.path_prefix.filter(|v| !v.is_empty());
        parsed
    }

    /// Accept what an operator would paste: a full viewer URL, a bare query
    /// string, or the payload URL itself.
    pub fn from_location(input: &str) -> Self {
        let input = input.trim();
        if let Ok(url) = Url::parse(input) {
            let query = Self::parse(url.query().unwrap_or_default());
            if query.payload.is_some() {
                return query;
            }
            return Self::for_payload(input);
        }
        Self::parse(input)
    }

    /// Query carrying only a payload URL.
    pub fn for_payload(url: &str) -> Self {
        let payload = Some(url.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            payload,
            path_prefix: None,
        }
    }

    pub fn with_path_prefix(mut self, prefix: Option<&str>) -> Self {
        self.path_prefix = prefix.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
        self
    }

    /// Trimmed payload value, `None` when absent or blank.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    /// The payload value as a URL. `Ok(None)` means there is nothing to fetch.
    pub fn payload_url(&self) -> FetchResult<Option<Url>> {
        self.payload.as_deref().map(parse_payload_url).transpose()
    }
}

/// Parse a trimmed payload value as an absolute URL with a host.
pub fn parse_payload_url(value: &str) -> FetchResult<Url> {
    let invalid = |source| FetchError::InvalidUrl {
        value: value.to_string(),
        source,
    };
    let url = Url::parse(value).map_err(invalid)?;
    if url.host().is_none() {
        return Err(invalid(url::ParseError::EmptyHost));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_value_wins_and_is_trimmed() {
        let query = PayloadQuery::parse(
            "?payload=%20https%3A%2F%2Fhost%2Fa.json%20&payload=https://host/b.json&x=1",
        );
        assert_eq!(query.payload(), Some("https://host/a.json"));
        assert_eq!(query.path_prefix(), None);
    }

    #[test]
    fn blank_values_are_absent() {
        let query = PayloadQuery::parse("payload=%20%20&pathPrefix=");
        assert_eq!(query, PayloadQuery::default());
        assert!(query.payload_url().expect("nothing to parse").is_none());
    }

    #[test]
    fn relative_payload_is_invalid() {
        let query = PayloadQuery::parse("payload=/local/a.json");
        let err = query.payload_url().unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { ref value, .. } if value == "/local/a.json"));
        assert!(!err.is_fetch_failure());
    }

    #[test]
    fn payload_url_needs_a_host() {
        let err = parse_payload_url("mailto:ci@example.com").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert!(parse_payload_url("http://127.0.0.1:8080/a.json").is_ok());
    }

    #[test]
    fn path_prefix_is_read() {
        let query = PayloadQuery::parse("payload=https://h/a.json&pathPrefix=/var/agent/1/s");
        assert_eq!(query.path_prefix(), Some("/var/agent/1/s"));
        assert_eq!(
            query.payload_url().expect("valid").map(|u| u.to_string()).as_deref(),
            Some("https://h/a.json")
        );
    }

    #[test]
    fn from_location_accepts_viewer_urls_queries_and_payload_urls() {
        let viewer = PayloadQuery::from_location(
            "https://viewer.local/?payload=https%3A%2F%2Fci%2Fr.json&pathPrefix=%2Fs",
        );
        assert_eq!(viewer.payload(), Some("https://ci/r.json"));
        assert_eq!(viewer.path_prefix(), Some("/s"));

        let bare = PayloadQuery::from_location("payload=https://ci/r.json");
        assert_eq!(bare.payload(), Some("https://ci/r.json"));

        let direct = PayloadQuery::from_location("https://ci/artifacts/r.json?sig=abc");
        assert_eq!(direct.payload(), Some("https://ci/artifacts/r.json?sig=abc"));
    }
}
