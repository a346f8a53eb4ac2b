//! Validation of raw document ids that are themselves URLs.

use url::Url;

use crate::error::{DocError, Result};

/// Check that `uri` is an absolute URL with a host.
///
/// Backslashes in the path part (before any `?`) are turned into `/` first,
/// which catches the most common hand-typed mistake. Characters that need
/// percent-encoding are encoded by the parser. Returns the parsed URL.
pub fn validate_uri(uri: &str) -> Result<Url> {
    if uri.trim().is_empty() {
        return Err(invalid(uri, "null or empty URI"));
    }

    let fixed = fixup(uri);
    let parsed = Url::parse(&fixed).map_err(|e| invalid(uri, e.to_string()))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid(uri, "no host")),
    }
}

fn fixup(uri: &str) -> String {
    match uri.split_once('?') {
        Some((path, query)) => format!("{}?{}", path.replace('\\', "/"), query),
        None => uri.replace('\\', "/"),
    }
}

fn invalid(uri: &str, reason: impl Into<String>) -> DocError {
    DocError::InvalidUri {
        uri: uri.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_with_host_is_accepted() {
        let url = validate_uri("http://example.com/docs/1").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let err = validate_uri("foo/bar").unwrap_err();
        assert!(matches!(err, DocError::InvalidUri { .. }));
    }

    #[test]
    fn test_empty_and_hostless() {
        assert!(matches!(
            validate_uri("  ").unwrap_err(),
            DocError::InvalidUri { ref reason, .. } if reason == "null or empty URI"
        ));
        assert!(matches!(
            validate_uri("mailto:someone@example.com").unwrap_err(),
            DocError::InvalidUri { ref reason, .. } if reason == "no host"
        ));
    }

    #[test]
    fn test_backslashes_fixed_before_query_only() {
        let url = validate_uri("http://example.com\\a\\b?x=c\\d").unwrap();
        assert_eq!(url.path(), "/a/b");
        assert!(url.query().unwrap().contains("c%5Cd") || url.query().unwrap().contains("c\\d"));
    }

    #[test]
    fn test_spaces_are_encoded() {
        let url = validate_uri("http://example.com/a b").unwrap();
        assert_eq!(url.path(), "/a%20b");
    }
}
