//! Bearer-scheme token extraction from an `Authorization` header value.

/// Extract the bearer token from an `Authorization` header value.
///
/// Splits on whitespace, recognizes only the case-insensitive scheme
/// literal `bearer`, and returns the remaining value trimmed. Returns
/// `None` if the scheme does not match or no value follows.
///
/// This is a parsing convenience for the request-handling layer, not a
/// trust boundary: it performs no validation of the token's contents.
///
/// # Example
///
/// ```rust
/// use edge_auth::extract_bearer;
///
/// assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
/// assert_eq!(extract_bearer("bearer abc.def.ghi"), Some("abc.def.ghi"));
/// assert_eq!(extract_bearer("Basic dXNlcjpwYXNz"), None);
/// assert_eq!(extract_bearer("Bearer"), None);
/// ```
#[must_use]
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    let (scheme, rest) = header_value.trim_start().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_standard_header() {
        assert_eq!(extract_bearer("Bearer tok123"), Some("tok123"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer("bearer tok123"), Some("tok123"));
        assert_eq!(extract_bearer("BEARER tok123"), Some("tok123"));
        assert_eq!(extract_bearer("BeArEr tok123"), Some("tok123"));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(extract_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer("Digest nonce=abc"), None);
        // The scheme must be the literal word, not a prefix of it.
        assert_eq!(extract_bearer("Bearerx tok123"), None);
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(extract_bearer("Bearer"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Bearer    "), None);
        assert_eq!(extract_bearer(""), None);
    }

    #[test]
    fn test_extra_whitespace_is_trimmed() {
        assert_eq!(extract_bearer("Bearer   tok123  "), Some("tok123"));
        assert_eq!(extract_bearer("  Bearer tok123"), Some("tok123"));
    }

    #[test]
    fn test_tab_separator() {
        assert_eq!(extract_bearer("Bearer\ttok123"), Some("tok123"));
    }
}
