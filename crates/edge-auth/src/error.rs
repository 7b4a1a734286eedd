//! Error taxonomy for credential verification.
//!
//! Every variant is an expected, caller-recoverable condition; none should
//! crash the process. Client-facing messages are intentionally generic to
//! prevent information leakage. The distinguishing detail is the variant
//! itself, which callers match on and log server-side.

use thiserror::Error;

/// Failure kinds produced by the credential verifier.
///
/// All token-validity failures map to HTTP 401; [`Unconfigured`] is a
/// server fault, not a client auth failure, and maps to HTTP 500.
///
/// [`Unconfigured`]: VerifyError::Unconfigured
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// No token presented where one was required.
    #[error("authorization required")]
    MissingCredential,

    /// Structurally invalid token: wrong segment count, oversized,
    /// invalid encoding, or invalid JSON in the header or payload.
    #[error("the access token is invalid or expired")]
    MalformedToken,

    /// Cryptographic signature verification failed.
    #[error("the access token is invalid or expired")]
    InvalidSignature,

    /// Token header declares an algorithm other than the pinned HS256.
    #[error("the access token is invalid or expired")]
    UnsupportedAlgorithm,

    /// Current time is at or past the token's expiry claim.
    #[error("the access token is invalid or expired")]
    TokenExpired,

    /// No recognized subject claim present in the payload.
    #[error("the access token is invalid or expired")]
    MissingSubject,

    /// Trust-root secret is not available. A deployment fault: the
    /// system cannot authenticate anyone until the secret is configured.
    #[error("authentication is not configured")]
    Unconfigured,
}

impl VerifyError {
    /// Suggested HTTP status code for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            VerifyError::Unconfigured => 500,
            _ => 401,
        }
    }

    /// Stable machine-readable code for error envelopes and audit logs.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::MissingCredential => "MISSING_CREDENTIAL",
            VerifyError::MalformedToken => "MALFORMED_TOKEN",
            VerifyError::InvalidSignature => "INVALID_SIGNATURE",
            VerifyError::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            VerifyError::TokenExpired => "TOKEN_EXPIRED",
            VerifyError::MissingSubject => "MISSING_SUBJECT",
            VerifyError::Unconfigured => "VERIFIER_UNCONFIGURED",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_map_to_401() {
        for err in [
            VerifyError::MissingCredential,
            VerifyError::MalformedToken,
            VerifyError::InvalidSignature,
            VerifyError::UnsupportedAlgorithm,
            VerifyError::TokenExpired,
            VerifyError::MissingSubject,
        ] {
            assert_eq!(err.status_code(), 401, "{err:?} should map to 401");
        }
    }

    #[test]
    fn test_unconfigured_maps_to_500() {
        assert_eq!(VerifyError::Unconfigured.status_code(), 500);
    }

    #[test]
    fn test_display_messages_are_generic() {
        // No variant message may distinguish why a token was rejected.
        let validity_failures = [
            VerifyError::MalformedToken,
            VerifyError::InvalidSignature,
            VerifyError::UnsupportedAlgorithm,
            VerifyError::TokenExpired,
            VerifyError::MissingSubject,
        ];
        for err in &validity_failures {
            assert_eq!(err.to_string(), "the access token is invalid or expired");
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            VerifyError::MissingCredential.code(),
            VerifyError::MalformedToken.code(),
            VerifyError::InvalidSignature.code(),
            VerifyError::UnsupportedAlgorithm.code(),
            VerifyError::TokenExpired.code(),
            VerifyError::MissingSubject.code(),
            VerifyError::Unconfigured.code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
