//! Validated identity bundle returned on verification success.

use serde_json::{Map, Value};
use std::fmt;

/// The authenticated caller extracted from a verified token.
///
/// An `Identity` exists only after signature, algorithm, and expiry checks
/// have all passed; there is no partially-trusted form. The bundle is
/// immutable once created.
///
/// # Security
///
/// The subject identifier and the raw token are redacted in `Debug`
/// output so request-scoped logging cannot leak credentials.
#[derive(Clone)]
pub struct Identity {
    subject: String,
    token: String,
    claims: Map<String, Value>,
}

impl Identity {
    pub(crate) fn new(subject: String, token: String, claims: Map<String, Value>) -> Self {
        Self {
            subject,
            token,
            claims,
        }
    }

    /// The resolved subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The original encoded token this identity was extracted from.
    ///
    /// Useful for forwarding the credential to a downstream collaborator;
    /// must never be logged.
    #[must_use]
    pub fn raw_token(&self) -> &str {
        &self.token
    }

    /// The full decoded payload claims.
    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Look up a single claim by name.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// The expiry timestamp (Unix epoch seconds), if the token carries one.
    ///
    /// `None` means the token never expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.claims.get("exp").and_then(Value::as_i64)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims.len())
            .finish()
    }
}
