//! Environment-sourced verifier configuration.
//!
//! The trust-root secret is read into a [`SecretString`] at load time and
//! never appears in `Debug` output. A missing secret is NOT a load error:
//! it surfaces as [`VerifyError::Unconfigured`] when verification is
//! attempted, so the wrapping service can map it to a server-error
//! response instead of failing at startup.
//!
//! [`VerifyError::Unconfigured`]: crate::VerifyError::Unconfigured

use crate::error::VerifyError;
use secrecy::SecretString;
use std::collections::HashMap;
use std::env;

/// Environment variable holding the shared trust-root secret.
pub const ENV_SECRET: &str = "EDGE_AUTH_SECRET";

/// Environment variable overriding the accepted subject claim names
/// (comma-separated, in priority order).
pub const ENV_SUBJECT_CLAIMS: &str = "EDGE_AUTH_SUBJECT_CLAIMS";

/// Default ordered list of payload fields accepted as the subject
/// identifier. First non-empty string match wins.
pub const DEFAULT_SUBJECT_CLAIMS: &[&str] = &["sub", "user_id", "uid"];

/// Verifier configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared trust-root secret, if configured.
    pub secret: Option<SecretString>,

    /// Ordered list of payload fields accepted as the subject identifier.
    pub subject_claims: Vec<String>,
}

impl AuthConfig {
    /// Load configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let secret = vars
            .get(ENV_SECRET)
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::from(s.clone()));

        if secret.is_none() {
            tracing::warn!(
                target: "edge_auth.config",
                var = ENV_SECRET,
                "Trust-root secret not set; verification will fail until it is configured"
            );
        }

        let subject_claims = vars
            .get(ENV_SUBJECT_CLAIMS)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty())
            .unwrap_or_else(default_subject_claims);

        Self {
            secret,
            subject_claims,
        }
    }

    /// The configured trust-root secret.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Unconfigured`] if no secret is configured.
    pub fn secret(&self) -> Result<&SecretString, VerifyError> {
        self.secret.as_ref().ok_or(VerifyError::Unconfigured)
    }
}

fn default_subject_claims() -> Vec<String> {
    DEFAULT_SUBJECT_CLAIMS
        .iter()
        .map(ToString::to_string)
        .collect()
}
