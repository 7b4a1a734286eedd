//! Credential verification for HMAC-SHA256-signed bearer tokens.
//!
//! The token format is a fixed external contract dictated by the issuer:
//! three base64url segments joined by `.`, holding a JSON header with the
//! algorithm marker, a JSON payload with the claims, and the raw
//! HMAC-SHA256 tag computed over the encoded `header.payload` text.
//! Any change to segment encoding, separator, or algorithm marker breaks
//! interoperability with already-issued tokens.
//!
//! # Security
//!
//! Validation order is: size guard, structural split, header decode,
//! algorithm pinning, signature verification, payload decode, expiry,
//! subject extraction. Pinning runs BEFORE any cryptographic work so an
//! algorithm-confusion attempt never reaches the MAC; the MAC is checked
//! over the raw encoded text BEFORE the payload is parsed, so a tampered
//! payload always reads as a signature failure, never as a parse error.

use crate::claims::Identity;
use crate::config::{AuthConfig, DEFAULT_SUBJECT_CLAIMS};
use crate::error::VerifyError;
use crate::key_cache::KeyCache;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use hmac::Mac;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The only accepted value for the header's algorithm field, compared
/// case-insensitively.
pub const PINNED_ALGORITHM: &str = "HS256";

/// Maximum allowed token size in bytes (8KB).
///
/// Oversized tokens are rejected BEFORE any decoding or cryptographic
/// work. Typical tokens are 200-500 bytes; the limit leaves room for
/// claim growth while bounding the work an unauthenticated caller can
/// demand. Per OWASP API4:2023 (Unrestricted Resource Consumption).
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

// The issuer emits unpadded base64url, but the wire contract restores
// padding before decoding, so inbound segments are accepted either way.
const B64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Token header claims. Fields other than the algorithm marker are
/// ignored. The marker is kept as a raw value so that a well-formed
/// header with a non-string `alg` reads as an algorithm failure, not a
/// parse failure.
#[derive(Deserialize)]
struct TokenHeader {
    alg: Option<Value>,
}

/// Result of the fail-open verification path.
///
/// Degrade-to-anonymous is a typed branch, not a swallowed error: when a
/// credential was presented but rejected, the rejection reason rides
/// along so callers can log "invalid credential" distinctly from "no
/// credential".
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// A credential was presented and verified.
    Authenticated(Identity),

    /// No usable credential. `rejected` is `None` when no credential was
    /// presented, and carries the failure kind when one was presented
    /// but failed verification.
    Anonymous {
        /// Why a presented credential was rejected, if one was presented.
        rejected: Option<VerifyError>,
    },
}

impl AuthOutcome {
    /// The verified identity, if authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthOutcome::Authenticated(identity) => Some(identity),
            AuthOutcome::Anonymous { .. } => None,
        }
    }

    /// The failure that downgraded this request to anonymous, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&VerifyError> {
        match self {
            AuthOutcome::Authenticated(_) => None,
            AuthOutcome::Anonymous { rejected } => rejected.as_ref(),
        }
    }

    /// Whether a credential was presented and verified.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }

    /// Whether the request proceeds without an identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        !self.is_authenticated()
    }
}

/// Verifies HMAC-SHA256-signed bearer tokens against a shared trust-root
/// secret.
///
/// Each verification call is an independent, synchronous computation;
/// the only shared state is the append-only [`KeyCache`], so concurrent
/// verifications need no coordination.
///
/// # Trust decisions
///
/// A payload without an `exp` claim never expires. This preserves
/// compatibility with already-issued tokens and places the expiry
/// decision with the issuer; deployments that require bounded lifetimes
/// must ensure the issuer always stamps `exp`.
pub struct Verifier {
    keys: KeyCache,
    subject_claims: Vec<String>,
}

impl Verifier {
    /// Create a verifier with a fresh key cache and the default subject
    /// claim vocabulary (`sub`, `user_id`, `uid`).
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: KeyCache::new(),
            subject_claims: DEFAULT_SUBJECT_CLAIMS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Create a verifier taking its subject claim vocabulary from
    /// configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new().with_subject_claims(config.subject_claims.clone())
    }

    /// Replace the ordered list of payload fields accepted as the
    /// subject identifier. First non-empty string match wins.
    #[must_use]
    pub fn with_subject_claims(mut self, names: Vec<String>) -> Self {
        self.subject_claims = names;
        self
    }

    /// Replace the key cache. Lets tests and multi-verifier setups
    /// inject an isolated or shared cache.
    #[must_use]
    pub fn with_key_cache(mut self, cache: KeyCache) -> Self {
        self.keys = cache;
        self
    }

    /// The key-derivation cache owned by this verifier.
    #[must_use]
    pub fn key_cache(&self) -> &KeyCache {
        &self.keys
    }

    /// Verify a token against the trust-root secret and extract the
    /// caller's identity.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::MalformedToken`] - wrong segment count, oversized
    ///   token, invalid encoding or JSON in the header or payload
    /// - [`VerifyError::UnsupportedAlgorithm`] - header algorithm is not
    ///   `HS256` (compared case-insensitively)
    /// - [`VerifyError::InvalidSignature`] - the HMAC-SHA256 tag does not
    ///   match the encoded `header.payload` text under `secret`
    /// - [`VerifyError::TokenExpired`] - current time is at or past `exp`
    /// - [`VerifyError::MissingSubject`] - no accepted subject field holds
    ///   a non-empty string
    /// - [`VerifyError::Unconfigured`] - `secret` is empty
    pub fn verify(&self, token: &str, secret: &SecretString) -> Result<Identity, VerifyError> {
        self.verify_at(token, secret, chrono::Utc::now().timestamp())
    }

    /// Fail-closed entry point for endpoints that mandate authentication.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MissingCredential`] when no token is
    /// presented; otherwise delegates to [`verify`](Self::verify) and
    /// propagates its failures unchanged.
    pub fn verify_required(
        &self,
        token: Option<&str>,
        secret: &SecretString,
    ) -> Result<Identity, VerifyError> {
        match token {
            Some(t) if !t.is_empty() => self.verify(t, secret),
            _ => {
                tracing::debug!(
                    target: "edge_auth.verifier",
                    "Request rejected: no credential presented where one is required"
                );
                Err(VerifyError::MissingCredential)
            }
        }
    }

    /// Fail-open entry point: absent or invalid credentials degrade to
    /// [`AuthOutcome::Anonymous`] instead of failing the request.
    ///
    /// # Errors
    ///
    /// Only [`VerifyError::Unconfigured`] propagates: a missing trust
    /// root means the system cannot authenticate anyone, optional or not.
    /// Every token-validity failure is converted into an anonymous
    /// outcome that retains the failure kind for audit logging.
    pub fn verify_optional(
        &self,
        token: Option<&str>,
        secret: &SecretString,
    ) -> Result<AuthOutcome, VerifyError> {
        let Some(t) = token.filter(|t| !t.is_empty()) else {
            return Ok(AuthOutcome::Anonymous { rejected: None });
        };

        match self.verify(t, secret) {
            Ok(identity) => Ok(AuthOutcome::Authenticated(identity)),
            Err(VerifyError::Unconfigured) => Err(VerifyError::Unconfigured),
            Err(reason) => {
                tracing::debug!(
                    target: "edge_auth.verifier",
                    reason = reason.code(),
                    "Credential presented but rejected; proceeding as anonymous"
                );
                Ok(AuthOutcome::Anonymous {
                    rejected: Some(reason),
                })
            }
        }
    }

    /// Deterministic verification against an explicit `now` timestamp.
    ///
    /// Prefer [`verify`](Self::verify) in production code. This variant
    /// exists so that expiry boundary conditions can be unit-tested
    /// without wall-clock dependence.
    pub(crate) fn verify_at(
        &self,
        token: &str,
        secret: &SecretString,
        now: i64,
    ) -> Result<Identity, VerifyError> {
        // A missing trust root is a deployment fault and outranks any
        // token-shape failure.
        if secret.expose_secret().is_empty() {
            return Err(VerifyError::Unconfigured);
        }

        if token.len() > MAX_TOKEN_SIZE_BYTES {
            tracing::debug!(
                target: "edge_auth.verifier",
                token_size = token.len(),
                max_size = MAX_TOKEN_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(VerifyError::MalformedToken);
        }

        // Token format: header.payload.signature
        let (signing_input, signature_b64) = token
            .rsplit_once('.')
            .ok_or(VerifyError::MalformedToken)?;
        let (header_b64, payload_b64) = signing_input
            .split_once('.')
            .ok_or(VerifyError::MalformedToken)?;
        if payload_b64.contains('.') {
            tracing::debug!(
                target: "edge_auth.verifier",
                "Token rejected: more than three segments"
            );
            return Err(VerifyError::MalformedToken);
        }

        let header_bytes = B64_URL.decode(header_b64).map_err(|e| {
            tracing::debug!(target: "edge_auth.verifier", error = %e, "Failed to decode token header");
            VerifyError::MalformedToken
        })?;
        let header: TokenHeader = serde_json::from_slice(&header_bytes).map_err(|e| {
            tracing::debug!(target: "edge_auth.verifier", error = %e, "Failed to parse token header JSON");
            VerifyError::MalformedToken
        })?;

        // Pin the algorithm before touching any key material.
        let alg = header.alg.as_ref().and_then(Value::as_str).unwrap_or_default();
        if !alg.eq_ignore_ascii_case(PINNED_ALGORITHM) {
            tracing::debug!(
                target: "edge_auth.verifier",
                algorithm = alg,
                "Token rejected: algorithm is not the pinned HMAC-SHA256 marker"
            );
            return Err(VerifyError::UnsupportedAlgorithm);
        }

        // The tag covers the encoded header.payload text, not the decoded
        // bytes. A signature segment that fails to decode can never match
        // any tag, so it reads as a signature failure.
        let signature = B64_URL
            .decode(signature_b64)
            .map_err(|_| VerifyError::InvalidSignature)?;
        let mut mac = self.keys.mac_for(secret)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            tracing::debug!(
                target: "edge_auth.verifier",
                "Token rejected: signature verification failed"
            );
            VerifyError::InvalidSignature
        })?;

        let payload_bytes = B64_URL.decode(payload_b64).map_err(|e| {
            tracing::debug!(target: "edge_auth.verifier", error = %e, "Failed to decode token payload");
            VerifyError::MalformedToken
        })?;
        let claims: Map<String, Value> = serde_json::from_slice(&payload_bytes).map_err(|e| {
            tracing::debug!(target: "edge_auth.verifier", error = %e, "Failed to parse token payload JSON");
            VerifyError::MalformedToken
        })?;

        // Absent exp means the token never expires; expiry is at-or-past.
        if let Some(exp) = claims.get("exp").and_then(Value::as_i64) {
            if now >= exp {
                tracing::debug!(
                    target: "edge_auth.verifier",
                    "Token rejected: expired"
                );
                return Err(VerifyError::TokenExpired);
            }
        }

        // First non-empty string match wins; empty or non-string values
        // fall through to the next accepted field name.
        let subject = self
            .subject_claims
            .iter()
            .find_map(|name| {
                claims
                    .get(name)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .ok_or_else(|| {
                tracing::debug!(
                    target: "edge_auth.verifier",
                    "Token rejected: no recognized subject claim"
                );
                VerifyError::MissingSubject
            })?
            .to_string();

        Ok(Identity::new(subject, token.to_string(), claims))
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}
