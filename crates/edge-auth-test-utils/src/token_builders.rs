//! Builder patterns for minting test tokens.
//!
//! Provides a fluent API for constructing HMAC-SHA256-signed tokens with
//! full control over the header and claims, so tests can produce both
//! conforming credentials and deliberately broken ones.

use crate::fixtures::TEST_SUBJECT;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Builder for creating signed test tokens.
///
/// Defaults to subject `user-42`, the `HS256` algorithm marker, and an
/// expiry one hour in the future.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice")
///     .claim("role", serde_json::json!("editor"))
///     .expires_in(3600)
///     .sign(TEST_SECRET);
/// ```
pub struct TestTokenBuilder {
    algorithm: Option<String>,
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults.
    pub fn new() -> Self {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(TEST_SUBJECT));
        claims.insert(
            "exp".to_string(),
            json!((Utc::now() + Duration::seconds(3600)).timestamp()),
        );
        Self {
            algorithm: Some("HS256".to_string()),
            claims,
        }
    }

    /// Set the subject (`sub` claim).
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.claims.insert("sub".to_string(), json!(subject));
        self
    }

    /// Remove the default `sub` claim, for tokens that identify the
    /// caller through another field (or not at all).
    pub fn without_subject(mut self) -> Self {
        self.claims.remove("sub");
        self
    }

    /// Set an arbitrary claim.
    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Set expiration in seconds from now.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.insert(
            "exp".to_string(),
            json!((Utc::now() + Duration::seconds(seconds)).timestamp()),
        );
        self
    }

    /// Set expiration to an absolute Unix timestamp.
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.claims.insert("exp".to_string(), json!(timestamp));
        self
    }

    /// Remove the expiry claim entirely.
    pub fn without_expiry(mut self) -> Self {
        self.claims.remove("exp");
        self
    }

    /// Override the header's algorithm marker (e.g. `"none"`, `"RS256"`,
    /// or a case variant of `"HS256"`).
    pub fn algorithm(mut self, alg: &str) -> Self {
        self.algorithm = Some(alg.to_string());
        self
    }

    /// Remove the algorithm marker from the header entirely.
    pub fn without_algorithm(mut self) -> Self {
        self.algorithm = None;
        self
    }

    /// Build the claims as a JSON value without signing.
    pub fn build_claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign the token with `secret` and return the encoded credential.
    pub fn sign(self, secret: &str) -> String {
        let mut header = Map::new();
        if let Some(alg) = &self.algorithm {
            header.insert("alg".to_string(), json!(alg));
        }
        header.insert("typ".to_string(), json!("JWT"));

        let header_bytes =
            serde_json::to_vec(&Value::Object(header)).expect("header serializes to JSON");
        let payload_bytes = serde_json::to_vec(&Value::Object(self.claims))
            .expect("claims serialize to JSON");
        sign_raw_segments(&header_bytes, &payload_bytes, secret)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign arbitrary header and payload bytes into a token.
///
/// Unlike [`TestTokenBuilder::sign`] this does not require the segments
/// to be JSON, which lets tests exercise the "correctly signed but
/// structurally invalid" paths of the verifier.
pub fn sign_raw_segments(header: &[u8], payload: &[u8], secret: &str) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(header);
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let signing_input = format!("{header_b64}.{payload_b64}");

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{signing_input}.{signature}")
}

/// Return `token` with one character of the chosen segment replaced,
/// leaving it valid base64url text but a different byte sequence.
///
/// `segment_index` is 0 for the header, 1 for the payload, 2 for the
/// signature; `offset` is the character position within that segment.
///
/// # Panics
///
/// Panics if the segment or offset does not exist; a broken test input
/// should fail loudly.
pub fn tamper_segment(token: &str, segment_index: usize, offset: usize) -> String {
    let mut segments: Vec<String> = token.split('.').map(ToString::to_string).collect();
    let segment = segments
        .get_mut(segment_index)
        .expect("segment index exists");

    let original = segment
        .chars()
        .nth(offset)
        .expect("offset within segment");
    // Swap to a different character from the base64url alphabet.
    let replacement = if original == 'A' { 'B' } else { 'A' };
    let mut chars: Vec<char> = segment.chars().collect();
    chars[offset] = replacement;
    *segment = chars.into_iter().collect();

    segments.join(".")
}
