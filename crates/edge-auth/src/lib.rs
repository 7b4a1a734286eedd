//! Bearer-token verification for edge API requests.
//!
//! This crate authenticates inbound requests by validating a compact,
//! three-part HMAC-SHA256-signed claims token against a shared trust-root
//! secret, without pulling in a full identity SDK. It exposes a fail-closed
//! entry point ([`Verifier::verify_required`]) for endpoints that mandate
//! authentication and a fail-open-to-anonymous entry point
//! ([`Verifier::verify_optional`]) that preserves the rejection reason for
//! audit logging.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HMAC-SHA256 (`HS256`) is accepted; the algorithm header is
//!   pinned before any cryptographic work
//! - Signature tags are compared in constant time
//! - Client-facing error messages are generic; detail goes to debug logs
//! - Subjects, tokens, and secrets are redacted in `Debug` output

#![warn(clippy::pedantic)]

/// Module for authorization-header token extraction
pub mod bearer;

/// Module for the validated identity bundle
pub mod claims;

/// Module for environment-sourced configuration
pub mod config;

/// Module for the verification error taxonomy
pub mod error;

/// Module for cached HMAC key derivation
pub mod key_cache;

/// Module for axum middleware integration (feature `axum`)
#[cfg(feature = "axum")]
pub mod middleware;

/// Module for the credential verifier
pub mod verifier;

pub use bearer::extract_bearer;
pub use claims::Identity;
pub use config::AuthConfig;
pub use error::VerifyError;
pub use key_cache::KeyCache;
pub use verifier::{AuthOutcome, Verifier, MAX_TOKEN_SIZE_BYTES, PINNED_ALGORITHM};
