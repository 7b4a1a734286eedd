//! # Edge Auth Test Utilities
//!
//! Shared test utilities for the bearer-token verification core.
//!
//! This crate provides:
//! - Fixed fixtures (secrets, subjects) for reproducible tests
//! - A fluent token builder that mints HMAC-SHA256-signed tokens,
//!   including deliberately broken ones (wrong algorithm, no expiry,
//!   raw non-JSON segment bodies)
//! - Tampering helpers for signature/payload corruption tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use edge_auth_test_utils::*;
//!
//! let token = TestTokenBuilder::new()
//!     .for_subject("alice")
//!     .expires_in(3600)
//!     .sign(TEST_SECRET);
//! ```

pub mod fixtures;
pub mod token_builders;

// Re-export commonly used items
pub use fixtures::*;
pub use token_builders::*;
