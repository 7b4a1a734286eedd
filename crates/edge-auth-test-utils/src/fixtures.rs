//! Fixed fixture values shared across test suites.
//!
//! Keeping these in one place means a token minted in one test file
//! verifies against the secret used in another without magic strings
//! drifting apart.

/// Default trust-root secret used by test tokens.
pub const TEST_SECRET: &str = "s3cr3t";

/// A second secret that must never verify tokens signed with
/// [`TEST_SECRET`].
pub const WRONG_SECRET: &str = "n0t-the-s3cr3t";

/// Default subject stamped into test tokens.
pub const TEST_SUBJECT: &str = "user-42";
