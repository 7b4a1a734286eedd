//! Cached derivation of HMAC key material from trust-root secrets.
//!
//! Keying an HMAC state from a secret happens once per distinct secret for
//! the lifetime of the process; every verification afterwards clones the
//! cached state. The cache has no eviction: secrets are few and
//! long-lived (typically exactly one configured trust root), so rotating a
//! secret at runtime requires a process restart.

use crate::error::VerifyError;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Process-lifetime cache of pre-keyed HMAC-SHA256 states, keyed by the
/// secret they were derived from.
///
/// Owned by a [`Verifier`] instance rather than living in module-level
/// state, so tests can construct isolated verifiers with independent
/// caches.
///
/// # Concurrency
///
/// A mutex-guarded map with write-once-per-key semantics. Derivation runs
/// under the lock, so concurrent first lookups of the same secret perform
/// exactly one derivation. The map is append-only; an abandoned
/// verification can never leave it in a corrupt state.
///
/// [`Verifier`]: crate::Verifier
pub struct KeyCache {
    keys: Mutex<HashMap<String, HmacSha256>>,
    derivations: AtomicU64,
}

impl KeyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            derivations: AtomicU64::new(0),
        }
    }

    /// Return a keyed MAC state for `secret`, deriving and caching it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Unconfigured`] for an empty secret: an
    /// empty trust root cannot authenticate anyone and indicates a
    /// deployment fault rather than a bad request.
    pub(crate) fn mac_for(&self, secret: &SecretString) -> Result<HmacSha256, VerifyError> {
        let raw = secret.expose_secret();
        if raw.is_empty() {
            tracing::warn!(
                target: "edge_auth.keys",
                "Trust-root secret is empty; refusing to derive key material"
            );
            return Err(VerifyError::Unconfigured);
        }

        // Lock poisoning is recoverable here: the map is append-only, so
        // whatever a panicking thread managed to insert is still valid.
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(mac) = keys.get(raw) {
            return Ok(mac.clone());
        }

        let mac =
            HmacSha256::new_from_slice(raw.as_bytes()).map_err(|_| VerifyError::Unconfigured)?;
        keys.insert(raw.to_string(), mac.clone());
        let total = self.derivations.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            target: "edge_auth.keys",
            cached_keys = keys.len(),
            derivations = total,
            "Derived and cached HMAC key material for a new trust-root secret"
        );
        Ok(mac)
    }

    /// Number of distinct secrets with cached key material.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether any key material has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of key-derivation events since construction.
    ///
    /// A steady-state process serving one trust root reports `1` here
    /// regardless of request volume.
    #[must_use]
    pub fn derivations(&self) -> u64 {
        self.derivations.load(Ordering::Relaxed)
    }
}

impl Default for KeyCache {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug: the map keys are secret values and must never be printed.
impl fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCache")
            .field("cached_keys", &self.len())
            .field("derivations", &self.derivations())
            .finish()
    }
}
