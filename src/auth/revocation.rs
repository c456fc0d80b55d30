use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::store::SharedStore;
use crate::error::StoreError;

/// Key prefix of revocation records in the shared store.
pub const DESTROYED_TOKEN_PREFIX: &str = "destroyed-token:";

/// Retention of a revocation record: 180 days.
///
/// Shorter than the default token lifetime; a destroyed token older than this
/// becomes valid again once its record lapses.
pub const REVOCATION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 180);

/// Tracks explicitly destroyed tokens in the shared store.
///
/// Never cached locally: a revocation written by one process must be honoured
/// by every other process on the next request.
#[derive(Clone)]
pub struct RevocationChecker {
    store: Option<Arc<dyn SharedStore>>,
}

impl RevocationChecker {
    pub fn new(store: Option<Arc<dyn SharedStore>>) -> Self {
        Self { store }
    }

    /// Whether revocation is backed by a shared store.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn record_key(token: &str) -> String {
        format!("{DESTROYED_TOKEN_PREFIX}{token}")
    }

    /// Writes the revocation record keyed by the raw token string.
    ///
    /// Without a store this is a no-op.
    pub async fn destroy(&self, token: &str, subject: &str) -> Result<(), StoreError> {
        let Some(store) = self.store.as_ref() else {
            debug!(subject = %subject, "no shared store configured, revocation skipped");
            return Ok(());
        };
        let marker = format!("{subject}-deleted");
        store
            .set(&Self::record_key(token), &marker, REVOCATION_TTL)
            .await
    }

    /// Existence check on the revocation record.
    pub async fn is_destroyed(&self, token: &str) -> Result<bool, StoreError> {
        match self.store.as_ref() {
            Some(store) => store.exists(&Self::record_key(token)).await,
            None => Ok(false),
        }
    }
}
