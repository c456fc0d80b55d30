//! User liveness cache.
//!
//! Lookup is staged: process-local tier, then the shared store, then the
//! authoritative source. Negative answers are always re-verified:
//!
//! | candidate | source configured | result |
//! |-----------|-------------------|--------|
//! | `true`    | any               | `true`, no callback |
//! | `false` / miss | yes          | callback answer (cached in both tiers) |
//! | `false` / miss | callback error | `false`, nothing cached |
//! | `false` / miss | no           | `false` |
//!
//! A cached `false` is therefore treated the same as "unknown".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::store::{SharedStore, encode_bool, parse_bool};
use crate::cache::CacheNamespace;

/// Namespace of status entries in the local cache.
pub const LOCAL_STATUS_NAMESPACE: &str = "jwt_user_status";

/// Key prefix of status records in the shared store.
pub const USER_STATUS_PREFIX: &str = "user-status:";

/// Local tier retention.
pub const LOCAL_STATUS_TTL: Duration = Duration::from_secs(5 * 60);

/// Shared tier retention: 180 days.
pub const SHARED_STATUS_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 180);

/// Authoritative answer to "is this user active".
#[async_trait]
pub trait UserStatusSource: Send + Sync {
    async fn check_status(&self, user_uid: &str, real_name: &str) -> anyhow::Result<bool>;
}

#[async_trait]
impl<F> UserStatusSource for F
where
    F: Fn(&str, &str) -> anyhow::Result<bool> + Send + Sync,
{
    async fn check_status(&self, user_uid: &str, real_name: &str) -> anyhow::Result<bool> {
        self(user_uid, real_name)
    }
}

/// Treats every user as active, for offline verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

#[async_trait]
impl UserStatusSource for AlwaysActive {
    async fn check_status(&self, _user_uid: &str, _real_name: &str) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Two-tier cache in front of the authoritative status source.
#[derive(Clone)]
pub struct UserStatusCache {
    local: CacheNamespace,
    store: Option<Arc<dyn SharedStore>>,
    source: Option<Arc<dyn UserStatusSource>>,
}

impl UserStatusCache {
    pub fn new(local: CacheNamespace) -> Self {
        Self {
            local,
            store: None,
            source: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn UserStatusSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn shared_key(user_uid: &str) -> String {
        format!("{USER_STATUS_PREFIX}{user_uid}")
    }

    /// Whether `user_uid` may authenticate. Never fails: every error counts as
    /// inactive.
    pub async fn is_active(&self, user_uid: &str, real_name: &str) -> bool {
        let candidate = match self.local_status(user_uid) {
            Some(active) => active,
            None => self.shared_status(user_uid).await.unwrap_or(false),
        };
        if candidate {
            return true;
        }

        let Some(source) = self.source.as_ref() else {
            return false;
        };
        match source.check_status(user_uid, real_name).await {
            Ok(active) => {
                debug!(user_uid = %user_uid, active, "user status refreshed from source");
                self.update_user_status(user_uid, real_name, active).await;
                active
            }
            Err(err) => {
                warn!(user_uid = %user_uid, error = %err, "user status check failed");
                false
            }
        }
    }

    /// Writes `active` to the local tier (under both the uid and the real name)
    /// and, best effort, to the shared tier.
    ///
    /// Uids and real names share one local key space. When a real name equals
    /// another user's uid, a `true` written here is read as that user's status
    /// for `LOCAL_STATUS_TTL` without consulting the source.
    pub async fn update_user_status(&self, user_uid: &str, real_name: &str, active: bool) {
        self.local.set(user_uid, active, LOCAL_STATUS_TTL);
        if !real_name.is_empty() {
            self.local.set(real_name, active, LOCAL_STATUS_TTL);
        }

        if let Some(store) = self.store.as_ref() {
            let key = Self::shared_key(user_uid);
            if let Err(err) = store.set(&key, encode_bool(active), SHARED_STATUS_TTL).await {
                warn!(user_uid = %user_uid, error = %err, "failed to write user status to store");
            }
        }
    }

    fn local_status(&self, user_uid: &str) -> Option<bool> {
        match self.local.get(user_uid) {
            Some(Value::Bool(active)) => Some(active),
            _ => None,
        }
    }

    async fn shared_status(&self, user_uid: &str) -> Option<bool> {
        let store = self.store.as_ref()?;
        let raw = match store.get(&Self::shared_key(user_uid)).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(user_uid = %user_uid, error = %err, "failed to read user status from store");
                return None;
            }
        };
        let active = parse_bool(&raw)?;

        // promote into the local tier without blocking on the map
        if let Err(err) = self
            .local
            .enqueue_insert(user_uid, active, LOCAL_STATUS_TTL)
            .await
        {
            debug!(user_uid = %user_uid, error = %err, "status promotion skipped");
        }
        Some(active)
    }
}
