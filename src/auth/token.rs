use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Header, Validation, decode, decode_header, encode};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{TokenClaims, TokenInfo, UserInfo};
use super::config::AuthConfig;
use super::revocation::RevocationChecker;
use super::status::{LOCAL_STATUS_NAMESPACE, UserStatusCache, UserStatusSource};
use super::store::SharedStore;
use crate::cache::CacheService;
use crate::error::{AuthError, Result};

/// Issues and verifies long-lived signed identity tokens.
///
/// Verification of a request token goes through three gates: signature and
/// temporal claims, the shared revocation records, and the user status cache.
pub struct TokenService {
    config: AuthConfig,
    store: Option<Arc<dyn SharedStore>>,
    revocation: RevocationChecker,
    status: UserStatusCache,
}

impl TokenService {
    /// Creates a token service without shared store and without status source.
    ///
    /// Status lookups use the `jwt_user_status` namespace of `cache`.
    pub fn new(config: AuthConfig, cache: &CacheService) -> Self {
        Self {
            config,
            store: None,
            revocation: RevocationChecker::new(None),
            status: UserStatusCache::new(cache.namespace(LOCAL_STATUS_NAMESPACE)),
        }
    }

    /// Attach the shared store (e.g. Redis) used for revocation and status
    pub fn with_store(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.revocation = RevocationChecker::new(Some(store.clone()));
        self.status = self.status.with_store(store.clone());
        self.store = Some(store);
        self
    }

    /// Attach the authoritative user status source
    pub fn with_status_source(mut self, source: Arc<dyn UserStatusSource>) -> Self {
        self.status = self.status.with_source(source);
        self
    }

    /// Issues a token for the given user
    pub fn generate_token(
        &self,
        user_uid: &str,
        real_name: &str,
        phone: &str,
        email: &str,
    ) -> Result<TokenInfo> {
        if user_uid.is_empty() {
            return Err(AuthError::signing("user uid must not be empty"));
        }

        let now = current_epoch_seconds()?;
        let exp = now.saturating_add(self.config.expired_seconds);

        let claims = TokenClaims {
            user_uid: user_uid.to_string(),
            real_name: real_name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            sub: user_uid.to_string(),
            iat: now,
            nbf: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let key = self
            .config
            .signing_key
            .encoding_key(self.config.signing_method)?;
        let header = Header::new(self.config.signing_method.algorithm());
        let access_token = encode(&header, &claims, &key)
            .map_err(|err| AuthError::signing(format!("failed to encode token: {err}")))?;

        Ok(TokenInfo {
            access_token,
            token_type: self.config.token_type.clone(),
            expires_at: exp as i64,
        })
    }

    /// Verifies signature and temporal claims
    pub(crate) fn parse_token(&self, token: &str) -> Result<TokenClaims> {
        let header = decode_header(token).map_err(|err| {
            debug!(error = %err, "malformed token header");
            AuthError::InvalidToken
        })?;

        // the resolver checks the family before handing out key material
        let key = self.config.key_resolver.resolve(&header)?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = self.config.key_resolver.family().algorithms();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        let claims = decode::<TokenClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!(error = %err, "token verification failed");
                AuthError::InvalidToken
            })?;

        if claims.user_uid.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Revokes the token in the shared store (no-op without a store).
    ///
    /// The token must still verify; a malformed token cannot be destroyed.
    pub async fn destroy_token(&self, token: &str) -> Result<()> {
        let claims = self.parse_token(token)?;
        self.revocation.destroy(token, &claims.sub).await?;
        debug!(user_uid = %claims.user_uid, "token destroyed");
        Ok(())
    }

    /// Verifies the token and returns the identity it carries.
    ///
    /// `skip_revocation_check` bypasses the shared revocation lookup (offline
    /// clients); the user status gate always applies.
    pub async fn parse_user_info(
        &self,
        token: &str,
        skip_revocation_check: bool,
    ) -> Result<UserInfo> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let claims = self.parse_token(token)?;

        if !skip_revocation_check && self.revocation.is_destroyed(token).await? {
            debug!(user_uid = %claims.user_uid, "token has been destroyed");
            return Err(AuthError::DestroyedToken);
        }

        if !self
            .status
            .is_active(&claims.user_uid, &claims.real_name)
            .await
        {
            debug!(user_uid = %claims.user_uid, "user is not active");
            return Err(AuthError::UserForbidden);
        }

        Ok(claims.into())
    }

    /// Issues a fresh token for the same identity and destroys the old one
    pub async fn refresh_token(&self, token: &str) -> Result<TokenInfo> {
        let user = self.parse_user_info(token, false).await?;
        let fresh = self.generate_token(&user.user_uid, &user.real_name, &user.phone, &user.email)?;

        if let Err(err) = self.destroy_token(token).await {
            warn!(user_uid = %user.user_uid, error = %err, "failed to destroy refreshed token");
            return Err(err);
        }

        Ok(fresh)
    }

    /// Records the authoritative status of a user in both cache tiers
    pub async fn update_user_status(&self, user_uid: &str, real_name: &str, active: bool) {
        self.status
            .update_user_status(user_uid, real_name, active)
            .await;
    }

    /// Releases the shared store connection
    pub async fn release(&self) -> Result<()> {
        if let Some(store) = self.store.as_ref() {
            store.close().await?;
        }
        Ok(())
    }

    /// Returns the token lifetime
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.expired_seconds)
    }

    pub fn token_type(&self) -> &str {
        &self.config.token_type
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn status_cache(&self) -> &UserStatusCache {
        &self.status
    }

    pub fn revocation(&self) -> &RevocationChecker {
        &self.revocation
    }
}

fn current_epoch_seconds() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|err| AuthError::signing(format!("system time error: {err}")))
}
