use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::auth::config::{DEFAULT_EXPIRED_SECONDS, DEFAULT_SIGNING_KEY, DEFAULT_TOKEN_TYPE};
use crate::auth::signing::{AlgorithmFamily, FamilyKeyResolver, SigningKey, SigningMethod};
use crate::auth::store::redis::DEFAULT_COMMAND_TIMEOUT;
use crate::auth::{AuthConfig, MemoryStore, RedisStore, SharedStore};
use crate::cache::{CacheConfig, DEFAULT_QUEUE_CAPACITY};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub jwt_auth: JwtAuthSettings,
    #[serde(default)]
    pub redis: Option<RedisSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtAuthSettings {
    /// 关闭后不签发/校验令牌：`to_auth_config` 报错，`build_store` 不创建存储
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_signing_method")]
    pub signing_method: String,
    /// HMAC secret (HS*)
    #[serde(default = "default_signing_key")]
    pub signing_key: String,
    /// PEM private key for asymmetric methods
    pub signing_key_file: Option<String>,
    /// PEM public key for asymmetric methods
    pub verify_key_file: Option<String>,
    #[serde(default = "default_expired")]
    pub expired: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default)]
    pub redis_prefix: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Redis,
    Memory,
    #[default]
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisSettings {
    pub url: String,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_true() -> bool {
    true
}

fn default_signing_method() -> String {
    "HS512".to_string()
}

fn default_signing_key() -> String {
    DEFAULT_SIGNING_KEY.to_string()
}

fn default_expired() -> u64 {
    DEFAULT_EXPIRED_SECONDS
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

fn default_command_timeout_ms() -> u64 {
    DEFAULT_COMMAND_TIMEOUT.as_millis() as u64
}

fn default_cache_ttl_secs() -> u64 {
    CacheConfig::default().default_ttl.as_secs()
}

fn default_sweep_interval_secs() -> u64 {
    CacheConfig::default().sweep_interval.as_secs()
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for JwtAuthSettings {
    fn default() -> Self {
        Self {
            enable: true,
            signing_method: default_signing_method(),
            signing_key: default_signing_key(),
            signing_key_file: None,
            verify_key_file: None,
            expired: default_expired(),
            token_type: default_token_type(),
            store: StoreKind::default(),
            redis_prefix: String::new(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {path}"))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse settings")
    }

    /// Builds the shared store selected by `jwt_auth.store`
    pub async fn build_store(&self) -> Result<Option<Arc<dyn SharedStore>>> {
        if !self.jwt_auth.enable {
            return Ok(None);
        }
        match self.jwt_auth.store {
            StoreKind::None => Ok(None),
            StoreKind::Memory => {
                let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
                Ok(Some(store))
            }
            StoreKind::Redis => {
                let redis = self
                    .redis
                    .as_ref()
                    .ok_or_else(|| anyhow!("jwt_auth.store = \"redis\" requires a [redis] section"))?;
                let store: Arc<dyn SharedStore> = Arc::new(
                    RedisStore::connect(&redis.url)
                        .await?
                        .with_namespace(self.jwt_auth.redis_prefix.clone())
                        .with_command_timeout(Duration::from_millis(redis.command_timeout_ms)),
                );
                Ok(Some(store))
            }
        }
    }
}

impl JwtAuthSettings {
    pub fn to_auth_config(&self) -> Result<AuthConfig> {
        if !self.enable {
            bail!("jwt_auth is disabled");
        }
        let method: SigningMethod = self.signing_method.parse()?;
        let config = AuthConfig::default()
            .with_signing_method(method)
            .with_expired_seconds(self.expired)
            .with_token_type(self.token_type.clone());

        if method.family() == AlgorithmFamily::Hmac {
            if self.signing_key.is_empty() {
                bail!("jwt_auth.signing_key must not be empty");
            }
            return Ok(config.with_hmac_secret(self.signing_key.as_bytes()));
        }

        let (Some(signing_file), Some(verify_file)) =
            (self.signing_key_file.as_deref(), self.verify_key_file.as_deref())
        else {
            bail!("{method} requires jwt_auth.signing_key_file and jwt_auth.verify_key_file");
        };
        let private_pem = std::fs::read(signing_file)
            .with_context(|| format!("failed to read signing key {signing_file}"))?;
        let public_pem = std::fs::read(verify_file)
            .with_context(|| format!("failed to read verify key {verify_file}"))?;

        let (signing_key, resolver) = match method.family() {
            AlgorithmFamily::Rsa => (
                SigningKey::RsaPem(private_pem),
                FamilyKeyResolver::rsa_pem(&public_pem)?,
            ),
            AlgorithmFamily::Ecdsa => (
                SigningKey::EcPem(private_pem),
                FamilyKeyResolver::ec_pem(&public_pem)?,
            ),
            AlgorithmFamily::Ed => (
                SigningKey::EdPem(private_pem),
                FamilyKeyResolver::ed_pem(&public_pem)?,
            ),
            AlgorithmFamily::Hmac => bail!("{method} uses jwt_auth.signing_key"),
        };

        Ok(config
            .with_signing_key(signing_key)
            .with_key_resolver(Arc::new(resolver)))
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_default_ttl(Duration::from_secs(self.default_ttl_secs))
            .with_sweep_interval(Duration::from_secs(self.sweep_interval_secs))
            .with_queue_capacity(self.queue_capacity)
    }
}
