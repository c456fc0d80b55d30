//! 认证实例配置

use std::sync::Arc;

use super::signing::{FamilyKeyResolver, SharedKeyResolver, SigningKey, SigningMethod};

/// 默认签名密钥，生产环境必须覆盖
pub const DEFAULT_SIGNING_KEY: &str = "flare-auth";

/// 默认令牌有效期：2 年（令牌面向 CLI/机器凭证，而非短期 Web 会话）
pub const DEFAULT_EXPIRED_SECONDS: u64 = 3600 * 24 * 365 * 2;

/// 默认令牌类型
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// 认证实例配置
///
/// 在创建 `TokenService` 时确定，之后不可变。
#[derive(Clone)]
pub struct AuthConfig {
    /// 签名算法（默认 HS512）
    pub signing_method: SigningMethod,
    /// 签名密钥
    pub signing_key: SigningKey,
    /// 校验时根据未验证的 header 解析校验密钥，必须检查算法族
    pub key_resolver: SharedKeyResolver,
    /// 令牌有效期，单位秒（默认 63072000）
    pub expired_seconds: u64,
    /// 返回给客户端的令牌类型（默认 "Bearer"）
    pub token_type: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_method: SigningMethod::default(),
            signing_key: SigningKey::secret(DEFAULT_SIGNING_KEY),
            key_resolver: Arc::new(FamilyKeyResolver::hmac(DEFAULT_SIGNING_KEY)),
            expired_seconds: DEFAULT_EXPIRED_SECONDS,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }
}

impl AuthConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置签名算法
    pub fn with_signing_method(mut self, method: SigningMethod) -> Self {
        self.signing_method = method;
        self
    }

    /// 设置签名密钥
    pub fn with_signing_key(mut self, key: SigningKey) -> Self {
        self.signing_key = key;
        self
    }

    /// 设置校验密钥解析器
    pub fn with_key_resolver(mut self, resolver: SharedKeyResolver) -> Self {
        self.key_resolver = resolver;
        self
    }

    /// 使用同一个 HMAC 密钥签名和校验
    pub fn with_hmac_secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        self.signing_key = SigningKey::secret(secret);
        self.key_resolver = Arc::new(FamilyKeyResolver::hmac(secret));
        self
    }

    /// 设置令牌有效期（秒）
    pub fn with_expired_seconds(mut self, seconds: u64) -> Self {
        self.expired_seconds = seconds;
        self
    }

    /// 设置令牌类型
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_method", &self.signing_method)
            .field("signing_key", &self.signing_key)
            .field("resolver_family", &self.key_resolver.family())
            .field("expired_seconds", &self.expired_seconds)
            .field("token_type", &self.token_type)
            .finish()
    }
}
