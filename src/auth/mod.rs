pub mod claims;
pub mod config;
pub mod revocation;
pub mod signing;
pub mod status;
pub mod store;
pub mod token;

pub use claims::{TokenClaims, TokenInfo, UserInfo};
pub use config::AuthConfig;
pub use revocation::RevocationChecker;
pub use signing::{AlgorithmFamily, FamilyKeyResolver, KeyResolver, SigningKey, SigningMethod};
pub use status::{AlwaysActive, UserStatusCache, UserStatusSource};
pub use store::{MemoryStore, RedisStore, SharedStore};
pub use token::TokenService;

/// 从 Authorization 头中提取令牌（去掉可选的 Bearer 方案名，大小写不敏感）
///
/// 只有方案名、没有令牌时返回 `None`。
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let value = header_value.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}
