use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims carried by every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "user_id")]
    pub user_uid: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub sub: String,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    /// Random token id, keeps two tokens issued in the same second distinct
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jti: String,
}

impl TokenClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.iat as i64, 0).unwrap_or_else(Utc::now)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.nbf as i64, 0).unwrap_or_else(Utc::now)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// Token returned to the caller at issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub token_type: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl TokenInfo {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Serialises to `{"access_token", "token_type", "expires_at"}`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Identity fields extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_uid: String,
    pub real_name: String,
    pub phone: String,
    pub email: String,
}

impl From<TokenClaims> for UserInfo {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_uid: claims.user_uid,
            real_name: claims.real_name,
            phone: claims.phone,
            email: claims.email,
        }
    }
}
