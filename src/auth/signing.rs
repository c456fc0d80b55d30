//! Signing algorithms, key material and verification-key resolution.
//!
//! The key resolver sees the *unverified* token header and must check the
//! algorithm family before handing out key material. Returning an HMAC secret
//! for a token that claims an asymmetric algorithm (or the other way round)
//! reopens the classic algorithm-confusion signature bypass.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};

use crate::error::AuthError;

/// Algorithm families a verification key can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    Hmac,
    Rsa,
    Ecdsa,
    Ed,
}

impl AlgorithmFamily {
    /// Returns the family of a jsonwebtoken algorithm.
    pub fn of(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => AlgorithmFamily::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => AlgorithmFamily::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => AlgorithmFamily::Ecdsa,
            Algorithm::EdDSA => AlgorithmFamily::Ed,
        }
    }

    /// All algorithms accepted when verifying against this family.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        match self {
            AlgorithmFamily::Hmac => vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            AlgorithmFamily::Rsa => vec![
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            AlgorithmFamily::Ecdsa => vec![Algorithm::ES256, Algorithm::ES384],
            AlgorithmFamily::Ed => vec![Algorithm::EdDSA],
        }
    }
}

/// Token signing method (defaults to HS512).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningMethod(Algorithm);

impl SigningMethod {
    pub const HS256: SigningMethod = SigningMethod(Algorithm::HS256);
    pub const HS384: SigningMethod = SigningMethod(Algorithm::HS384);
    pub const HS512: SigningMethod = SigningMethod(Algorithm::HS512);
    pub const RS256: SigningMethod = SigningMethod(Algorithm::RS256);
    pub const RS384: SigningMethod = SigningMethod(Algorithm::RS384);
    pub const RS512: SigningMethod = SigningMethod(Algorithm::RS512);
    pub const PS256: SigningMethod = SigningMethod(Algorithm::PS256);
    pub const PS384: SigningMethod = SigningMethod(Algorithm::PS384);
    pub const PS512: SigningMethod = SigningMethod(Algorithm::PS512);
    pub const ES256: SigningMethod = SigningMethod(Algorithm::ES256);
    pub const ES384: SigningMethod = SigningMethod(Algorithm::ES384);
    pub const EDDSA: SigningMethod = SigningMethod(Algorithm::EdDSA);

    pub fn algorithm(&self) -> Algorithm {
        self.0
    }

    pub fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::of(self.0)
    }
}

impl Default for SigningMethod {
    fn default() -> Self {
        SigningMethod::HS512
    }
}

impl From<Algorithm> for SigningMethod {
    fn from(algorithm: Algorithm) -> Self {
        SigningMethod(algorithm)
    }
}

impl FromStr for SigningMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::from_str(&s.trim().to_ascii_uppercase())
            .or_else(|_| Algorithm::from_str(s.trim()))
            .map(SigningMethod)
            .map_err(|_| AuthError::signing(format!("unsupported signing method: {s}")))
    }
}

impl fmt::Display for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Secret material used to sign tokens.
#[derive(Clone)]
pub enum SigningKey {
    /// Raw HMAC secret.
    Secret(Vec<u8>),
    /// PEM encoded RSA private key (RS*/PS*).
    RsaPem(Vec<u8>),
    /// PEM encoded EC private key (ES*).
    EcPem(Vec<u8>),
    /// PEM encoded Ed25519 private key.
    EdPem(Vec<u8>),
}

impl SigningKey {
    pub fn secret(secret: impl AsRef<[u8]>) -> Self {
        SigningKey::Secret(secret.as_ref().to_vec())
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            SigningKey::Secret(_) => AlgorithmFamily::Hmac,
            SigningKey::RsaPem(_) => AlgorithmFamily::Rsa,
            SigningKey::EcPem(_) => AlgorithmFamily::Ecdsa,
            SigningKey::EdPem(_) => AlgorithmFamily::Ed,
        }
    }

    /// Builds the encoding key for `method`, failing when the key type does
    /// not match the algorithm family.
    pub fn encoding_key(&self, method: SigningMethod) -> Result<EncodingKey, AuthError> {
        if self.family() != method.family() {
            return Err(AuthError::signing(format!(
                "signing key of family {:?} cannot sign {method}",
                self.family()
            )));
        }
        let key = match self {
            SigningKey::Secret(secret) => Ok(EncodingKey::from_secret(secret)),
            SigningKey::RsaPem(pem) => EncodingKey::from_rsa_pem(pem),
            SigningKey::EcPem(pem) => EncodingKey::from_ec_pem(pem),
            SigningKey::EdPem(pem) => EncodingKey::from_ed_pem(pem),
        };
        key.map_err(|err| AuthError::signing(format!("invalid signing key: {err}")))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // key material stays out of logs
        write!(f, "SigningKey::{:?}(..)", self.family())
    }
}

/// Maps a parsed-but-unverified token header to the key to verify it with.
pub trait KeyResolver: Send + Sync {
    /// Family every accepted token must belong to.
    fn family(&self) -> AlgorithmFamily;

    /// Returns the verification key, or `AuthError::InvalidToken` when the
    /// header's algorithm is outside the expected family.
    fn resolve(&self, header: &Header) -> Result<DecodingKey, AuthError>;
}

/// Resolver holding one verification key for one algorithm family.
#[derive(Clone)]
pub struct FamilyKeyResolver {
    family: AlgorithmFamily,
    key: DecodingKey,
}

impl FamilyKeyResolver {
    /// HMAC resolver over a shared secret.
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Self {
            family: AlgorithmFamily::Hmac,
            key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// RSA resolver over a PEM encoded public key.
    pub fn rsa_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|err| AuthError::signing(format!("invalid rsa public key: {err}")))?;
        Ok(Self {
            family: AlgorithmFamily::Rsa,
            key,
        })
    }

    /// ECDSA resolver over a PEM encoded public key.
    pub fn ec_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_ec_pem(pem)
            .map_err(|err| AuthError::signing(format!("invalid ec public key: {err}")))?;
        Ok(Self {
            family: AlgorithmFamily::Ecdsa,
            key,
        })
    }

    /// Ed25519 resolver over a PEM encoded public key.
    pub fn ed_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_ed_pem(pem)
            .map_err(|err| AuthError::signing(format!("invalid ed25519 public key: {err}")))?;
        Ok(Self {
            family: AlgorithmFamily::Ed,
            key,
        })
    }
}

impl KeyResolver for FamilyKeyResolver {
    fn family(&self) -> AlgorithmFamily {
        self.family
    }

    fn resolve(&self, header: &Header) -> Result<DecodingKey, AuthError> {
        if AlgorithmFamily::of(header.alg) != self.family {
            return Err(AuthError::InvalidToken);
        }
        Ok(self.key.clone())
    }
}

/// Shared handle to a key resolver.
pub type SharedKeyResolver = Arc<dyn KeyResolver>;
