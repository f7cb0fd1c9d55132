//! JWT (JSON Web Token) handling
//!
//! Two token families are issued, each signed with its own HMAC secret:
//! short-lived access tokens carrying the user's id, email and role, and longer-lived
//! refresh tokens carrying only the user id. Every token also names its family in a `typ`
//! claim, so one family is refused where the other is expected even if both secrets were
//! configured to the same value.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which family a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// `now + validity`, or an error when the result leaves the representable range
fn expires_at(now: DateTime<Utc>, validity: Duration) -> Result<i64, JwtError> {
    now.checked_add_signed(validity)
        .map(|at| at.timestamp())
        .ok_or(JwtError::LifetimeOutOfRange)
}

/// Claims that expose an expiration timestamp
pub trait Expiring {
    fn exp(&self) -> i64;

    fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp()
    }
}

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// User email at issue time
    pub email: String,
    /// System role at issue time (`MEMBER` or `ADMIN`)
    pub role: String,
    /// Always [`TokenKind::Access`]
    pub typ: TokenKind,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(
        user_id: Uuid,
        email: String,
        role: String,
        validity: Duration,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();

        Ok(Self {
            sub: user_id,
            email,
            role,
            typ: TokenKind::Access,
            iat: now.timestamp(),
            exp: expires_at(now, validity)?,
        })
    }
}

impl Expiring for AccessClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

/// Claims embedded in a refresh token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Always [`TokenKind::Refresh`]
    pub typ: TokenKind,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, validity: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();

        Ok(Self {
            sub: user_id,
            typ: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: expires_at(now, validity)?,
        })
    }
}

impl Expiring for RefreshClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token lifetime is out of range")]
    LifetimeOutOfRange,

    #[error("Access and refresh tokens must use different secrets")]
    SharedSecret,
}

/// JWT validator for one HMAC-SHA256 secret
///
/// Validates ONLY:
/// - Signature verification (using the secret)
/// - Token expiration (no leeway)
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn validate<C>(&self, token: &str) -> Result<C, JwtError>
    where
        C: DeserializeOwned + Expiring,
    {
        let token_data =
            decode::<C>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    _ => JwtError::InvalidToken,
                }
            })?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Encode JWT using HMAC-SHA256 (symmetric secret)
    pub fn encode<C: Serialize>(secret: &[u8], claims: &C) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

/// Secrets and lifetimes for both token families
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl: Duration,
    pub refresh_secret: String,
    pub refresh_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: "secret".to_string(),
            access_ttl: Duration::hours(24),
            refresh_secret: "refresh-secret".to_string(),
            refresh_ttl: Duration::days(7),
        }
    }
}

impl TokenConfig {
    /// Reject configurations that would only fail once tokens are issued
    pub fn validate(&self) -> Result<(), JwtError> {
        if self.access_secret == self.refresh_secret {
            return Err(JwtError::SharedSecret);
        }
        let now = Utc::now();
        expires_at(now, self.access_ttl)?;
        expires_at(now, self.refresh_ttl)?;
        Ok(())
    }
}

/// Issues and verifies access and refresh tokens
pub struct TokenIssuer {
    config: TokenConfig,
    access: JwtValidator,
    refresh: JwtValidator,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        let access = JwtValidator::new(config.access_secret.as_bytes());
        let refresh = JwtValidator::new(config.refresh_secret.as_bytes());

        Self {
            config,
            access,
            refresh,
        }
    }

    pub fn issue_access(&self, user_id: Uuid, email: &str, role: &str) -> Result<String, JwtError> {
        let claims = AccessClaims::new(
            user_id,
            email.to_string(),
            role.to_string(),
            self.config.access_ttl,
        )?;
        JwtValidator::encode(self.config.access_secret.as_bytes(), &claims)
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, JwtError> {
        let claims = RefreshClaims::new(user_id, self.config.refresh_ttl)?;
        JwtValidator::encode(self.config.refresh_secret.as_bytes(), &claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let claims: AccessClaims = self.access.validate(token)?;
        if claims.typ != TokenKind::Access {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        let claims: RefreshClaims = self.refresh.validate(token)?;
        if claims.typ != TokenKind::Refresh {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TokenConfig {
            access_secret: "access-test".to_string(),
            access_ttl: Duration::hours(1),
            refresh_secret: "refresh-test".to_string(),
            refresh_ttl: Duration::days(7),
        })
    }

    #[test]
    fn test_jwt_encode_decode() {
        let user_id = Uuid::new_v4();
        let claims = AccessClaims::new(
            user_id,
            "alice@x.com".to_string(),
            "MEMBER".to_string(),
            Duration::hours(1),
        )
        .unwrap();

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let decoded: AccessClaims = JwtValidator::new(TEST_SECRET).validate(&token).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_expired_token() {
        let claims = RefreshClaims::new(Uuid::new_v4(), Duration::seconds(-10)).unwrap();
        assert!(claims.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let result: Result<RefreshClaims, _> = JwtValidator::new(TEST_SECRET).validate(&token);

        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = RefreshClaims::new(Uuid::new_v4(), Duration::hours(1)).unwrap();
        let token = JwtValidator::encode(b"other-secret", &claims).unwrap();

        let result: Result<RefreshClaims, _> = JwtValidator::new(TEST_SECRET).validate(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_issuer_round_trip() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();

        let access = issuer.issue_access(user_id, "bob@x.com", "ADMIN").unwrap();
        let claims = issuer.verify_access(&access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "bob@x.com");
        assert_eq!(claims.role, "ADMIN");
        assert_eq!(claims.exp - claims.iat, Duration::hours(1).num_seconds());

        let refresh = issuer.issue_refresh(user_id).unwrap();
        let claims = issuer.verify_refresh(&refresh).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn test_token_families_do_not_cross_validate() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();

        let access = issuer.issue_access(user_id, "bob@x.com", "MEMBER").unwrap();
        let refresh = issuer.issue_refresh(user_id).unwrap();

        assert!(issuer.verify_refresh(&access).is_err());
        assert!(issuer.verify_access(&refresh).is_err());
    }

    #[test]
    fn test_refresh_token_carries_only_user_id() {
        let issuer = issuer();
        let refresh = issuer.issue_refresh(Uuid::new_v4()).unwrap();

        let decoded = jsonwebtoken::decode::<serde_json::Value>(
            &refresh,
            &DecodingKey::from_secret(b"refresh-test"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        let object = decoded.claims.as_object().unwrap();
        assert!(object.contains_key("sub"));
        assert_eq!(object["typ"], "refresh");
        assert!(!object.contains_key("email"));
        assert!(!object.contains_key("role"));
    }

    #[test]
    fn test_garbage_token() {
        let result = issuer().verify_access("not.a.jwt");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_shared_secret_still_separates_families() {
        let issuer = TokenIssuer::new(TokenConfig {
            access_secret: "same-secret".to_string(),
            access_ttl: Duration::hours(1),
            refresh_secret: "same-secret".to_string(),
            refresh_ttl: Duration::days(7),
        });
        let user_id = Uuid::new_v4();

        let access = issuer.issue_access(user_id, "bob@x.com", "MEMBER").unwrap();
        let refresh = issuer.issue_refresh(user_id).unwrap();

        assert!(matches!(
            issuer.verify_refresh(&access),
            Err(JwtError::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify_access(&refresh),
            Err(JwtError::InvalidToken)
        ));
        assert!(issuer.verify_access(&access).is_ok());
        assert!(issuer.verify_refresh(&refresh).is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(TokenConfig::default().validate().is_ok());

        let shared = TokenConfig {
            refresh_secret: "secret".to_string(),
            ..TokenConfig::default()
        };
        assert!(matches!(shared.validate(), Err(JwtError::SharedSecret)));

        let endless = TokenConfig {
            access_ttl: Duration::days(365 * 100_000_000),
            ..TokenConfig::default()
        };
        assert!(matches!(
            endless.validate(),
            Err(JwtError::LifetimeOutOfRange)
        ));
    }

    #[test]
    fn test_unrepresentable_lifetime_is_an_error() {
        let issuer = TokenIssuer::new(TokenConfig {
            refresh_ttl: Duration::days(365 * 100_000_000),
            ..TokenConfig::default()
        });

        assert!(matches!(
            issuer.issue_refresh(Uuid::new_v4()),
            Err(JwtError::LifetimeOutOfRange)
        ));
        assert!(issuer
            .issue_access(Uuid::new_v4(), "bob@x.com", "MEMBER")
            .is_ok());
    }
}
