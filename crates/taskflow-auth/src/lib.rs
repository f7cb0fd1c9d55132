//! Credential primitives for TaskFlow: password hashing and signed session tokens

pub mod expiry;
pub mod jwt;
pub mod password;

pub use expiry::{parse_expiry, ExpiryParseError};
pub use jwt::{
    AccessClaims, Expiring, JwtError, JwtValidator, RefreshClaims, TokenConfig, TokenIssuer,
    TokenKind,
};
pub use password::{hash_password, verify_password, PasswordError, DEFAULT_HASH_ROUNDS};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
