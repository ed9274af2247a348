//! Identity tokens and credential hashing.
//!
//! - [`JwtManager`] issues and verifies HS256 access tokens.
//! - [`Credentials`] hashes and verifies passwords with argon2id.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shelf_core::{Role, UserId};

use crate::error::{ApiError, INTERNAL_MESSAGE};

const ACCESS_TOKEN: &str = "access";

// =============================================================================
// Tokens
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Role at issue time. Informational: the stored role is authoritative.
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type (always "access")
    pub token_type: String,
}

impl Claims {
    /// The user this token names, if `sub` is a valid id.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse::<i64>().ok().map(UserId::new)
    }
}

/// JWT token manager.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, access_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: UserId, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                ApiError::persistence(INTERNAL_MESSAGE, format!("Failed to generate token: {e}"))
            })
    }

    /// Validate and decode an access token (signature, expiry, type).
    pub fn validate_access_token(&self, token: &str) -> Option<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| tracing::debug!(error = %e, "Rejected token"))
            .ok()?
            .claims;

        (claims.token_type == ACCESS_TOKEN).then_some(claims)
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Credentials
// =============================================================================

/// Password hashing and verification.
///
/// Holds a hash of a throwaway password so that a login for an unknown
/// email costs the same as one for a known email.
pub struct Credentials {
    dummy_hash: String,
}

impl Credentials {
    pub fn new() -> Result<Self, ApiError> {
        Ok(Credentials {
            dummy_hash: Self::hash(&Uuid::new_v4().to_string())?,
        })
    }

    /// Hash a password into a salted argon2id PHC string.
    pub fn hash(password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                ApiError::persistence(INTERNAL_MESSAGE, format!("Failed to hash password: {e}"))
            })
    }

    /// Verify a password against a stored PHC string. Constant-time.
    pub fn verify(password: &str, phc: &str) -> bool {
        let parsed_hash = match PasswordHash::new(phc) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Verify against `phc` when present, else against the dummy hash.
    /// Returns false in the second case.
    pub fn verify_or_dummy(&self, password: &str, phc: Option<&str>) -> bool {
        match phc {
            Some(phc) => Self::verify(password, phc),
            None => {
                let _ = Self::verify(password, &self.dummy_hash);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager
            .generate_access_token(UserId::new(42), Role::Admin)
            .unwrap();
        let claims = manager.validate_access_token(&token).unwrap();

        assert_eq!(claims.user_id(), Some(UserId::new(42)));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.token_type, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tokens_are_unique() {
        let manager = JwtManager::new("test-secret", 3600);

        let a = manager.generate_access_token(UserId::new(1), Role::Ordinary).unwrap();
        let b = manager.generate_access_token(UserId::new(1), Role::Ordinary).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);

        let token = issuer.generate_access_token(UserId::new(1), Role::Ordinary).unwrap();
        assert!(verifier.validate_access_token(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Default validation leeway is 60s
        let manager = JwtManager::new("test-secret", -120);

        let token = manager.generate_access_token(UserId::new(1), Role::Ordinary).unwrap();
        assert!(manager.validate_access_token(&token).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let manager = JwtManager::new("test-secret", 3600);
        assert!(manager.validate_access_token("not-a-jwt").is_none());
        assert!(manager.validate_access_token("7").is_none());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("7"), None);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = Credentials::hash("s3cret").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(Credentials::verify("s3cret", &hash));
        assert!(!Credentials::verify("wrong", &hash));
        assert!(!Credentials::verify("s3cret", "not-a-phc-string"));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(
            Credentials::hash("same").unwrap(),
            Credentials::hash("same").unwrap()
        );
    }

    #[test]
    fn test_dummy_verification_never_succeeds() {
        let credentials = Credentials::new().unwrap();
        let hash = Credentials::hash("s3cret").unwrap();

        assert!(credentials.verify_or_dummy("s3cret", Some(&hash)));
        assert!(!credentials.verify_or_dummy("s3cret", None));
    }
}
