//! Argon2 password hashes and HS256 JWTs.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::Credentials;
use crate::domain::records::{AuthClaims, TokenPair, User};

const ACCESS_TOKEN_HOURS: i64 = 24;
const REFRESH_TOKEN_HOURS: i64 = 168;
const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    first_name: String,
    last_name: String,
    token_type: String,
    exp: i64,
    iat: i64,
}

pub struct JwtCredentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtCredentials {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn sign(&self, user: &User, token_type: &str, hours: i64) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            token_type: token_type.to_string(),
            exp: (now + Duration::hours(hours)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::Internal(format!("token signing failed: {}", e)))
    }
}

impl Credentials for JwtCredentials {
    fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| DomainError::Internal(format!("password hashing failed: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| DomainError::Internal(format!("stored password hash unreadable: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            token: self.sign(user, ACCESS, ACCESS_TOKEN_HOURS)?,
            refresh_token: self.sign(user, REFRESH, REFRESH_TOKEN_HOURS)?,
        })
    }

    fn verify_token(&self, token: &str) -> Result<AuthClaims, DomainError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::Unauthorized("Token expired".to_string()),
                _ => DomainError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.token_type != ACCESS {
            return Err(DomainError::Unauthorized("Invalid token".to_string()));
        }
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| DomainError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthClaims {
            user_id,
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
        })
    }
}
