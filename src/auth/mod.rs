//! Authentication and authorization.
//!
//! Token verification and password hashing are delegated to `jsonwebtoken`
//! and `argon2`; this module interprets their outcomes. A request's bearer
//! token resolves to an [`AuthSession`] holding an optional, typed
//! [`Principal`] — a missing or invalid token is an anonymous session, not
//! an error. Authorization only fails when an operation that requires a
//! principal (or a role) meets an anonymous or under-privileged session,
//! via the pure guards [`require_authenticated`] and [`require_role`].

use std::convert::Infallible;
use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::user::Role;
use crate::AppState;

/// Claim structure for bearer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User's email
    pub role: String,  // User's role
    pub iat: i64,      // Issued at time
    pub exp: i64,      // Expiration time
    pub iss: String,   // Issuer
    pub aud: String,   // Audience
}

/// Caller identity for the lifetime of one request. Derived from a verified
/// token; never written back to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// The outcome of resolving a request's bearer token: an authenticated
/// principal, or an anonymous session.
#[derive(Debug, Clone, Default)]
pub struct AuthSession(Option<Principal>);

impl AuthSession {
    pub fn authenticated(principal: Principal) -> Self {
        Self(Some(principal))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

/// Fails with Unauthorized when the session is anonymous.
pub fn require_authenticated(session: &AuthSession) -> Result<&Principal, ServiceError> {
    session
        .principal()
        .ok_or_else(|| ServiceError::Unauthorized("authentication required".to_string()))
}

/// Requires authentication first, then the given role.
pub fn require_role(session: &AuthSession, role: Role) -> Result<&Principal, ServiceError> {
    let principal = require_authenticated(session)?;
    if principal.role != role {
        return Err(ServiceError::Forbidden(format!("{} role required", role)));
    }
    Ok(principal)
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("token creation failed: {0}")]
    TokenCreation(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => {
                ServiceError::Unauthorized(err.to_string())
            }
            AuthError::TokenCreation(msg) | AuthError::Hash(msg) => {
                ServiceError::InternalError(msg)
            }
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_secs: u64,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            issuer: cfg.auth_issuer.clone(),
            audience: cfg.auth_audience.clone(),
            expiration_secs: cfg.jwt_expiration,
        }
    }
}

/// Issues and verifies bearer tokens, hashes and verifies passwords.
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Signs a token for a verified user.
    pub fn issue_token(&self, user_id: &str, email: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + ChronoDuration::seconds(self.config.expiration_secs as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verifies a token and extracts the caller principal. Any failure —
    /// bad signature, wrong issuer/audience, expiry, malformed claims —
    /// means the caller stays anonymous.
    pub fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        let role = Role::from_str(&claims.role).map_err(|_| AuthError::InvalidToken)?;

        Ok(Principal {
            id: claims.sub,
            email: claims.email,
            role,
        })
    }

    /// Hashes a password into a PHC string for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Verifies a password against a stored PHC string. An unparseable hash
    /// verifies as false rather than erroring.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match bearer_token(parts) {
            Some(token) => match state.auth_service().verify_token(token) {
                Ok(principal) => AuthSession::authenticated(principal),
                Err(err) => {
                    debug!(error = %err, "bearer token rejected, continuing anonymously");
                    AuthSession::anonymous()
                }
            },
            None => AuthSession::anonymous(),
        };
        Ok(session)
    }
}
