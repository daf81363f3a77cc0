use std::str::FromStr;
use std::sync::Arc;

use bson::{doc, Bson, Document};
use chrono::Utc;
use mongodb::{Collection, Database};
use tracing::instrument;

use crate::auth::AuthService;
use crate::errors::ServiceError;
use crate::models::user::{self, Role, UserProfile};
use crate::normalize;

/// Service for user lookup and credential verification
#[derive(Clone)]
pub struct UserService {
    collection: Collection<Document>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db: &Database, auth: Arc<AuthService>) -> Self {
        Self {
            collection: db.collection(user::COLLECTION),
            auth,
        }
    }

    /// Verifies credentials and issues a bearer token. Unknown email and
    /// wrong password take the same exit so callers cannot enumerate users.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, UserProfile), ServiceError> {
        let user_doc = self
            .collection
            .find_one(doc! { "email": email })
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::InvalidCredentials)?;

        let stored_hash = user_doc
            .get("passwordHash")
            .and_then(Bson::as_str)
            .unwrap_or_default();
        if !self.auth.verify_password(password, stored_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let mut profile = normalize::user_profile(&user_doc);
        let role = Role::from_str(&profile.role).map_err(|_| {
            ServiceError::InternalError(format!("user {} has an unknown role", profile.id))
        })?;
        profile.role = role.as_str().to_string();

        let token = self.auth.issue_token(&profile.id, &profile.email, role)?;
        Ok((token, profile))
    }

    /// Creates a user with a hashed password. Used by the seeder; there is
    /// no self-registration surface.
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserProfile, ServiceError> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let document = doc! {
            "name": name,
            "email": email,
            "passwordHash": self.auth.hash_password(password)?,
            "role": role.as_str(),
            "createdAt": now,
            "updatedAt": now,
        };

        let result = self
            .collection
            .insert_one(document.clone())
            .await
            .map_err(|e| ServiceError::insert_error(e, "email"))?;

        let mut stored = document;
        stored.insert("_id", result.inserted_id);
        Ok(normalize::user_profile(&stored))
    }
}
