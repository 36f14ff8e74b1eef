//! Authentication service.
//!
//! Provides username/password registration and login. A successful login
//! issues an opaque bearer token from the [`TokenStore`].

mod error;
mod tokens;

pub use error::AuthError;
pub use tokens::TokenStore;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{CurrentUser, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenStore) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either field is blank.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        validate_credentials(username, password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with username and password, returning a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(username, password).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(CurrentUser::from(&user)).await;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(token)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Reject blank usernames and passwords.
fn validate_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("merino-2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("merino-2024", &hash).is_ok());
        assert!(matches!(
            verify_password("merino-2025", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("weaver", "secret").is_ok());
        assert!(matches!(
            validate_credentials("  ", "secret"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            validate_credentials("weaver", ""),
            Err(AuthError::MissingCredentials)
        ));
    }
}
