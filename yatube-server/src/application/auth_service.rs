use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: uuid::Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let user = new_user(username, email, &password)?;
        self.repo.create(user).await
    }

    /// Makes sure a staff account named `username` exists. A missing account
    /// is created with the given credentials; an existing one keeps its
    /// password and is promoted.
    #[instrument(skip(self, password))]
    pub async fn ensure_staff(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        if let Some(existing) = self.repo.find_by_username(&username).await? {
            if !existing.is_staff {
                self.repo.set_staff(existing.id, true).await?;
                info!(username = %existing.username, "existing user promoted to staff");
            }
            return self.get_user(existing.id).await;
        }

        let mut user = new_user(username, email, &password)?;
        user.is_staff = true;
        let user = self.repo.create(user).await?;
        info!(username = %user.username, "staff user created");
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.keys
            .generate_token(user.id, &user.username)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }

    /// Returns a bearer token together with the user it was issued for.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }
}

/// Validates registration input and hashes the password.
fn new_user(username: String, email: String, password: &str) -> Result<User, DomainError> {
    validate_username(&username)?;
    if !email.contains('@') {
        return Err(DomainError::validation("email", "must be an email address"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(DomainError::validation(
            "email",
            format!("must be at most {MAX_EMAIL_LEN} characters"),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    let hash = hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))?;
    Ok(User::new(username, email.to_lowercase(), hash))
}

/// Letters, digits and `@ . + - _`, at most 150 characters.
fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::validation(
            "username",
            format!("must be 1 to {MAX_USERNAME_LEN} characters"),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}
