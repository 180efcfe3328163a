//! # User Repository
//!
//! CRUD operations for users. Passwords are hashed with bcrypt before they
//! reach the database; plaintext is never stored.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};

use super::generate_id;
use crate::error::RepositoryError;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
    UserRole, UserStatus,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Request data for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    /// Explicit identifier; generated as `user-<12 hex>` when absent
    pub user_id: Option<String>,
    pub username: String,
    pub email: String,
    /// Plaintext password, hashed before insert
    pub password: String,
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
    hash_cost: u32,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Use a different bcrypt cost (tests use the minimum).
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Create a new user
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<UserModel, RepositoryError> {
        validate_username(&request.username)?;
        validate_email(&request.email)?;
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RepositoryError::validation_error(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = bcrypt::hash(&request.password, self.hash_cost)?;
        let user_id = request.user_id.unwrap_or_else(|| generate_id("user"));

        let user = UserActiveModel {
            user_id: Set(user_id),
            username: Set(request.username.trim().to_string()),
            email: Set(request.email.trim().to_lowercase()),
            password_hash: Set(password_hash),
            full_name: Set(request.full_name),
            role: Set(request.role),
            status: Set(UserStatus::Active),
            last_login: Set(None),
            ..Default::default()
        };

        let result = user
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(user_id = %result.user_id, username = %result.username, "User created");
        Ok(result)
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find_by_id(user_id.to_string())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find()
            .filter(UserColumn::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    /// List all users ordered by username
    pub async fn list_users(&self) -> Result<Vec<UserModel>, RepositoryError> {
        let users = User::find()
            .order_by_asc(UserColumn::Username)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(users)
    }

    pub async fn update_role(
        &self,
        user_id: &str,
        role: UserRole,
    ) -> Result<UserModel, RepositoryError> {
        let mut user = self.require(user_id).await?.into_active_model();
        user.role = Set(role);

        user.update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<UserModel, RepositoryError> {
        let mut user = self.require(user_id).await?.into_active_model();
        user.status = Set(status);

        user.update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Stamp `last_login` with the current time
    pub async fn record_login(&self, user_id: &str) -> Result<UserModel, RepositoryError> {
        let mut user = self.require(user_id).await?.into_active_model();
        user.last_login = Set(Some(Utc::now().into()));

        user.update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a user; their projects and everything below them cascade.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), RepositoryError> {
        let user = self.require(user_id).await?;

        user.delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(user_id, "User deleted");
        Ok(())
    }

    async fn require(&self, user_id: &str) -> Result<UserModel, RepositoryError> {
        self.get_user_by_id(user_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("User {user_id} not found")))
    }
}

fn validate_username(username: &str) -> Result<(), RepositoryError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(RepositoryError::validation_error(
            "Username cannot be empty",
        ));
    }

    if username.len() > 100 {
        return Err(RepositoryError::validation_error(
            "Username cannot exceed 100 characters",
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(RepositoryError::validation_error(
            "Username can only contain letters, numbers, dots, hyphens, and underscores",
        ));
    }

    Ok(())
}

fn validate_email(email: &str) -> Result<(), RepositoryError> {
    let email = email.trim();
    if email.len() > 255 {
        return Err(RepositoryError::validation_error(
            "Email cannot exceed 255 characters",
        ));
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(RepositoryError::validation_error(format!(
            "Invalid email address '{email}'"
        ))),
    }
}
