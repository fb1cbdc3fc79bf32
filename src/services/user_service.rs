use crate::database::sqlite::SqliteDatabase;
use crate::errors::{AppError, Result};
use crate::models::interaction::{NewInteraction, UserProductInteraction};
use crate::models::user::{CreateUserRequest, User, UserProfile, UserResponse};
use crate::utils::crypto::PasswordManager;
use crate::utils::validation::Validator;
use std::sync::Arc;
use tracing::info;

pub struct UserService {
    db: Arc<SqliteDatabase>,
}

impl UserService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<UserResponse> {
        let username = req.username.trim().to_string();
        Validator::validate_username(&username)?;
        Validator::validate_password(&req.password)?;
        Validator::validate_age(req.age)?;

        let password_hash = PasswordManager::hash_password(&req.password)?;
        let (user, profile) = self
            .db
            .create_user_with_profile(&username, &password_hash, req.age, req.gender)
            .await?;

        Ok(UserResponse::new(user, profile))
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.db.get_user_by_id(user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<UserProfile> {
        self.get_user(user_id).await?;
        // Users created outside this service may not have a profile row yet.
        Ok(self
            .db
            .get_user_profile(user_id)
            .await?
            .unwrap_or(UserProfile { user: user_id, age: None, gender: None }))
    }

    pub async fn record_interaction(&self, req: NewInteraction) -> Result<UserProductInteraction> {
        self.get_user(req.user_id).await?;
        if self.db.get_product_by_id(req.product_id).await?.is_none() {
            return Err(AppError::ProductNotFound);
        }

        let interaction = self
            .db
            .record_interaction(req.user_id, req.product_id, req.interaction_type)
            .await?;

        info!(
            action = "interaction_recorded",
            user_id = interaction.user,
            product_id = interaction.product,
            interaction_type = %interaction.interaction_type
        );
        Ok(interaction)
    }

    pub async fn list_interactions(&self, user_id: i64) -> Result<Vec<UserProductInteraction>> {
        self.get_user(user_id).await?;
        self.db.list_user_interactions(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interaction::InteractionType;
    use crate::models::user::Gender;

    fn request(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            password: "password1".into(),
            age: Some(30),
            gender: Some(Gender::Female),
        }
    }

    #[tokio::test]
    async fn created_user_has_hashed_credentials_and_profile() {
        let db = Arc::new(SqliteDatabase::in_memory().await.unwrap());
        let users = UserService::new(db.clone());

        let created = users.create_user(request("user2")).await.unwrap();
        assert_eq!(created.profile.age, Some(30));

        let stored = users.get_user(created.id).await.unwrap();
        assert!(crate::utils::crypto::matches_hash("password1", &stored.password_hash));
        assert_eq!(users.get_profile(created.id).await.unwrap().gender, Some(Gender::Female));
    }

    #[tokio::test]
    async fn invalid_users_are_rejected() {
        let users = UserService::new(Arc::new(SqliteDatabase::in_memory().await.unwrap()));
        assert!(matches!(users.create_user(request("x")).await, Err(AppError::ValidationError(_))));

        let old = CreateUserRequest { age: Some(400), ..request("user3") };
        assert!(matches!(users.create_user(old).await, Err(AppError::ValidationError(_))));

        assert!(matches!(users.get_profile(999).await, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn interactions_require_known_user_and_product() {
        let users = UserService::new(Arc::new(SqliteDatabase::in_memory().await.unwrap()));
        let user = users.create_user(request("user1")).await.unwrap();

        let unknown_product = users
            .record_interaction(NewInteraction { user_id: user.id, product_id: 7, interaction_type: InteractionType::Viewed })
            .await
            .unwrap_err();
        assert!(matches!(unknown_product, AppError::ProductNotFound));

        let unknown_user = users
            .record_interaction(NewInteraction { user_id: 999, product_id: 7, interaction_type: InteractionType::Viewed })
            .await
            .unwrap_err();
        assert!(matches!(unknown_user, AppError::UserNotFound));

        assert!(users.list_interactions(user.id).await.unwrap().is_empty());
    }
}
