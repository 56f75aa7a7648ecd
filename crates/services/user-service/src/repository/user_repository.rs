//! User repository backed by the generic entity gateway.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    Set,
};

use common::{AppError, AppResult};
use domain::{CreateUser, Identifiable, User};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::gateway::EntityGateway;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; the store assigns the id
    async fn save(&self, new_user: CreateUser) -> AppResult<User>;

    /// Delete a user by its identity
    async fn delete(&self, user: &User) -> AppResult<()>;

    /// All users, store-default order
    async fn get_all(&self) -> AppResult<Vec<User>>;

    /// One page of users ordered by id (1-based page numbering), plus the
    /// total row count
    async fn get_page(&self, page: u64, per_page: u64) -> AppResult<(Vec<User>, u64)>;

    /// Exact-match email lookup; unique result or `None`
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fetch a user by primary key
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Persist changes to an existing user
    async fn update(&self, user: &User) -> AppResult<User>;
}

/// Concrete implementation of [`UserRepository`] over SeaORM.
pub struct UserStore {
    db: DatabaseConnection,
    gateway: EntityGateway<UserEntity>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        let gateway = EntityGateway::new(db.clone());
        Self { db, gateway }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn save(&self, new_user: CreateUser) -> AppResult<User> {
        let new_user = new_user.normalized()?;

        let now = chrono::Utc::now();
        let active = ActiveModel {
            id: NotSet,
            email: Set(new_user.email),
            name: Set(new_user.name),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = self.gateway.create(active).await?;
        Ok(User::from(model))
    }

    async fn delete(&self, user: &User) -> AppResult<()> {
        self.gateway.delete(user.id()).await
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        // Queries the entity directly instead of going through the gateway.
        let models = UserEntity::find()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn get_page(&self, page: u64, per_page: u64) -> AppResult<(Vec<User>, u64)> {
        let total = self.gateway.total_count().await?;
        let models = self.gateway.get_page(page, per_page).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        // Uniqueness is a caller-level precondition, not a schema constraint;
        // fetching two rows is enough to detect a violation.
        let mut models = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .limit(2)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        if models.len() > 1 {
            return Err(AppError::internal(format!(
                "multiple users share email {}",
                email
            )));
        }

        Ok(models.pop().map(User::from))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.gateway.get(id).await?.map(User::from))
    }

    async fn update(&self, _user: &User) -> AppResult<User> {
        // Deliberately left unwired; see DESIGN.md before routing this to the
        // gateway's full-row update.
        Err(AppError::unimplemented("User update"))
    }
}
