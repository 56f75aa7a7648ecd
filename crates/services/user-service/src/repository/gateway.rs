//! Generic entity-persistence gateway.
//!
//! [`EntityGateway`] provides uniform CRUD operations for a single entity
//! type, fixed at compile time through its type parameter. Entity-specific
//! repositories compose a gateway and add their own lookups on top.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, Iterable, PaginatorTrait, PrimaryKeyToColumn,
    PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect,
};
use thiserror::Error;

use common::{AppError, AppResult};

/// Identifier row produced by the first phase of a paged query.
#[derive(Debug, FromQueryResult)]
struct IdRow {
    id: i32,
}

/// Uniform CRUD access to one entity type.
///
/// Entities managed through the gateway use a single `i32` primary key
/// assigned by the store.
pub struct EntityGateway<E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32> + PrimaryKeyToColumn<Column = E::Column>,
{
    db: DatabaseConnection,
    id_column: E::Column,
}

impl<E> EntityGateway<E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32> + PrimaryKeyToColumn<Column = E::Column>,
{
    /// Create a gateway for `E` on the given connection.
    ///
    /// # Panics
    ///
    /// Panics if `E` declares no primary-key column. The managed type must be
    /// fully determined at construction, so this aborts instead of deferring
    /// the failure to the first query.
    pub fn new(db: DatabaseConnection) -> Self {
        let id_column = E::PrimaryKey::iter()
            .next()
            .map(PrimaryKeyToColumn::into_column)
            .expect("entity declares no primary-key column");

        Self { db, id_column }
    }

    /// Count all rows of the managed entity.
    pub async fn total_count(&self) -> AppResult<u64> {
        E::find().count(&self.db).await.map_err(AppError::from)
    }

    /// Single-row fetch by primary key. Missing ids yield `None`, never an
    /// error.
    pub async fn get(&self, id: i32) -> AppResult<Option<E::Model>> {
        E::find_by_id(id).one(&self.db).await.map_err(AppError::from)
    }

    /// Fetch all rows, store-default order.
    pub async fn get_all(&self) -> AppResult<Vec<E::Model>> {
        E::find().all(&self.db).await.map_err(AppError::from)
    }

    /// Fetch each id individually, in input order. Missing ids keep their
    /// slot as `None` so callers can zip the result against the input.
    ///
    /// Issues one query per id.
    pub async fn get_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Option<E::Model>>> {
        let mut rows = Vec::with_capacity(ids.len());
        for &id in ids {
            rows.push(E::find_by_id(id).one(&self.db).await?);
        }
        Ok(rows)
    }

    /// Fetch one page of rows ordered by primary key ascending.
    ///
    /// Page numbering is 1-based. Runs in two phases: first the page of
    /// identifiers is selected with skip `(page - 1) * per_page`, then the
    /// full rows matching those identifiers are fetched.
    pub async fn get_page(&self, page: u64, per_page: u64) -> AppResult<Vec<E::Model>> {
        if page == 0 {
            return Err(AppError::validation("Page numbers start at 1"));
        }
        if per_page == 0 {
            return Err(AppError::validation("Page size must be at least 1"));
        }

        let ids: Vec<i32> = E::find()
            .select_only()
            .column_as(self.id_column, "id")
            .order_by_asc(self.id_column)
            .offset((page - 1) * per_page)
            .limit(per_page)
            .into_model::<IdRow>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        E::find()
            .filter(self.id_column.is_in(ids))
            .order_by_asc(self.id_column)
            .all(&self.db)
            .await
            .map_err(AppError::from)
    }

    /// Insert a new row; the store assigns the identity.
    pub async fn create<A>(&self, entity: A) -> AppResult<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        entity.insert(&self.db).await.map_err(AppError::from)
    }

    /// Full-row update by primary key. Fails with not-found when the row is
    /// absent.
    pub async fn update<A>(&self, entity: A) -> AppResult<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        match entity.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound),
            Err(err) => Err(AppError::from(err)),
        }
    }

    /// Delete by primary key. Fails with not-found when the row is absent.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = E::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

// =============================================================================
// Patch support
// =============================================================================

/// Failure taxonomy for JSON Patch application against stored entities.
///
/// Declared ahead of the patch feature itself so clients can already rely on
/// the status mapping; nothing constructs these during normal CRUD.
// TODO: wire these up once JSON Patch application lands.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The patch was created against a previous version of the entity -- an
    /// optimistic locking failure.
    #[error("Optimistic locking version out of date")]
    VersionConflict,

    /// The patch document cannot be parsed.
    #[error("Cannot parse patch: {0}")]
    Malformed(String),

    /// The patch targets an entity that does not exist.
    #[error("Cannot find patch target")]
    TargetMissing,

    /// The patch is well-formed but cannot be applied.
    #[error("Cannot apply patch: {0}")]
    Unprocessable(String),
}

impl PatchError {
    /// HTTP status the variant maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            PatchError::VersionConflict => StatusCode::CONFLICT,
            PatchError::Malformed(_) => StatusCode::BAD_REQUEST,
            PatchError::TargetMissing => StatusCode::NOT_FOUND,
            PatchError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for PatchError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::entities::user;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn user_model(id: i32) -> user::Model {
        user::Model {
            id,
            email: format!("user{}@example.com", id),
            name: format!("User {}", id),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn gateway(db: DatabaseConnection) -> EntityGateway<user::Entity> {
        EntityGateway::new(db)
    }

    #[tokio::test]
    async fn get_returns_row_when_present() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(7)]])
            .into_connection();

        let found = gateway(db).get(7).await.unwrap();
        assert_eq!(found.map(|m| m.id), Some(7));
    }

    #[tokio::test]
    async fn get_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        assert!(gateway(db).get(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_by_ids_keeps_order_and_missing_slots() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1)], vec![], vec![user_model(3)]])
            .into_connection();

        let rows = gateway(db).get_by_ids(&[1, 2, 3]).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_ref().map(|m| m.id), Some(1));
        assert!(rows[1].is_none());
        assert_eq!(rows[2].as_ref().map(|m| m.id), Some(3));
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = gateway(db).get_page(0, 10).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_page_size_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = gateway(db).get_page(1, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn second_page_returns_rows_after_the_first() {
        let page: Vec<user::Model> = (11..=20).map(user_model).collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([page.clone(), page.clone()])
            .into_connection();

        let rows = gateway(db).get_page(2, 10).await.unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows.first().map(|m| m.id), Some(11));
        assert_eq!(rows.last().map(|m| m.id), Some(20));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let rows = gateway(db).get_page(99, 10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = gateway(db).delete(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn delete_existing_row_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        gateway(db).delete(42).await.unwrap();
    }

    #[test]
    fn patch_errors_map_to_statuses() {
        assert_eq!(PatchError::VersionConflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            PatchError::Malformed("bad json".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PatchError::TargetMissing.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            PatchError::Unprocessable("no such field".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
