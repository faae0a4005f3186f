use crate::data::{db_error, violates};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: Group) -> Result<Group, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;
    async fn list(&self) -> Result<Vec<Group>, DomainError>;
    /// Removes the group and detaches every post that referenced it.
    /// Returns `false` if no group had that slug.
    async fn delete(&self, slug: &str) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO post_groups (id, title, slug, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(group.id)
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "post_groups_slug") {
                DomainError::GroupAlreadyExists(group.slug.clone())
            } else {
                db_error("failed to create group", e)
            }
        })?;

        info!(group_id = %group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to find group by slug", e))
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups ORDER BY title, slug",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list groups", e))
    }

    async fn delete(&self, slug: &str) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to open transaction", e))?;

        let detached = sqlx::query(
            r#"
            UPDATE posts SET group_id = NULL
            WHERE group_id = (SELECT id FROM post_groups WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("failed to detach posts from group", e))?;

        let deleted = sqlx::query("DELETE FROM post_groups WHERE slug = $1")
            .bind(slug)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to delete group", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("failed to commit group deletion", e))?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        info!(
            slug = %slug,
            detached_posts = detached.rows_affected(),
            "group deleted"
        );
        Ok(true)
    }
}
