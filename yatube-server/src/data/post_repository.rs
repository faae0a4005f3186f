use crate::data::{db_error, violates};
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostUpdate};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Which posts a feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Group(Uuid),
    Author(Uuid),
}

impl FeedFilter {
    pub fn matches(&self, group_id: Option<Uuid>, author_id: Uuid) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::Group(id) => group_id == Some(*id),
            FeedFilter::Author(id) => author_id == *id,
        }
    }

    fn group_id(&self) -> Option<Uuid> {
        match self {
            FeedFilter::Group(id) => Some(*id),
            _ => None,
        }
    }

    fn author_id(&self) -> Option<Uuid> {
        match self {
            FeedFilter::Author(id) => Some(*id),
            _ => None,
        }
    }
}

/// Posts are always listed newest first, ties broken by id (UUIDv7, so
/// reverse creation order).
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    /// Rewrites text and group of a post owned by `author_id`. `None` if no
    /// such post exists for that author.
    async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<Option<Post>, DomainError>;
    async fn count(&self, filter: FeedFilter) -> Result<u64, DomainError>;
    async fn list(
        &self,
        filter: FeedFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A group deleted after it was resolved surfaces as an FK violation.
fn group_reference_error(group_id: Option<Uuid>, context: &str, e: sqlx::Error) -> DomainError {
    match group_id {
        Some(id) if violates(&e, "posts_group_id_fkey") => {
            DomainError::GroupNotFound(id.to_string())
        }
        _ => db_error(context, e),
    }
}

const POST_COLUMNS: &str = r#"
    p.id, p.text, p.pub_date, p.author_id, u.username AS author,
    p.group_id, g.slug AS "group"
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

const FEED_WHERE: &str = r#"
    WHERE ($1::uuid IS NULL OR p.group_id = $1)
      AND ($2::uuid IS NULL OR p.author_id = $2)
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (id, text, pub_date, author_id, group_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, text, pub_date, author_id, group_id
            )
            SELECT {POST_COLUMNS} FROM p {POST_JOINS}
            "#
        );
        let created = sqlx::query_as::<_, Post>(&sql)
            .bind(post.id)
            .bind(&post.text)
            .bind(post.pub_date)
            .bind(post.author_id)
            .bind(post.group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| group_reference_error(post.group_id, "failed to create post", e))?;

        info!(post_id = %created.id, author_id = %created.author_id, "post created");
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p {POST_JOINS} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("failed to find post", e))
    }

    async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET text = $1, group_id = $2
                WHERE id = $3 AND author_id = $4
                RETURNING id, text, pub_date, author_id, group_id
            )
            SELECT {POST_COLUMNS} FROM p {POST_JOINS}
            "#
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&update.text)
            .bind(update.group_id)
            .bind(id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| group_reference_error(update.group_id, "failed to update post", e))?;

        if post.is_some() {
            info!(post_id = %id, "post updated");
        }

        Ok(post)
    }

    async fn count(&self, filter: FeedFilter) -> Result<u64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM posts p {FEED_WHERE}");
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filter.group_id())
            .bind(filter.author_id())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("failed to count posts", e))?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn list(
        &self,
        filter: FeedFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p {POST_JOINS}
            {FEED_WHERE}
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(filter.group_id())
            .bind(filter.author_id())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("failed to list posts", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_by_reference() {
        let group = Uuid::new_v4();
        let author = Uuid::new_v4();

        assert!(FeedFilter::All.matches(None, author));
        assert!(FeedFilter::Group(group).matches(Some(group), author));
        assert!(!FeedFilter::Group(group).matches(None, author));
        assert!(FeedFilter::Author(author).matches(Some(group), author));
        assert!(!FeedFilter::Author(author).matches(None, Uuid::new_v4()));
    }
}
