use std::sync::Arc;

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostUpdate, validate_text};
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    preview_chars: usize,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        preview_chars: usize,
    ) -> Self {
        Self {
            posts,
            groups,
            preview_chars,
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    #[instrument(skip(self, text))]
    pub async fn create_post(
        &self,
        actor: &Actor,
        text: String,
        group_slug: Option<&str>,
    ) -> Result<Post, DomainError> {
        let author_id = actor.require_id()?;
        validate_text(&text)?;
        let group_id = self.resolve_group(group_slug).await?;

        let post = self
            .posts
            .create(NewPost::new(author_id, text, group_id))
            .await?;

        info!(
            post_id = %post.id,
            author = %post.author,
            group = post.group.as_deref().unwrap_or("-"),
            preview = %post.preview(self.preview_chars),
            "post published"
        );
        Ok(post)
    }

    /// Only the author may edit. `author` and `pub_date` are never touched;
    /// concurrent edits are last-write-wins.
    #[instrument(skip(self, text))]
    pub async fn edit_post(
        &self,
        actor: &Actor,
        post_id: Uuid,
        text: String,
        group_slug: Option<&str>,
    ) -> Result<Post, DomainError> {
        let actor_id = actor.require_id()?;
        let existing = self.get_post(post_id).await?;
        if !actor.is(existing.author_id) {
            warn!(post_id = %post_id, actor = ?actor.username(), "edit by non-author refused");
            return Err(DomainError::Forbidden);
        }
        validate_text(&text)?;
        let group_id = self.resolve_group(group_slug).await?;

        let post = self
            .posts
            .update(post_id, actor_id, PostUpdate { text, group_id })
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;

        info!(
            post_id = %post.id,
            preview = %post.preview(self.preview_chars),
            "post edited"
        );
        Ok(post)
    }

    async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<Uuid>, DomainError> {
        let Some(slug) = slug else {
            return Ok(None);
        };
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))?;
        Ok(Some(group.id))
    }
}
