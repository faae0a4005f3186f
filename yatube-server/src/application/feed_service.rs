use std::sync::Arc;

use tracing::{debug, instrument};

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{FeedFilter, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::pagination::{Page, Paginator};
use crate::domain::post::Post;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub author: User,
    pub page: Page<Post>,
}

/// Newest-first, paginated views over posts: everything, one group, or one
/// author.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        paginator: Paginator,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            paginator,
        }
    }

    #[instrument(skip(self))]
    pub async fn global_feed(&self, page: i64) -> Result<Page<Post>, DomainError> {
        self.page(FeedFilter::All, page).await
    }

    #[instrument(skip(self))]
    pub async fn group_feed(&self, slug: &str, page: i64) -> Result<GroupFeed, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))?;
        let page = self.page(FeedFilter::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    #[instrument(skip(self))]
    pub async fn author_feed(&self, username: &str, page: i64) -> Result<AuthorFeed, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;
        let page = self.page(FeedFilter::Author(author.id), page).await?;
        Ok(AuthorFeed { author, page })
    }

    async fn page(&self, filter: FeedFilter, requested: i64) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count(filter).await?;
        let window = self.paginator.window(total, requested);
        let items = self
            .posts
            .list(filter, window.limit, window.offset)
            .await?;

        debug!(
            ?filter,
            requested,
            page = window.number,
            num_pages = window.num_pages,
            returned = items.len(),
            "feed page assembled"
        );
        Ok(Page::new(items, window, total))
    }
}
