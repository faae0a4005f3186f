//! In-memory store, used when no database is configured and in tests.
//!
//! Holds users, groups and posts behind a single lock so that group deletion
//! can detach posts atomically. Data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{FeedFilter, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{NewPost, Post, PostUpdate};
use crate::domain::user::User;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, NewPost>,
}

impl Tables {
    fn resolve(&self, row: &NewPost) -> Result<Post, DomainError> {
        let author = self.users.get(&row.author_id).ok_or_else(|| {
            DomainError::Internal(format!("post {} references missing author", row.id))
        })?;
        let group = row.group_id.and_then(|id| self.groups.get(&id));
        Ok(Post {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            author_id: author.id,
            author: author.username.clone(),
            group_id: group.map(|g| g.id),
            group: group.map(|g| g.slug.clone()),
        })
    }

    fn check_references(&self, author_id: Uuid, group_id: Option<Uuid>) -> Result<(), DomainError> {
        if !self.users.contains_key(&author_id) {
            return Err(DomainError::Internal(format!(
                "unknown author {author_id}"
            )));
        }
        if let Some(group_id) = group_id {
            if !self.groups.contains_key(&group_id) {
                return Err(DomainError::GroupNotFound(group_id.to_string()));
            }
        }
        Ok(())
    }

    /// Matching posts in canonical feed order.
    fn feed(&self, filter: FeedFilter) -> Vec<&NewPost> {
        let mut rows: Vec<&NewPost> = self
            .posts
            .values()
            .filter(|p| filter.matches(p.group_id, p.author_id))
            .collect();
        rows.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        rows
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn set_staff(&self, id: Uuid, is_staff: bool) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .users
            .get_mut(&id)
            .map(|user| user.is_staff = is_staff)
            .is_some())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(DomainError::GroupAlreadyExists(group.slug));
        }
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
        Ok(groups)
    }

    async fn delete(&self, slug: &str) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(id) = tables
            .groups
            .values()
            .find(|g| g.slug == slug)
            .map(|g| g.id)
        else {
            return Ok(false);
        };

        // set-null on delete: posts outlive their group
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        tables.groups.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut tables = self.tables.write().await;
        tables.check_references(post.author_id, post.group_id)?;
        let created = tables.resolve(&post)?;
        tables.posts.insert(post.id, post);
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .get(&id)
            .map(|row| tables.resolve(row))
            .transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables.write().await;
        tables.check_references(author_id, update.group_id)?;
        let Some(row) = tables
            .posts
            .get_mut(&id)
            .filter(|row| row.author_id == author_id)
        else {
            return Ok(None);
        };
        row.text = update.text;
        row.group_id = update.group_id;
        let row = row.clone();
        tables.resolve(&row).map(Some)
    }

    async fn count(&self, filter: FeedFilter) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.feed(filter).len() as u64)
    }

    async fn list(
        &self,
        filter: FeedFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        let tables = self.tables.read().await;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        tables
            .feed(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| tables.resolve(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn seed_user(store: &MemoryStore, username: &str) -> User {
        UserRepository::create(
            store,
            User::new(username.into(), format!("{username}@example.com"), "hash".into()),
        )
        .await
        .unwrap()
    }

    async fn seed_group(store: &MemoryStore, slug: &str) -> Group {
        let group = Group::new("Тестовая группа".into(), slug.into(), "Описание".into()).unwrap();
        GroupRepository::create(store, group).await.unwrap()
    }

    #[tokio::test]
    async fn lists_newest_first_with_id_tiebreak() {
        let store = MemoryStore::new();
        let author = seed_user(&store, "some_user").await;
        let now = Utc::now();

        let mut older = NewPost::new(author.id, "older".into(), None);
        older.pub_date = now - Duration::minutes(5);
        let mut tie_a = NewPost::new(author.id, "tie a".into(), None);
        tie_a.pub_date = now;
        let mut tie_b = NewPost::new(author.id, "tie b".into(), None);
        tie_b.pub_date = now;

        for post in [tie_a, older, tie_b] {
            PostRepository::create(&store, post).await.unwrap();
        }

        let texts: Vec<String> = PostRepository::list(&store, FeedFilter::All, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, ["tie b", "tie a", "older"]);
    }

    #[tokio::test]
    async fn deleting_group_detaches_posts() {
        let store = MemoryStore::new();
        let author = seed_user(&store, "some_user").await;
        let group = seed_group(&store, "test-slug").await;

        let post = PostRepository::create(
            &store,
            NewPost::new(author.id, "Тестовый пост".into(), Some(group.id)),
        )
        .await
        .unwrap();
        assert_eq!(post.group.as_deref(), Some("test-slug"));

        assert!(GroupRepository::delete(&store, "test-slug").await.unwrap());

        let post = PostRepository::find_by_id(&store, post.id)
            .await
            .unwrap()
            .expect("post survives group deletion");
        assert_eq!(post.group_id, None);
        assert_eq!(post.group, None);
        assert_eq!(store.count(FeedFilter::Group(group.id)).await.unwrap(), 0);
        assert_eq!(store.count(FeedFilter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_unknown_group_reports_false() {
        let store = MemoryStore::new();
        assert!(!GroupRepository::delete(&store, "missing").await.unwrap());
    }

    #[tokio::test]
    async fn post_referencing_deleted_group_is_group_not_found() {
        let store = MemoryStore::new();
        let author = seed_user(&store, "some_user").await;
        let group = seed_group(&store, "test-slug").await;
        let post = PostRepository::create(&store, NewPost::new(author.id, "orig".into(), None))
            .await
            .unwrap();
        GroupRepository::delete(&store, "test-slug").await.unwrap();

        assert!(matches!(
            PostRepository::create(&store, NewPost::new(author.id, "x".into(), Some(group.id)))
                .await,
            Err(DomainError::GroupNotFound(_))
        ));
        let update = PostUpdate {
            text: "changed".into(),
            group_id: Some(group.id),
        };
        assert!(matches!(
            store.update(post.id, author.id, update).await,
            Err(DomainError::GroupNotFound(_))
        ));
        assert_eq!(store.count(FeedFilter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let store = MemoryStore::new();
        seed_group(&store, "test-slug").await;
        let again = Group::new("Другая".into(), "test-slug".into(), String::new()).unwrap();
        assert!(matches!(
            GroupRepository::create(&store, again).await,
            Err(DomainError::GroupAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn update_requires_matching_author() {
        let store = MemoryStore::new();
        let author = seed_user(&store, "author_user").await;
        let other = seed_user(&store, "another_user").await;
        let post = PostRepository::create(&store, NewPost::new(author.id, "orig".into(), None))
            .await
            .unwrap();

        let update = PostUpdate {
            text: "changed".into(),
            group_id: None,
        };
        assert!(store.update(post.id, other.id, update.clone()).await.unwrap().is_none());

        let updated = store.update(post.id, author.id, update).await.unwrap().unwrap();
        assert_eq!(updated.text, "changed");
        assert_eq!(updated.pub_date, post.pub_date);
        assert_eq!(updated.author_id, author.id);
    }
}
