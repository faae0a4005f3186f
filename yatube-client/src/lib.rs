//! Typed client for the Yatube JSON API.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;
mod http_client;

pub use error::ClientError;
pub use http_client::{DEFAULT_TOKEN_FILE, YatubeClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("[{id}] {author}: {text}")]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub author: String,
    pub group_id: Option<Uuid>,
    pub group: Option<String>,
}

impl Post {
    /// First `limit` characters of the text.
    pub fn preview(&self, limit: usize) -> String {
        self.text.chars().take(limit).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{title} ({slug})")]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("page {number} of {num_pages} ({total} posts)")]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
    pub posts: Vec<Post>,
    pub page: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupFeed {
    pub group: Group,
    #[serde(flatten)]
    pub feed: Feed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorSummary {
    pub username: String,
    pub posts_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub author: AuthorSummary,
    #[serde(flatten)]
    pub feed: Feed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_group_feed_payload() {
        let body = r#"{
            "group": {"id": "6f1e0c5e-0000-4000-8000-000000000001", "title": "Тестовый заголовок",
                      "slug": "test-slug", "description": "Тестовое описание"},
            "posts": [{"id": "01890a5d-ac96-774b-bcce-b302099a8057", "text": "Тестовый пост",
                       "pub_date": "2024-01-01T00:00:00Z",
                       "author_id": "6f1e0c5e-0000-4000-8000-000000000002", "author": "some_user",
                       "group_id": "6f1e0c5e-0000-4000-8000-000000000001", "group": "test-slug"}],
            "page": {"number": 1, "num_pages": 1, "total": 1, "has_next": false, "has_previous": false}
        }"#;
        let feed: GroupFeed = serde_json::from_str(body).unwrap();
        assert_eq!(feed.group.slug, "test-slug");
        assert_eq!(feed.feed.posts.len(), 1);
        assert_eq!(feed.feed.page.to_string(), "page 1 of 1 (1 posts)");
        assert_eq!(feed.feed.posts[0].preview(8), "Тестовый");
    }
}
