use crate::domain::group::Group;
use crate::domain::pagination::Page;
use crate::domain::post::Post;
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
    pub username: String,
}

// ======================= POSTS =======================

/// Body of both create and edit. An empty `group` means "no group".
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
}

impl PostForm {
    pub fn group_slug(&self) -> Option<&str> {
        self.group.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
}

impl FeedQuery {
    /// Missing or non-numeric → 1. Numbers pass through and are clamped by
    /// the paginator; numbers beyond `i64` saturate so they still clamp.
    pub fn page_number(&self) -> i64 {
        let Some(raw) = self.page.as_deref() else {
            return 1;
        };
        match raw.trim().parse::<i64>() {
            Ok(n) => n,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => 1,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub page: PageInfo,
}

impl From<Page<Post>> for PostListResponse {
    fn from(page: Page<Post>) -> Self {
        let info = PageInfo {
            number: page.number,
            num_pages: page.num_pages,
            total: page.total,
            has_next: page.has_next,
            has_previous: page.has_previous,
        };
        Self {
            posts: page.items,
            page: info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupFeedResponse {
    pub group: Group,
    #[serde(flatten)]
    pub feed: PostListResponse,
}

#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub username: String,
    pub posts_count: u64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub author: AuthorSummary,
    #[serde(flatten)]
    pub feed: PostListResponse,
}

// ======================= GROUPS =======================

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> FeedQuery {
        FeedQuery {
            page: page.map(String::from),
        }
    }

    #[test]
    fn page_parameter_is_lenient() {
        assert_eq!(query(None).page_number(), 1);
        assert_eq!(query(Some("abc")).page_number(), 1);
        assert_eq!(query(Some("")).page_number(), 1);
        assert_eq!(query(Some("2")).page_number(), 2);
        assert_eq!(query(Some(" 3 ")).page_number(), 3);
        assert_eq!(query(Some("-4")).page_number(), -4);
        assert_eq!(query(Some("99999999999999999999")).page_number(), i64::MAX);
        assert_eq!(query(Some("-99999999999999999999")).page_number(), i64::MIN);
        assert_eq!(query(Some("1.5")).page_number(), 1);
    }

    #[test]
    fn blank_group_means_no_group() {
        let form = |group: Option<&str>| PostForm {
            text: "t".into(),
            group: group.map(String::from),
        };
        assert_eq!(form(None).group_slug(), None);
        assert_eq!(form(Some("")).group_slug(), None);
        assert_eq!(form(Some("  ")).group_slug(), None);
        assert_eq!(form(Some("test-slug")).group_slug(), Some("test-slug"));
    }
}
