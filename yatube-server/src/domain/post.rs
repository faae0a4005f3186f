use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// A published post as it is read back from the store, joined with the
/// author's username and the slug of its group, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
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
    pub fn preview(&self, limit: usize) -> &str {
        match self.text.char_indices().nth(limit) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }
}

/// A post about to be inserted. `pub_date` is fixed here and never written again.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
}

impl NewPost {
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            pub_date: Utc::now(),
            author_id,
            group_id,
        }
    }
}

/// The only fields an edit may touch.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub text: String,
    pub group_id: Option<Uuid>,
}

pub fn validate_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::validation(
            "text",
            "must contain at least one non-whitespace character",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_text(text: &str) -> Post {
        Post {
            id: Uuid::now_v7(),
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id: Uuid::new_v4(),
            author: "some_user".into(),
            group_id: None,
            group: None,
        }
    }

    #[test]
    fn preview_truncates_by_characters() {
        let post = post_with_text("Тестовый пост с длинным текстом");
        assert_eq!(post.preview(15), "Тестовый пост с");
        assert_eq!(post.preview(0), "");
    }

    #[test]
    fn preview_keeps_short_text_whole() {
        let post = post_with_text("Тестовый пост");
        assert_eq!(post.preview(15), "Тестовый пост");
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        for text in ["", " ", "\n\t  \r\n"] {
            assert!(matches!(
                validate_text(text),
                Err(DomainError::Validation { field: "text", .. })
            ));
        }
    }

    #[test]
    fn text_with_content_is_accepted_as_is() {
        assert!(validate_text("  padded  ").is_ok());
        assert!(validate_text(".").is_ok());
    }

    #[test]
    fn new_post_ids_follow_creation_order() {
        let first = NewPost::new(Uuid::new_v4(), "a".into(), None);
        let second = NewPost::new(Uuid::new_v4(), "b".into(), None);
        assert!(second.id > first.id);
    }
}
