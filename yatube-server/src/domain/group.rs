use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// A community posts may optionally belong to. Addressed externally by `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_SLUG_LEN: usize = 50;

impl Group {
    pub fn new(title: String, slug: String, description: String) -> Result<Self, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be blank"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(
                "title",
                format!("must be at most {MAX_TITLE_LEN} characters"),
            ));
        }
        validate_slug(&slug)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description,
        })
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.is_empty() {
        return Err(DomainError::validation("slug", "must not be empty"));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(DomainError::validation(
            "slug",
            format!("must be at most {MAX_SLUG_LEN} characters"),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::validation(
            "slug",
            "only latin letters, digits, hyphens and underscores are allowed",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_title() {
        let group = Group::new(
            "Тестовая группа".into(),
            "test-slug".into(),
            "Тестовое описание".into(),
        )
        .unwrap();
        assert_eq!(group.to_string(), "Тестовая группа");
    }

    #[test]
    fn rejects_non_url_safe_slugs() {
        assert!(validate_slug("test-slug_2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Тестовый слаг").is_err());
        assert!(validate_slug("with space").is_err());
    }

    #[test]
    fn enforces_column_lengths() {
        let at_limit = Group::new("т".repeat(200), "a".repeat(50), String::new());
        assert!(at_limit.is_ok());

        let long_title = Group::new("t".repeat(201), "slug".into(), String::new()).unwrap_err();
        assert!(matches!(long_title, DomainError::Validation { field: "title", .. }));

        let long_slug = Group::new("t".into(), "a".repeat(51), String::new()).unwrap_err();
        assert!(matches!(long_slug, DomainError::Validation { field: "slug", .. }));
    }

    #[test]
    fn rejects_blank_title() {
        let err = Group::new("  ".into(), "slug".into(), String::new()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    }
}
