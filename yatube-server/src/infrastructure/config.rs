use std::fmt;

use serde::Deserialize;

pub const DEFAULT_POSTS_PER_PAGE: u32 = 10;
pub const DEFAULT_POST_PREVIEW_CHARS: usize = 15;

/// Staff account seeded at startup, so groups can be managed on a fresh store.
#[derive(Deserialize, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub posts_per_page: u32,
    pub post_preview_chars: usize,
    #[serde(default)]
    pub admin: Option<AdminAccount>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be exercised
    /// without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let posts_per_page = match lookup("POSTS_PER_PAGE") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("invalid POSTS_PER_PAGE: {}", e))?,
            None => DEFAULT_POSTS_PER_PAGE,
        };
        if posts_per_page == 0 {
            anyhow::bail!("POSTS_PER_PAGE must be at least 1");
        }
        let post_preview_chars = match lookup("POST_PREVIEW_CHARS") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid POST_PREVIEW_CHARS: {}", e))?,
            None => DEFAULT_POST_PREVIEW_CHARS,
        };

        let admin = match (
            lookup("ADMIN_USERNAME").filter(|s| !s.is_empty()),
            lookup("ADMIN_PASSWORD").filter(|s| !s.is_empty()),
        ) {
            (Some(username), Some(password)) => Some(AdminAccount {
                email: lookup("ADMIN_EMAIL")
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("{username}@localhost")),
                username,
                password,
            }),
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_USERNAME and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            posts_per_page,
            post_preview_chars,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, None);
        assert_eq!(config.posts_per_page, 10);
        assert_eq!(config.post_preview_chars, 15);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(config.admin.is_none());
    }

    #[test]
    fn admin_account_needs_username_and_password() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "password1"),
        ]))
        .unwrap();
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "admin@localhost");
        assert!(!format!("{admin:?}").contains("password1"));

        assert!(
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("ADMIN_USERNAME", "admin")]))
                .is_err()
        );
    }

    #[test]
    fn reads_page_size_and_preview_length() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("POSTS_PER_PAGE", "25"),
            ("POST_PREVIEW_CHARS", "30"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();
        assert_eq!(config.posts_per_page, 25);
        assert_eq!(config.post_preview_chars, 30);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(AppConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn zero_or_garbage_page_size_is_an_error() {
        assert!(
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("POSTS_PER_PAGE", "0")]))
                .is_err()
        );
        assert!(
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("POSTS_PER_PAGE", "ten")]))
                .is_err()
        );
    }
}
