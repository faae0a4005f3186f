use std::fs;
use std::path::PathBuf;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;
use crate::{Feed, Group, GroupFeed, Post, Profile};

pub const DEFAULT_TOKEN_FILE: &str = ".yatube_token";

#[derive(Clone)]
pub struct YatubeClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
}

impl YatubeClient {
    pub fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            token: None,
            token_file: None,
        })
    }

    /// Persists tokens to `path` and picks up one stored there earlier.
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if self.token.is_none() {
            self.token = fs::read_to_string(&path)
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
        }
        self.token_file = Some(path);
        self
    }

    pub fn set_token(&mut self, token: String) -> Result<(), ClientError> {
        if let Some(path) = &self.token_file {
            fs::write(path, &token)?;
        }
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(ClientError::from_http_response(resp).await)
        }
    }

    async fn authenticate(&mut self, path: &str, body: serde_json::Value) -> Result<(), ClientError> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        let auth: AuthResponse = Self::read(resp).await?;
        self.set_token(auth.access_token)
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.authenticate(
            "/auth/register",
            json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        self.authenticate(
            "/auth/login",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn global_feed(&self, page: i64) -> Result<Feed, ClientError> {
        self.get_page("/posts", page).await
    }

    pub async fn group_feed(&self, slug: &str, page: i64) -> Result<GroupFeed, ClientError> {
        self.get_page(&format!("/group/{slug}"), page).await
    }

    pub async fn profile(&self, username: &str, page: i64) -> Result<Profile, ClientError> {
        self.get_page(&format!("/profile/{username}"), page).await
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: i64) -> Result<T, ClientError> {
        debug!(path, page, "fetching feed page");
        let resp = self
            .client
            .get(self.url(path))
            .query(&[("page", page)])
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        let resp = self.client.get(self.url(&format!("/posts/{id}"))).send().await?;
        Self::read(resp).await
    }

    pub async fn create_post(&self, text: &str, group: Option<&str>) -> Result<Post, ClientError> {
        let req = self.client.post(self.url("/posts"));
        let resp = self
            .authorized(req)
            .json(&json!({ "text": text, "group": group }))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn edit_post(
        &self,
        id: Uuid,
        text: &str,
        group: Option<&str>,
    ) -> Result<Post, ClientError> {
        let req = self.client.put(self.url(&format!("/posts/{id}")));
        let resp = self
            .authorized(req)
            .json(&json!({ "text": text, "group": group }))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, ClientError> {
        let resp = self.client.get(self.url("/groups")).send().await?;
        Self::read(resp).await
    }

    pub async fn create_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, ClientError> {
        let req = self.client.post(self.url("/groups"));
        let resp = self
            .authorized(req)
            .json(&json!({ "title": title, "slug": slug, "description": description }))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn delete_group(&self, slug: &str) -> Result<(), ClientError> {
        let req = self.client.delete(self.url(&format!("/groups/{slug}")));
        let resp = self.authorized(req).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::from_http_response(resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_api_urls_without_double_slashes() {
        let client = YatubeClient::connect("http://127.0.0.1:8080/").unwrap();
        assert_eq!(client.url("/posts"), "http://127.0.0.1:8080/api/posts");
    }

    #[test]
    fn token_file_round_trip() {
        let path = std::env::temp_dir().join(format!("yatube-token-{}", Uuid::new_v4()));
        let mut client = YatubeClient::connect("http://localhost")
            .unwrap()
            .with_token_file(&path);
        assert_eq!(client.token(), None);

        client.set_token("abc".into()).unwrap();
        let reloaded = YatubeClient::connect("http://localhost")
            .unwrap()
            .with_token_file(&path);
        assert_eq!(reloaded.token(), Some("abc"));

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        let client = YatubeClient::connect("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.global_feed(1).await,
            Err(ClientError::Request(_))
        ));
    }
}
