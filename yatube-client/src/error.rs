use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        match resp.text().await {
            Ok(body) => Self::from_status(status, &body),
            Err(err) => ClientError::Request(err),
        }
    }

    /// Maps a non-success status and the server's `{"error": ...}` body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string());
        match status {
            400 => ClientError::InvalidRequest(message),
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            _ => ClientError::Server { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_error_body() {
        let err = ClientError::from_status(
            400,
            r#"{"error":"invalid text: must contain at least one non-whitespace character","details":{"field":"text"}}"#,
        );
        assert!(
            matches!(err, ClientError::InvalidRequest(ref m) if m.starts_with("invalid text"))
        );
    }

    #[test]
    fn maps_statuses_to_variants() {
        assert!(matches!(
            ClientError::from_status(401, ""),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            ClientError::from_status(403, r#"{"error":"forbidden"}"#),
            ClientError::Forbidden(ref m) if m == "forbidden"
        ));
        assert!(matches!(
            ClientError::from_status(404, "plain text"),
            ClientError::NotFound(ref m) if m == "plain text"
        ));
        assert!(matches!(
            ClientError::from_status(502, "bad gateway"),
            ClientError::Server { status: 502, .. }
        ));
    }
}
