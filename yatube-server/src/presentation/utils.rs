use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::RequestId;

/// Never fails: requests the auth middleware did not resolve are anonymous.
impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let actor = req
            .extensions()
            .get::<Actor>()
            .cloned()
            .unwrap_or(Actor::Anonymous);
        ready(Ok(actor))
    }
}

/// Verifies the token and checks that its user still exists.
pub async fn resolve_actor(
    token: &str,
    keys: &JwtKeys,
    auth_service: &AuthService,
) -> Result<Actor, DomainError> {
    let claims = keys
        .verify_token(token)
        .map_err(|_| DomainError::Unauthorized)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;

    match auth_service.get_user(user_id).await {
        Ok(user) => Ok(Actor::user(user.id, user.username)),
        Err(err) if err.is_not_found() => Err(DomainError::Unauthorized),
        Err(err) => Err(err),
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
