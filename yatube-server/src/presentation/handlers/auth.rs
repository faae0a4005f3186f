use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::infrastructure::security::TOKEN_TTL_SECONDS;
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest};
use actix_web::{HttpResponse, Scope, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth").service(register).service(login)
}

fn bearer(token: String, username: String) -> AuthResponse {
    AuthResponse {
        access_token: token,
        expires_in: TOKEN_TTL_SECONDS,
        token_type: "Bearer".to_string(),
        username,
    }
}

#[post("/register")]
async fn register(
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();

    let user = service.register(username, email, password).await?;
    info!(user_id = %user.id, username = %user.username, "user registered");

    let token = service.issue_token(&user)?;

    Ok(HttpResponse::Created().json(bearer(token, user.username)))
}

#[post("/login")]
async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let (token, user) = service.login(&payload.username, &payload.password).await?;

    info!(username = %user.username, "user logged in");

    Ok(HttpResponse::Ok().json(bearer(token, user.username)))
}
