use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::application::feed_service::FeedService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;
use crate::data::group_repository::{GroupRepository, PostgresGroupRepository};
use crate::data::memory::MemoryStore;
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::Paginator;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{BearerAuth, RequestTrace};

/// Every service the HTTP layer calls, wired to one store.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub posts: PostService,
    pub feeds: FeedService,
    pub groups: GroupService,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        keys: JwtKeys,
        posts_per_page: u32,
        preview_chars: usize,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&users), keys),
            posts: PostService::new(Arc::clone(&posts), Arc::clone(&groups), preview_chars),
            feeds: FeedService::new(
                posts,
                Arc::clone(&groups),
                Arc::clone(&users),
                Paginator::new(posts_per_page),
            ),
            groups: GroupService::new(groups, users),
        }
    }

    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresGroupRepository::new(pool.clone())),
            Arc::new(PostgresPostRepository::new(pool)),
            JwtKeys::new(config.jwt_secret.clone()),
            config.posts_per_page,
            config.post_preview_chars,
        )
    }

    pub fn in_memory(store: Arc<MemoryStore>, config: &AppConfig) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store,
            JwtKeys::new(config.jwt_secret.clone()),
            config.posts_per_page,
            config.post_preview_chars,
        )
    }
}

/// Registers shared state and the `/api` routes.
pub fn configure(services: AppServices) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let keys = services.auth.keys().clone();
        let json = web::JsonConfig::default()
            .error_handler(|err, _| DomainError::validation("body", err.to_string()).into());
        let path = web::PathConfig::default()
            .error_handler(|_, req| DomainError::NotFound(req.path().to_string()).into());

        cfg.app_data(json)
            .app_data(path)
            .app_data(web::Data::new(services.auth))
            .app_data(web::Data::new(services.posts))
            .app_data(web::Data::new(services.feeds))
            .app_data(web::Data::new(services.groups))
            .service(
                web::scope("/api")
                    .wrap(BearerAuth::new(keys))
                    .route("/health", web::get().to(health))
                    .service(handlers::auth::scope())
                    .service(handlers::post::index)
                    .service(handlers::post::group_posts)
                    .service(handlers::post::profile)
                    .service(handlers::post::post_detail)
                    .service(handlers::post::create_post)
                    .service(handlers::post::update_post)
                    .service(handlers::group::list_groups)
                    .service(handlers::group::create_group)
                    .service(handlers::group::delete_group),
            );
    }
}

pub async fn start_rest_server(config: AppConfig, services: AppServices) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);
    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(RequestTrace)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .configure(configure(services.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        };
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
