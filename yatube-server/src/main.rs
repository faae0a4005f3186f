use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use yatube_server::data::memory::MemoryStore;
use yatube_server::infrastructure::config::AppConfig;
use yatube_server::infrastructure::database::{create_pool, run_migrations};
use yatube_server::infrastructure::logging::init_logging;
use yatube_server::server::{AppServices, start_rest_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = create_pool(database_url)
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("failed to run migrations")?;
            AppServices::postgres(pool, &config)
        }
        None => {
            warn!("DATABASE_URL not set, running on the in-memory store");
            AppServices::in_memory(Arc::new(MemoryStore::new()), &config)
        }
    };

    if let Some(admin) = config.admin.clone() {
        services
            .auth
            .ensure_staff(admin.username, admin.email, admin.password)
            .await
            .context("failed to seed the admin account")?;
    }

    info!(
        posts_per_page = config.posts_per_page,
        post_preview_chars = config.post_preview_chars,
        "services ready"
    );

    start_rest_server(config, services).await
}
