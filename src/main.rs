use std::{error::Error, net::SocketAddr, sync::Arc};

use recipe_api::{routes::routes, store::PgStore, store::Store, Config};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;

    log::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Migrations applied");
    }

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let api = routes(store, config.max_body_bytes);

    let address = SocketAddr::new(config.bind_address, config.port);
    let (bound, server) = warp::serve(api).try_bind_with_graceful_shutdown(address, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {e}");
        }
        log::info!("Shutting down...");
    })?;

    log::info!("Server running on {bound}");
    server.await;

    Ok(())
}
