use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{MongoUserRepository, UserService};
use tokio_util::sync::CancellationToken;
use tracing::info;

mod api;
mod config;
mod openapi;
mod shutdown;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        database = config.mongodb.database(),
        collection = %config.users_collection,
        "Connecting to MongoDB"
    );

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    let repository = MongoUserRepository::with_collection(db, &config.users_collection);
    let service = UserService::new(repository);

    // Cancelled once a signal arrives so in-flight store calls stop waiting
    let shutdown = CancellationToken::new();

    let state = AppState {
        config,
        mongo_client,
        shutdown: shutdown.clone(),
    };

    let app = api::routes(&state, service);

    let listener = tokio::net::TcpListener::bind(state.config.server.address()).await?;
    info!("Users API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal(shutdown))
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    // The driver closes its pool on drop
    drop(state);
    info!("Users API shutdown complete");
    Ok(())
}
