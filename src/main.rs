use flasky::config::Config;
use flasky::store::PgStore;
use flasky::utils::app_error::AppError;
use flasky::utils::logger;
use flasky::utils::roles::{default_role, default_role_table, insert_roles};
use flasky::AppState;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    logger::init(config.log_format);

    info!("Starting with {:?} configuration", config.environment);

    let store = PgStore::connect(&config.database_url).await?;
    store.migrate().await.map_err(|e| {
        warn!("Failed to run migrations : {e}");
        e
    })?;

    let app_state = AppState::new(store, config)?;

    let roles = insert_roles(app_state.store.as_ref(), &default_role_table()).await?;
    let default = default_role(app_state.store.as_ref()).await?;
    info!(
        "{} roles ready, new users get {}",
        roles.len(),
        default.name
    );

    Ok(())
}
