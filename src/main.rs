mod api;
mod blockchain;
mod config;
mod consensus;
mod error;
mod transaction;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};

use api::AppState;
use config::NodeConfig;
use error::StartupError;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let (config, state) = match startup() {
        Ok(v) => v,
        Err(e) => {
            error!("node failed to start: {e}");
            return Err(std::io::Error::other(e));
        }
    };

    info!(
        "⛓️ Starting ledger node {} at http://{}:{} (difficulty {})",
        config.node_id, config.host, config.port, config.difficulty
    );

    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn startup() -> Result<(NodeConfig, AppState), StartupError> {
    let config = NodeConfig::from_env()?;
    let state = AppState::new(&config)?;
    Ok((config, state))
}
