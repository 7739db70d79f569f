// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;

use tokio::{net::TcpListener, signal};
use voll_med_server::{
    api::router,
    auth::{hash_password, Role, TokenCodec},
    config::Config,
    logging::init_logging,
    state::AppState,
    store::InMemoryStore,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(config.log_format);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let tokens = TokenCodec::from_secret(config.secret.as_bytes())?;
    tracing::info!(algorithm = ?tokens.algorithm(), "Token signing configured");

    let mut store = InMemoryStore::new();
    if let Some(seed) = &config.seed_admin {
        let hash = hash_password(&seed.password, Some(config.bcrypt_cost)).await?;
        let admin = store.insert_user(seed.login.as_str(), hash, Role::Admin)?;
        tracing::info!(user_id = admin.id, login = %admin.login, "Seeded admin user");
    }

    let app = router(AppState::new(store, tokens));

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Voll Med server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
