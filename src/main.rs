// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use embedding_server::{
    api::{start_server, AppState},
    config::ServerConfig,
    embeddings::load_or_unavailable,
    version,
};
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();

    info!("{}", version::get_version_string());
    info!("Loading embedding model: {}", config.model);

    // Load failures leave the handle unset; /encode then answers 503
    let embedder = load_or_unavailable(&config).await;
    if embedder.is_none() {
        warn!("POST /encode will return 503 Service Unavailable");
    }

    let state = AppState::new(config.model.clone(), embedder);
    start_server(&config, state).await
}
