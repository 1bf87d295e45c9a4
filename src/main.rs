use std::net::TcpListener;

use anyhow::Context;
use attendance_tracker::{config::Config, db::open_store, server};
use tracing::info;
use tracing_appender::rolling;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!("Server starting...");

    let store = open_store(&config)
        .await
        .context("failed to open record store")?;
    info!(backend = store.backend_name(), "Record store ready");

    let server_addr = config.server_addr();
    let listener =
        TcpListener::bind(&server_addr).with_context(|| format!("failed to bind {server_addr}"))?;
    info!(addr = %server_addr, "Listening");

    let result = server::run(listener, store.clone(), config)?.await;

    store.close().await;
    info!("Record store closed, server stopped");

    result.context("server terminated with an error")
}
