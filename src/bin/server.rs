use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info, warn};

use jbfields::env_config;
use jbfields::phase0_tables::build_context;
use jbfields::server::{create_router, ServerContext};
use jbfields::storage::{load_or_compute_ev_table, TableSource};

#[tokio::main]
async fn main() -> ExitCode {
    env_config::init_logging();
    if let Err(e) = env_config::init_base_path() {
        error!("Failed to change to base path: {}", e);
        return ExitCode::FAILURE;
    }
    let port = env_config::server_port();
    info!("Starting Jumbleberry Fields API server...");

    let ctx = build_context();
    let (table, source) = load_or_compute_ev_table(&ctx, env_config::ev_table_path());
    match source {
        TableSource::Loaded => info!("EV table loaded"),
        TableSource::Computed => {
            info!("No precomputed table found; computed and saved (run jbf-precompute to avoid this)")
        }
        TableSource::ComputedUnsaved(e) => warn!("Computed EV table but could not save it: {}", e),
    }

    let app = create_router(Arc::new(ServerContext { ctx, table }));

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind port {}: {}", port, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Server is running on port {}. Press Ctrl+C to stop.", port);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Stopping server...");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
