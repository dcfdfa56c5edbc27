//! Shared environment configuration for all binaries.
//!
//! Consolidates the `JBF_BASE_PATH`, `JBF_EV_TABLE`, `RAYON_NUM_THREADS` and
//! `JBF_PORT` reads, plus logger setup.

use std::path::PathBuf;

use log::{info, warn};

use crate::constants::DEFAULT_EV_TABLE_PATH;

/// Install `env_logger` with an `info` default filter (`RUST_LOG` overrides).
/// A second call is a no-op.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// Read `JBF_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> std::io::Result<PathBuf> {
    let base_path = std::env::var("JBF_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    std::env::set_current_dir(&base_path)?;
    let cwd = std::env::current_dir()?;
    info!("Working directory: {}", cwd.display());
    Ok(cwd)
}

/// Read `JBF_EV_TABLE` (default `data/ev_table.json`).
pub fn ev_table_path() -> PathBuf {
    std::env::var("JBF_EV_TABLE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_EV_TABLE_PATH))
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`) and size the global
/// rayon pool. Without either, rayon picks. Returns the thread count in use.
pub fn init_rayon_threads() -> usize {
    let requested: Option<usize> = std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0);
    if let Some(n) = requested {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            warn!("Rayon pool already initialized: {}", e);
        }
    }
    let num_threads = rayon::current_num_threads();
    info!("Rayon threads: {}", num_threads);
    num_threads
}

/// Read `JBF_PORT` (default 8080).
pub fn server_port() -> u16 {
    std::env::var("JBF_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080)
}
