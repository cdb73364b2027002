use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};
use tracing::info;

use crate::config::AppConfig;
use crate::store::{HttpStore, MemoryStore, Store};

/// Current-thread runtime; every action is awaited to completion before the next one starts.
pub fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")
}

pub fn open_store(config: &AppConfig, demo: bool) -> Result<Arc<dyn Store>> {
    if demo {
        info!("using seeded in-memory store");
        return Ok(Arc::new(MemoryStore::demo()));
    }
    info!(url = config.store_url(), "using HTTP store");
    Ok(Arc::new(HttpStore::new(config.store_url())?))
}
