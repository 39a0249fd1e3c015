use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::store::Store;
use crate::store::memory::MemoryStore;
use crate::store::mysql::MySqlStore;

pub async fn init_db(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    if config.uses_memory_store() {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = MySqlStore::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    info!(max_connections = config.db_max_connections, "Connected to MySQL");
    Ok(Arc::new(store))
}
