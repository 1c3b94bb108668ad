use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{AppConfig, StoreKind};
use crate::store::{CatalogStore, MemoryStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn CatalogStore> = match config.store {
            StoreKind::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres store")?;
                let store = PgStore::connect(url, config.db_max_connections).await?;
                if config.run_migrations {
                    store.migrate().await?;
                    info!("migrations applied");
                }
                Arc::new(store)
            }
            StoreKind::Memory => {
                warn!("using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}
