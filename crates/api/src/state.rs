use std::sync::Arc;

use dealergpt_llm::ChatCompletion;
use dealergpt_pipeline::{
    BusinessDataSource, ConversationService, DataAggregator, PgDataSource, PgMemoryStore,
};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: dealergpt_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub conversation: Arc<ConversationService>,
    pub memory: Arc<PgMemoryStore>,
    pub data_source: Arc<dyn BusinessDataSource>,
}

impl AppState {
    /// Wire the DealerGPT services over `pool` with the given model client.
    pub fn new(
        pool: dealergpt_db::DbPool,
        config: ServerConfig,
        llm: Arc<dyn ChatCompletion>,
        llm_timeout: std::time::Duration,
    ) -> Self {
        let data_source: Arc<dyn BusinessDataSource> = Arc::new(PgDataSource::new(pool.clone()));
        let memory = Arc::new(PgMemoryStore::new(pool.clone()));
        let aggregator = DataAggregator::new(
            Arc::clone(&data_source),
            config.dealergpt.data_timeout(),
        );
        let conversation = ConversationService::new(
            aggregator,
            memory.clone(),
            llm,
            config.dealergpt.conversation_settings(llm_timeout),
        );

        Self {
            pool,
            config: Arc::new(config),
            conversation: Arc::new(conversation),
            memory,
            data_source,
        }
    }
}
