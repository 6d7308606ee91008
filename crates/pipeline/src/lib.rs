//! DealerGPT request pipeline.
//!
//! HTTP handler → [`ConversationService`] → [`DataAggregator`] (parallel
//! reads through a [`BusinessDataSource`]) → prompt builder → chat model →
//! best-effort persistence through a [`ConversationMemory`].
//!
//! Every collaborator is a trait object so the service can be exercised
//! without a database or a model endpoint.

pub mod aggregator;
pub mod conversation;
pub mod error;
pub mod health;
pub mod memory;
pub mod source;

#[cfg(test)]
mod testing;

pub use aggregator::{AggregatedSnapshot, DataAggregator, InventorySlice, ReportingWindow};
pub use conversation::{
    ConversationRequest, ConversationResponse, ConversationService, ConversationSettings,
    Degraded,
};
pub use error::PipelineError;
pub use health::{probe_data_sources, DataSourceHealth, HealthReport};
pub use memory::{AcknowledgeOutcome, ConversationMemory, PgMemoryStore};
pub use source::{BusinessDataSource, PgDataSource};
