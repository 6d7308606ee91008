//! Domain types and pure logic for the DealerGPT assistant.
//!
//! Nothing in this crate performs I/O. Database rows live in `dealergpt_db`,
//! the LLM client in `dealergpt_llm`, and orchestration in
//! `dealergpt_pipeline`.

pub mod capabilities;
pub mod context;
pub mod conversation;
pub mod dealership;
pub mod error;
pub mod format;
pub mod greeting;
pub mod insights;
pub mod kpi;
pub mod prompt;
pub mod roles;
pub mod snapshot;
pub mod types;
