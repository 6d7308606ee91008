//! Background tasks. Each takes a [`tokio_util::sync::CancellationToken`]
//! and runs until it is cancelled.

pub mod memory_retention;
