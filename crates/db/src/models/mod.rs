//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create/save DTO for inserts where the backend writes

pub mod appointment;
pub mod conversation;
pub mod customer;
pub mod insight;
pub mod interaction;
pub mod invoice;
pub mod lead;
pub mod memory;
pub mod reporting;
pub mod user;
pub mod vehicle;
