//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod appointment_repo;
pub mod conversation_repo;
pub mod customer_repo;
pub mod insight_repo;
pub mod interaction_repo;
pub mod invoice_repo;
pub mod lead_repo;
pub mod memory_repo;
pub mod reporting_repo;
pub mod user_repo;
pub mod vehicle_repo;

pub use appointment_repo::AppointmentRepo;
pub use conversation_repo::ConversationRepo;
pub use customer_repo::CustomerRepo;
pub use insight_repo::InsightRepo;
pub use interaction_repo::InteractionRepo;
pub use invoice_repo::InvoiceRepo;
pub use lead_repo::LeadRepo;
pub use memory_repo::MemoryRepo;
pub use reporting_repo::ReportingRepo;
pub use user_repo::UserRepo;
pub use vehicle_repo::VehicleRepo;
