//! Well-known role name constants.
//!
//! These must match the CHECK constraint in `20261001000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SALESPERSON: &str = "salesperson";
