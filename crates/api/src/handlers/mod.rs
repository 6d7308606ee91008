pub mod auth;
pub mod business;
pub mod conversation;
pub mod insight;
pub mod memory;
pub mod status;
