// Domain module - Shared error and configuration types
pub mod config;
pub mod error;
