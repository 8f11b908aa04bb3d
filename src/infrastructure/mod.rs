// Infrastructure module - External dependencies and adapters
pub mod ansible_cfg;
pub mod config;
pub mod logging;
pub mod runner;
