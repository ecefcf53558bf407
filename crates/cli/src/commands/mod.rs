//! CLI command implementations.

pub mod config;
pub mod nav;
pub mod probe;
