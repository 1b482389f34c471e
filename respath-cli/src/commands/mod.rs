//! CLI command implementations.

pub mod common;
pub mod config;
pub mod resolve;
pub mod roots;
pub mod scan;
