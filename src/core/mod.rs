//! Core types: errors, configuration, default paths.

pub mod config;
pub mod errors;
pub mod paths;
