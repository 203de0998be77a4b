//! # AFS Common Library
//!
//! Shared code for the Amendment Feedback System:
//! - Error type used across crates
//! - Bootstrap configuration (TOML) and root folder resolution
//! - Database initialization, row models and queries
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
