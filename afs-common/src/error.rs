//! Errors raised by the feedback store and configuration layer
//!
//! afs-server maps `NotFound` to 404 and `InvalidInput` to 400; every other
//! variant is reported as a 500.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query, transaction or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Creating the root folder or reading the config file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable or unparsable, or an inference client that
    /// cannot be built from it
    #[error("Configuration error: {0}")]
    Config(String),

    /// Amendment id with no stored row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Comment submission rejected before any analysis ran (bad amendment id,
    /// blank or oversized text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pipeline produced an outcome the recorder cannot store
    #[error("Internal error: {0}")]
    Internal(String),
}
