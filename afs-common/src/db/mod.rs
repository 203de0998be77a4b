//! Database models and queries

pub mod amendments;
pub mod feedback;
pub mod init;
pub mod models;

pub use amendments::*;
pub use feedback::*;
pub use init::*;
pub use models::*;
