//! Database schema, models and queries

pub mod analytics;
pub mod assessments;
pub mod init;
pub mod models;
pub mod users;

pub use init::init_database;
pub use models::*;
