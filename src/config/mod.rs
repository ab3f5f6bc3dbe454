/// Database connection, table creation and schema fingerprint checks
pub mod database;

/// Catalog seed loading from config.toml
pub mod catalog;
