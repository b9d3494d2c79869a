//! Connector configuration.

use demo_db::DbConfig;

/// Configuration for the demo connector.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Where and how to open the embedded database.
    pub db: DbConfig,
    /// Populate the demo dataset on startup if it is not already present.
    pub init_db: bool,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Length used when a random password is requested without one.
    pub default_password_length: usize,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            init_db: false,
            pepper: None,
            default_password_length: 16,
        }
    }
}
