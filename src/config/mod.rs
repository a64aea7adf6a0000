use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ModerationConfig {
    /// Allows issuing the maintenance grant that removes FAQ entries
    /// without a staff actor.
    #[serde(default)]
    pub allow_maintenance_removal: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lectern=debug".to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("database.url", "sqlite://lectern.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("moderation.allow_maintenance_removal", false)?
            .set_default("logging.filter", "lectern=debug")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with LECTERN__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("LECTERN").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://lectern.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            moderation: ModerationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
