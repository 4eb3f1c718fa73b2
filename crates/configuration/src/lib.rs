use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseConfig, ServerConfig};

/// Loads the application configuration.
///
/// This function is the primary entry point for this crate. It layers an
/// optional `config.toml` under `RONDAGUARD_`-prefixed environment variables
/// (e.g. `RONDAGUARD_SERVER__PORT=8080`), deserializes the result into our
/// strongly-typed `Config` struct, and validates it.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // The file is optional; defaults cover every field.
        .add_source(config::File::with_name("config.toml").required(false))
        // `__` separates nested keys, so RONDAGUARD_DATABASE__MAX_CONNECTIONS
        // reaches database.max_connections.
        .add_source(config::Environment::with_prefix("RONDAGUARD").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
