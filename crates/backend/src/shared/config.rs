use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub carrier: CarrierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Carrier Gateway connection and seller origin settings
#[derive(Debug, Deserialize, Clone)]
pub struct CarrierConfig {
    /// Base URL of the Parcelway API
    pub base_url: String,
    /// API token sent in the Authorization header
    pub api_token: String,
    /// Request timeout for carrier calls, seconds
    #[serde(default = "default_carrier_timeout_secs")]
    pub timeout_secs: u64,
    /// Registered pickup location name for outbound replacement shipments
    pub pickup_location: String,
    /// Seller/warehouse address: destination of RTO shipments and
    /// origin of replacement shipments
    pub seller_name: String,
    pub seller_phone: String,
    pub seller_address: String,
    pub seller_pincode: String,
}

fn default_carrier_timeout_secs() -> u64 {
    30
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[carrier]
base_url = "https://sandbox.parcelway.example"
api_token = "dev-token"
timeout_secs = 30
pickup_location = "main-warehouse"
seller_name = "Main Warehouse"
seller_phone = "+7 000 000-00-00"
seller_address = "Warehouse street, 1"
seller_pincode = "000000"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Глобальная конфигурация процесса (ленивая загрузка при первом обращении)
pub fn current() -> anyhow::Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    // If absolute path, use as is
    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    // If relative path, resolve it relative to the executable directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved_path = exe_dir.join(db_path);
            return Ok(resolved_path);
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.carrier.timeout_secs, 30);
        assert_eq!(config.carrier.pickup_location, "main-warehouse");
    }

    #[test]
    fn test_carrier_timeout_defaults_when_omitted() {
        let toml_str = r#"
[database]
path = "db.sqlite"

[carrier]
base_url = "https://api.parcelway.example"
api_token = "t"
pickup_location = "wh-1"
seller_name = "WH"
seller_phone = "+7"
seller_address = "addr"
seller_pincode = "101000"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.carrier.timeout_secs, 30);
    }
}
