//! Application configuration for the SQL Assistant server.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// Variables are read without a prefix so the usual launcher contract holds:
/// - `HOST`: Server bind address (default: "0.0.0.0")
/// - `PORT`: Server port (default: 5000)
/// - `DEBUG`: Enable debug mode (default: false)
/// - `SERVER_NAME`: Server name for identification
/// - `HIDDEN_TABLES`: Comma-separated tables hidden from `/api/tables` (default: "users")
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable debug mode
    #[serde(default)]
    pub debug: bool,

    /// Server name for identification
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Tables that are never listed to clients
    #[serde(default = "default_hidden_tables")]
    pub hidden_tables: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_server_name() -> String {
    "sql-assistant".to_string()
}

fn default_hidden_tables() -> String {
    "users".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed list of hidden table names.
    pub fn hidden_table_list(&self) -> Vec<String> {
        self.hidden_tables
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            server_name: default_server_name(),
            hidden_tables: default_hidden_tables(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert!(!config.debug);
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_hidden_table_list() {
        let config = AppConfig {
            hidden_tables: " users, audit_log ,,".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.hidden_table_list(), vec!["users", "audit_log"]);
    }
}
