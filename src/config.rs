use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl DatabaseConfig {
    /// In-memory SQLite lives per connection, so those URLs get a single pooled connection.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Filesystem location of a file-backed database.
    pub fn file_path(&self) -> Option<std::path::PathBuf> {
        if self.is_in_memory() {
            return None;
        }
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        (!path.is_empty()).then(|| std::path::PathBuf::from(path))
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/blog_cms.db?mode=rwc".to_string()),
                max_connections: setting("DATABASE_MAX_CONNECTIONS", "5")?,
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: setting("SERVER_PORT", "8000")?,
            },
        })
    }

    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Reads a numeric setting, falling back to `default` when unset. A value that does not parse is an error.
fn setting<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    parse_setting(name, &raw)
}

fn parse_setting<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        let config = Config::in_memory();
        assert!(config.database.is_in_memory());

        let file = DatabaseConfig {
            url: "sqlite:data/blog_cms.db?mode=rwc".to_string(),
            max_connections: 5,
        };
        assert!(!file.is_in_memory());
        assert_eq!(
            file.file_path(),
            Some(std::path::PathBuf::from("data/blog_cms.db"))
        );
        assert_eq!(config.database.file_path(), None);
    }

    #[test]
    fn test_server_address() {
        let mut config = Config::in_memory();
        config.server.port = 8123;
        assert_eq!(config.server_address(), "127.0.0.1:8123");
    }

    #[test]
    fn test_bad_numeric_settings_are_errors() {
        assert_eq!(parse_setting::<u32>("DATABASE_MAX_CONNECTIONS", "8").unwrap(), 8);
        assert_eq!(parse_setting::<u16>("SERVER_PORT", "8000").unwrap(), 8000);

        let err = parse_setting::<u32>("DATABASE_MAX_CONNECTIONS", "lots").unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
        assert!(parse_setting::<u16>("SERVER_PORT", "70000").is_err());
    }
}
