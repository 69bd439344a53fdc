use std::net::SocketAddr;

use octoscore_core::AuthKeys;
use octoscore_db_remote::RemoteStoreConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Shared-secret salts for the auth protocol
    #[serde(default)]
    pub auth: AuthKeys,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.host.parse::<std::net::IpAddr>().is_err() {
            return Err(format!(
                "server.host must be an IP address, got '{}'",
                self.server.host
            ));
        }
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Storage validations only matter for the remote backend
        if self.storage.backend == StorageBackend::Remote {
            if self.storage.remote.host.is_empty() {
                return Err("storage.remote.host must not be empty".into());
            }
            if self.storage.remote.port == 0 {
                return Err("storage.remote.port must be > 0".into());
            }
            if self.storage.remote.timeout_ms == 0 {
                return Err("storage.remote.timeout_ms must be > 0".into());
            }
        }
        Ok(())
    }

    /// Socket address for the listener. `validate()` rejects hosts that do
    /// not parse, so the fallback here is unreachable on a validated config.
    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Which store backend serves interests records and the score cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Remote,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Connection settings, used only when `backend = "remote"`.
    #[serde(default)]
    pub remote: RemoteStoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("octoscore.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., OCTOSCORE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("OCTOSCORE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn toml_fragment_fills_the_rest_with_defaults() {
        let cfg: AppConfig = toml_de(
            r#"
            [server]
            port = 9090

            [storage]
            backend = "remote"

            [storage.remote]
            host = "store.internal"
            "#,
        );
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.backend, StorageBackend::Remote);
        assert_eq!(cfg.storage.remote.host, "store.internal");
        assert_eq!(cfg.storage.remote.port, 7333);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.host = "not-an-address".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("server.host"));

        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::Remote;
        cfg.storage.remote.host = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn auth_salts_are_overridable() {
        let cfg: AppConfig = toml_de(
            r#"
            [auth]
            salt = "deployment secret"
            "#,
        );
        assert_eq!(cfg.auth.salt, "deployment secret");
        assert_eq!(cfg.auth.admin_salt, "42");
    }

    fn toml_de(raw: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
