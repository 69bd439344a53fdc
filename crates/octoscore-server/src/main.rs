use std::{env, sync::Arc};

use octoscore_db_memory::MemoryStore;
use octoscore_db_remote::RemoteStore;
use octoscore_server::config::{StorageBackend, loader::load_config};
use octoscore_server::{ServerBuilder, observability};
use octoscore_storage::ScoreStore;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From OCTOSCORE_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (octoscore.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (OCTOSCORE_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present; it is optional for local development.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let (config_path, source) = resolve_config_path();
    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );
    observability::apply_logging_level(&cfg.logging.level);

    let store: Arc<dyn ScoreStore> = match cfg.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Remote => {
            let remote = RemoteStore::new(cfg.storage.remote.clone());
            // Absent connections degrade at call time, so a failure here
            // does not stop startup.
            remote.connect().await;
            Arc::new(remote)
        }
    };
    tracing::info!(backend = store.backend_name(), "Store backend ready");

    let server = ServerBuilder::new().with_config(cfg).with_store(store).build();
    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: OCTOSCORE_CONFIG
/// 3. Default: octoscore.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("OCTOSCORE_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("octoscore.toml".to_string(), ConfigSource::Default)
}
