//! The OctoScore API server: request dispatch over an authenticated JSON
//! envelope, the scoring and interests handlers, and the axum transport.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod observability;
pub mod scoring;
pub mod server;

pub use config::{AppConfig, LoggingConfig, ServerConfig, StorageBackend, StorageConfig};
pub use dispatch::{RequestContext, dispatch, shape_response};
pub use handlers::AppState;
pub use observability::{apply_logging_level, init_tracing};
pub use server::{OctoscoreServer, ServerBuilder, build_app};
