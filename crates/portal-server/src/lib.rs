pub mod admin;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod portal;
pub mod server;
pub mod services;

pub use cache::{CacheStats, CachedEntry, ResponseCache};
pub use config::{AppConfig, BootstrapConfig, CacheConfig, LoggingConfig, ServerConfig};
pub use error::ApiError;
pub use observability::{apply_logging_config, init_tracing};
pub use server::{AppState, PortalServer, ServerBuilder, build_app, build_router};
pub use services::{ActivityLogger, ClientDataService};
