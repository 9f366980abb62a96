pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use observability::init_tracing;
pub use server::{AppState, PrintgateServer, ServerBuilder, build_app, router};
