//! Brigade Server — JSON HTTP API over the chart, training and auth
//! services.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::{ServerArgs, ServerConfig};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
