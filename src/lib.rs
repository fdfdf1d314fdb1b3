pub mod chat;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod filter;
pub mod handlers;
pub mod investease;
pub mod learn;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use routes::app;
pub use state::AppState;
