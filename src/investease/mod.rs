pub mod client;
pub mod error;
pub mod proxy;
pub mod types;

pub use client::InvestEaseClient;
pub use error::InvestEaseError;
pub use proxy::{InvestEaseProxy, ProxyRequest, ProxyResponse};
pub use types::Strategy;
