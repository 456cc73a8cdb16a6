//! mbyte HTTP adapters
//!
//! - `ManagerClient`: Process Service over the manager API
//! - `StoreClient`: Content Service over a user's store API
//! - `ClientConfig`: layered configuration for both

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod manager;
pub mod store;
pub mod transport;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use crate::config::{ClientConfig, ConfigOverrides};
pub use error::{HttpError, Result};
pub use manager::ManagerClient;
pub use store::StoreClient;
pub use transport::ApiTransport;
