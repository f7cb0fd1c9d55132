//! Async client for the TaskFlow Lite API
//!
//! Sessions live in an injected [`TokenStore`]. Any authenticated call that comes back 401
//! triggers one token refresh and one retry; a failed refresh clears the store.
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskflow_client::{ApiClient, MemoryTokenStore};
//!
//! # async fn run() -> Result<(), taskflow_client::ClientError> {
//! let client = ApiClient::new("http://localhost:5000/api", Arc::new(MemoryTokenStore::new()));
//! client.login("alice@taskflow.demo", "Demo@123").await?;
//! let _teams = client.list_teams().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod store;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use store::{FileTokenStore, MemoryTokenStore, Session, TokenStore};

// Request and response types shared with the server
pub use taskflow_api::models;
