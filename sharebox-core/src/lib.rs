//! sharebox-core: client library for the sharebox file sharing service
//!
//! This crate provides:
//! - Credential validators
//! - Access token decoding and the session store
//! - The REST API client (bearer auth, 401 policy, presigned uploads)
//! - Routes, history and the route guard
//! - View models for every screen

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod session;
pub mod storage;
pub mod upload;
pub mod validators;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use auth::{Claims, Identity};
pub use config::Config;
pub use models::{FileRecord, ShareDuration, ShareRecord};
pub use router::{Navigation, Route, Router};
pub use session::Session;
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use upload::LocalFile;

/// Default API origin
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
