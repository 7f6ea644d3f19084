//! Shared Module
//!
//! Types shared by the request client, the session store and the desktop
//! shell: configuration, error types and the REST payloads of the studio
//! backend.

/// Application configuration
pub mod config;

/// Shared error types
pub mod error;

/// REST payloads
pub mod models;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::{ApiError, AuthError, StorageError};
pub use models::AdminUser;
