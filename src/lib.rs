//! Studio Admin - Main Library
//!
//! Administrative client for a dance-studio booking backend: directions,
//! class schedule, products, bookings, payments, students and studio
//! settings, all behind an operator session.
//!
//! # Module Structure
//!
//! - **`shared`** - configuration, error types and REST payloads
//! - **`api`** - the guarded request client and the typed resource endpoints
//! - **`session`** - the session store and persisted token storage
//! - **`egui_app`** - native desktop shell (egui/eframe)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studio_admin::api::ApiClient;
//! use studio_admin::session::{FileTokenStorage, SessionStore};
//! use studio_admin::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let client = ApiClient::new(&config)?;
//! let storage = Arc::new(FileTokenStorage::from_config(&config)?);
//! let session = SessionStore::new(client, storage);
//!
//! session.initialize().await;
//! if !session.snapshot().is_authenticated() {
//!     session.login("admin@studio.local", "secret").await?;
//! }
//! let directions = session.client().directions().list(false).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - `ApiClient` is cheap to clone; clones share the credential and guards
//! - `SessionStore` is shared by `Arc`; state changes are published through
//!   a `tokio::sync::watch` channel
//! - the egui shell is single-threaded and talks to the runtime over channels

/// Shared types and data structures
pub mod shared;

/// Guarded REST client
pub mod api;

/// Operator session
pub mod session;

/// egui native desktop app
pub mod egui_app;
