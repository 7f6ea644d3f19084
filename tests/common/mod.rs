//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Mock backend helpers (wiremock)
//! - Session and token storage helpers
//! - Custom assertion macros

pub mod mock_server;

// Re-export commonly used utilities
pub use auth_helpers::*;
pub use mock_server::*;
