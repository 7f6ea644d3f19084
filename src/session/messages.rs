//! Operator-facing session messages.

pub const MISSING_CREDENTIALS: &str = "Enter your login and password.";

/// Login answered 400.
pub const INVALID_CREDENTIALS: &str = "Invalid login or password.";

pub const LOGIN_FAILED: &str = "Could not sign in. Check your connection and try again.";

/// Set on forced logout and on a failed startup verification.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

pub const UNEXPECTED: &str = "Unexpected response from the server. Please try again.";
