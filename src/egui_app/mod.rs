//! egui Native Desktop App Module
//!
//! Desktop shell over the session store: a spinner while a stored session
//! is verified, the login form while signed out, and the tabbed admin shell
//! once signed in.
//!
//! # Module Structure
//!
//! ```text
//! egui_app/
//! ├── mod.rs    - Module exports
//! ├── main.rs   - Binary entry point
//! ├── state/    - AppState: session snapshot, login and tab loading
//! ├── types.rs  - Tabs and the generic table model
//! ├── views/    - Top bar, login form, tabbed shell
//! └── theme/    - Colors and frames
//! ```
//!
//! Network work runs on a tokio runtime; results come back to the UI thread
//! over `std::sync::mpsc` channels that [`AppState::poll`] drains every frame.

pub mod state;
pub mod theme;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use state::AppState;
pub use types::{AppTab, TabData};
