//! Theme Module
//!
//! Color scheme and styling for the admin shell:
//!
//! - Color constants for the brown/tan theme
//! - Frame builders for the top bar, content area and error banners
//!
//! # Usage
//!
//! ```rust,ignore
//! use studio_admin::egui_app::theme::{colors, styles};
//!
//! styles::apply_global_theme(ctx);
//! styles::error_banner_frame().show(ui, |ui| {
//!     ui.colored_label(colors::ERROR, "Could not load data.");
//! });
//! ```

pub mod colors;
pub mod styles;
