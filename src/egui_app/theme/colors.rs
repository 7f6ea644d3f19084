//! Color Constants
//!
//! Warm brown/tan palette used across the admin shell.

use egui::Color32;

/// Top bar background - Dark brown
pub const TOP_BAR_BG: Color32 = Color32::from_rgb(0x3E, 0x2A, 0x24);

/// Dark background for main areas
pub const BG_DARK: Color32 = Color32::from_rgb(0x2F, 0x1E, 0x1A);

/// Alternate grid row - Slightly lighter than the background
pub const ROW_STRIPE: Color32 = Color32::from_rgb(0x3A, 0x27, 0x21);

/// Hovered widget background
pub const HOVER: Color32 = Color32::from_rgb(0x5C, 0x3A, 0x2C);

/// Text on dark backgrounds
pub const TEXT_LIGHT: Color32 = Color32::from_rgb(0xF0, 0xE0, 0xD6);

/// Secondary text color (muted)
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0x8B, 0x7B, 0x6B);

/// Accent color for highlights and the primary button
pub const ACCENT: Color32 = Color32::from_rgb(0x5C, 0x3A, 0x2C);

/// Selected tab background
pub const SELECTED: Color32 = Color32::from_rgb(0x4A, 0x2E, 0x22);

/// Input background
pub const INPUT_BG: Color32 = Color32::from_rgb(0x4A, 0x33, 0x2B);

/// Error color - Red
pub const ERROR: Color32 = Color32::from_rgb(0xE5, 0x73, 0x73);

/// Error banner background
pub const ERROR_BG: Color32 = Color32::from_rgb(0x4A, 0x22, 0x22);
