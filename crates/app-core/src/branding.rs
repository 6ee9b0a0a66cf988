//! Meridian Market branding
//!
//! Branding constants for the storefront. These are the literal values
//! the UI falls back to when no theme is active; the live values come
//! from the theme engine.

/// Application name
pub const APP_NAME: &str = "Meridian Market";

/// Application name short form
pub const APP_NAME_SHORT: &str = "Meridian";

/// Application tagline
pub const APP_TAGLINE: &str = "Small shop, considered goods";

/// Application version (from Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fallback brand colors, matching the built-in default theme
pub mod colors {
    /// Primary brand color
    pub const PRIMARY: &str = "#3B82F6";

    /// Secondary brand color
    pub const SECONDARY: &str = "#10B981";

    /// Accent color
    pub const ACCENT: &str = "#8B5CF6";

    /// Page background
    pub const BACKGROUND: &str = "#FFFFFF";

    /// Body text
    pub const TEXT: &str = "#1F2937";

    /// Error/danger color
    pub const ERROR: &str = "#EF4444";
}

/// Copyright information
pub mod copyright {
    /// Copyright year
    pub const YEAR: &str = "2024-2025";

    /// Copyright holder
    pub const HOLDER: &str = "Meridian Market Team";

    /// License
    pub const LICENSE: &str = "MIT";

    /// Full copyright notice
    pub fn notice() -> String {
        format!("© {} {}. Licensed under {}.", YEAR, HOLDER, LICENSE)
    }
}
