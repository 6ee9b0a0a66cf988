//! Theme engine for Meridian Market
//!
//! This crate implements the runtime-configurable visual theme system:
//! color math, theme validation, and CSS custom-property generation.
//! It is a pure library; persistence and activation live in `app-core`,
//! and the session-scoped runtime context lives in `app-state`.
//!
//! # Modules
//!
//! - [`color`] - Hex/HSL conversion, palette derivation, WCAG contrast
//! - [`model`] - The [`ColorTheme`] record and its building blocks
//! - [`validate`] - Schema enforcement for theme records
//! - [`css`] - Deterministic stylesheet generation
//! - [`defaults`] - The built-in default theme and color presets
//!
//! # Example
//!
//! ```rust
//! use theme_engine::color::{contrast_ratio, derive_palette};
//! use theme_engine::defaults::default_theme;
//! use theme_engine::validate::validate_draft;
//!
//! let draft = validate_draft(&default_theme()).unwrap();
//! assert_eq!(draft.version, Some(1));
//!
//! let palette = derive_palette("#3B82F6").unwrap();
//! assert_ne!(palette.light, palette.base);
//!
//! let ratio = contrast_ratio("#FFFFFF", "#000000").unwrap();
//! assert!(ratio > 20.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod color;
pub mod css;
pub mod defaults;
pub mod model;
pub mod validate;

// Re-export commonly used types
pub use color::{AccessibilityLevel, ColorError, ContrastReport, Harmony, Hsl, Palette, Rgb};
pub use model::{ColorTheme, Gradient, GradientStop, ThemeDraft, ThemePatch, Typography};
pub use validate::ValidationError;
