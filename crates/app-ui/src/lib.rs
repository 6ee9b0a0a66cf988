//! User interface layer for Meridian Market
//!
//! This crate is the consumer boundary of the theme engine: the style
//! injection target, static fallback design tokens, inline-style helpers
//! for the storefront chrome, the admin theme editor form, and the
//! checkout handoff link builder.
//!
//! Chrome helpers read `base_colors` from the active theme and fall back
//! to fixed literal colors when no theme is active, the degraded state
//! the runtime context documents.
//!
//! # Modules
//!
//! - [`style`] - The session's single stylesheet injection point
//! - [`tokens`] - Static fallback palette and breakpoints
//! - [`chrome`] - Inline styles for layout and storefront chrome
//! - [`theme_form`] - Admin theme editor draft building
//! - [`handoff`] - Checkout handoff link builder

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chrome;
pub mod handoff;
pub mod style;
pub mod theme_form;
pub mod tokens;

// Re-export commonly used types
pub use style::InjectedStylesheet;
pub use theme_form::ThemeForm;
