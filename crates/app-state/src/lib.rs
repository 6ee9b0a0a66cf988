//! Session-lifetime state management for Meridian Market
//!
//! This crate holds the runtime contexts that live for exactly one
//! browsing session: the theme runtime context (active theme plus style
//! injection), the shopping cart, and the admin auth state. Contexts are
//! explicit objects created at session start and passed by reference;
//! there is no ambient global state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod cart;
pub mod theme;

pub use auth::AuthState;
pub use cart::{CartItem, CartState};
pub use theme::{ContextPhase, StyleTarget, ThemeContext, ThemeContextError};
