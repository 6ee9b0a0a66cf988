//! Core application logic for Meridian Market
//!
//! This crate contains the feature services of the storefront and admin
//! console: product catalog, inventory, promotions, orders, checkout
//! handoff, and the theme repository/activation service. Every service
//! talks to the hosted backend through the `store-client` record store
//! boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod branding;
pub mod catalog;
pub mod checkout;
pub mod inventory;
pub mod orders;
pub mod promotions;
pub mod themes;
