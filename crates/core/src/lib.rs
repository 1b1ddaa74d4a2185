//! Zentra Core - Shared domain types library.
//!
//! This crate provides the common types used across all Zentra components:
//! - `checkout` - Cart, order/payment submission, and payment polling
//! - the mobile shell (out of tree) - screens binding to the checkout flows
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. This keeps it lightweight and allows it to be used
//! anywhere, including synchronous UI bindings.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, order codes,
//!   and payment statuses
//! - [`card`] - Pure validators/formatters for card-like payment fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod card;
pub mod types;

pub use types::*;
