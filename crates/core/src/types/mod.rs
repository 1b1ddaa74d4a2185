//! Core types for Zentra.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod order_code;
pub mod status;

pub use id::*;
pub use money::Money;
pub use order_code::{OrderCode, OrderCodeError};
pub use status::*;
