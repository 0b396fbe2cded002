//! Core types for Tracknest.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod order_number;
pub mod shop;

pub use order_number::OrderNumber;
pub use shop::{ShopDomain, ShopDomainError};
