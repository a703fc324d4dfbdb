//! Bookstore Core - Shared domain library.
//!
//! This crate provides the types and state transitions used by the
//! `storefront` binary:
//!
//! - [`catalog`] - Products and the catalog load lifecycle
//! - [`cart`] - Session cart, its commands and totals
//! - [`types`] - Newtype wrappers for IDs, prices and quantities
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients, no templates. Everything here can be tested without a
//! running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{CartCommand, CartEvent, CartLineItem, CartState};
pub use catalog::{CatalogLoadError, CatalogResponse, CatalogState, Product};
pub use types::*;
