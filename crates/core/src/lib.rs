//! Shopzify Core - Shared types library.
//!
//! This crate provides common types used across all Shopzify components:
//! - `storefront` - REST API server
//! - `client` - Typed HTTP client used by front ends
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails and passwords, plus `Gender`
//! - [`api`] - JSON wire types shared by the server and the client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use types::*;
