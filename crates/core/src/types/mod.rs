//! Core types for Shopzify.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod gender;
pub mod id;
pub mod password;

pub use email::{Email, EmailError};
pub use gender::Gender;
pub use id::*;
pub use password::{Password, PasswordError};
