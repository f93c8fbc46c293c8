//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Sign-up, login, access tokens
//! - `catalog` - Product listing, search, admin writes
//! - `wishlist` - Wishlist toggle
//! - `cart` - Cart quantities and summary
//! - `checkout` - Turning a cart into an order
//!
//! Services borrow trait objects from [`crate::db::Repositories`] and return
//! their own error enums; `AppError` maps those to HTTP responses.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

/// How many read-decide-write cycles a document update gets before giving up.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;
