//! Domain models for storefront.
//!
//! These types hold validated domain state. Wire shapes live in
//! `shopzify_core::api`; row shapes live next to the queries in `db`.

pub mod cart;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::Cart;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
pub use wishlist::Wishlist;
