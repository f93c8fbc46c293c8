//! Typed async client for the Shopzify storefront API.
//!
//! - [`ApiClient`] sends every request with the current access token and, on
//!   a 401, refreshes the token once through the session cookie and retries.
//!   Concurrent 401s share a single refresh.
//! - Queries are cached by tag and invalidated by the mutations that affect
//!   them.
//! - [`WishlistSync`] keeps an optimistic local wishlist that is reconciled
//!   with the server after every toggle.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
mod client;
mod endpoints;
mod error;
mod session;
mod wishlist;

#[cfg(test)]
mod test_support;

pub use cache::Tag;
pub use client::ApiClient;
pub use error::{ClientError, FALLBACK_MESSAGE};
pub use session::{AuthSession, AuthState};
pub use wishlist::{Notice, NoticeKind, PendingToggle, WishlistSync};
