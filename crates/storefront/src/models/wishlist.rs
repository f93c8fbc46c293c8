//! Wishlist domain type.

use std::collections::HashMap;

use shopzify_core::api::{self, WishlistEntry};
use shopzify_core::{ProductId, UserId};

use crate::db::Revisioned;

/// A user's wishlist: entries in insertion order plus a membership index.
///
/// The index maps each product id to its position in `entries`, so
/// membership checks do not scan the list.
#[derive(Debug, Clone)]
pub struct Wishlist {
    user_id: UserId,
    entries: Vec<WishlistEntry>,
    index: HashMap<ProductId, usize>,
    /// Revision this wishlist was loaded at; `None` if it has never been saved.
    revision: Option<i64>,
}

impl Wishlist {
    /// A wishlist that does not exist in storage yet.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            entries: Vec::new(),
            index: HashMap::new(),
            revision: None,
        }
    }

    /// Rebuild from a stored document.
    ///
    /// Duplicate product ids keep their first occurrence.
    #[must_use]
    pub fn from_stored(user_id: UserId, stored: Revisioned<Vec<WishlistEntry>>) -> Self {
        let mut wishlist = Self::empty(user_id);
        for entry in stored.value {
            wishlist.insert(entry);
        }
        wishlist.revision = Some(stored.revision);
        wishlist
    }

    /// Load-or-empty helper for the toggle path.
    #[must_use]
    pub fn from_optional(user_id: UserId, stored: Option<Revisioned<Vec<WishlistEntry>>>) -> Self {
        stored.map_or_else(|| Self::empty(user_id), |s| Self::from_stored(user_id, s))
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.index.contains_key(&product_id)
    }

    /// Append an entry. Returns `false` if the product is already present.
    pub fn insert(&mut self, entry: WishlistEntry) -> bool {
        if self.contains(entry.product_id) {
            return false;
        }
        self.index.insert(entry.product_id, self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Remove the entry for `product_id`, preserving the order of the rest.
    pub fn remove(&mut self, product_id: ProductId) -> Option<WishlistEntry> {
        let position = self.index.remove(&product_id)?;
        let removed = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn revision(&self) -> Option<i64> {
        self.revision
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_response(self) -> api::Wishlist {
        api::Wishlist {
            user_id: self.user_id,
            products: self.entries,
        }
    }
}
