//! Optimistic wishlist state.
//!
//! A toggle is applied to the local list right away and confirmed or undone
//! once the server answers. The list only becomes server truth again after
//! [`WishlistSync::refresh`] or [`WishlistSync::apply_server`].

use shopzify_core::api::{
    MessageResponse, Product, ProductRef, ToggleWishlistRequest, Wishlist, WishlistEntry,
};
use shopzify_core::types::ProductId;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::{ClientError, FALLBACK_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing message about the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub sub_message: Option<String>,
}

impl Notice {
    fn success(response: &MessageResponse) -> Self {
        let message = if response.message.is_empty() {
            FALLBACK_MESSAGE.to_owned()
        } else {
            response.message.clone()
        };
        Self {
            kind: NoticeKind::Success,
            message,
            sub_message: None,
        }
    }

    fn error(err: &ClientError) -> Self {
        let (message, sub_message) = err.user_message();
        Self {
            kind: NoticeKind::Error,
            message,
            sub_message,
        }
    }
}

/// A toggle applied locally but not yet confirmed.
#[derive(Debug, Clone)]
#[must_use = "pass the pending toggle to finish_toggle"]
pub struct PendingToggle {
    request: ToggleWishlistRequest,
    entry: WishlistEntry,
}

impl PendingToggle {
    /// Body to send to the toggle endpoint.
    #[must_use]
    pub const fn request(&self) -> &ToggleWishlistRequest {
        &self.request
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.entry.product_id
    }
}

/// Local wishlist plus the last list the server confirmed.
#[derive(Debug, Clone, Default)]
pub struct WishlistSync {
    items: Vec<WishlistEntry>,
    snapshot: Vec<WishlistEntry>,
    stale: bool,
}

/// Remove the entry for `entry`'s product if present, else append `entry`.
fn flip(list: &mut Vec<WishlistEntry>, entry: &WishlistEntry) {
    let before = list.len();
    list.retain(|e| e.product_id != entry.product_id);
    if list.len() == before {
        list.push(entry.clone());
    }
}

impl WishlistSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistEntry] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|e| e.product_id == id)
    }

    /// Whether a confirmed toggle happened since the last refresh.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Toggle a catalog product locally.
    pub fn begin_toggle(&mut self, product: &Product) -> PendingToggle {
        let request = ToggleWishlistRequest {
            product: ProductRef::from(product),
            is_wish_list: None,
        };
        self.begin(WishlistEntry::from(product), request)
    }

    /// Toggle an entry shown from the wishlist itself locally.
    pub fn begin_toggle_entry(&mut self, entry: &WishlistEntry) -> PendingToggle {
        let request = ToggleWishlistRequest {
            product: ProductRef::from(entry),
            is_wish_list: Some(true),
        };
        self.begin(entry.clone(), request)
    }

    fn begin(&mut self, entry: WishlistEntry, request: ToggleWishlistRequest) -> PendingToggle {
        flip(&mut self.items, &entry);
        PendingToggle { request, entry }
    }

    /// Settle a toggle with the server's answer.
    ///
    /// On success the confirmed change is folded into the snapshot. On
    /// failure the local list goes back to the snapshot.
    pub fn finish_toggle(
        &mut self,
        pending: PendingToggle,
        result: Result<MessageResponse, ClientError>,
    ) -> Notice {
        match result {
            Ok(response) => {
                flip(&mut self.snapshot, &pending.entry);
                self.stale = true;
                Notice::success(&response)
            }
            Err(err) => {
                debug!(product_id = %pending.entry.product_id, error = %err, "Wishlist toggle failed");
                self.items.clone_from(&self.snapshot);
                Notice::error(&err)
            }
        }
    }

    /// Replace local state with the server's wishlist.
    pub fn apply_server(&mut self, wishlist: Wishlist) {
        self.snapshot.clone_from(&wishlist.products);
        self.items = wishlist.products;
        self.stale = false;
    }

    /// Load the wishlist from the server. A user without one has an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Returns any error other than 404.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), ClientError> {
        match client.wishlist().await {
            Ok(wishlist) => {
                self.apply_server(wishlist);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                self.items.clear();
                self.snapshot.clear();
                self.stale = false;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Toggle a catalog product end to end.
    pub async fn toggle(&mut self, client: &ApiClient, product: &Product) -> Notice {
        let pending = self.begin_toggle(product);
        self.settle(client, pending).await
    }

    /// Toggle a wishlist entry end to end.
    pub async fn toggle_entry(&mut self, client: &ApiClient, entry: &WishlistEntry) -> Notice {
        let pending = self.begin_toggle_entry(entry);
        self.settle(client, pending).await
    }

    async fn settle(&mut self, client: &ApiClient, pending: PendingToggle) -> Notice {
        let result = client.toggle_wishlist(pending.request()).await;
        let notice = self.finish_toggle(pending, result);
        if self.stale
            && let Err(err) = self.refresh(client).await
        {
            warn!(error = %err, "Wishlist refresh failed");
        }
        notice
    }
}
