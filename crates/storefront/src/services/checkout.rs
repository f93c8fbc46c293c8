//! Checkout: turn the current cart into a placed order.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use shopzify_core::UserId;
use shopzify_core::api::{Checkout, ShippingAddress};

use super::MAX_WRITE_ATTEMPTS;
use crate::config::PricingConfig;
use crate::db::{CartRepository, CheckoutRepository, NewCheckout, Repositories, RepositoryError};
use crate::models::Cart;

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    /// Address fields that were left blank.
    #[error("Address is incomplete: {}", .0.join(", "))]
    IncompleteAddress(Vec<&'static str>),

    #[error("Cart was modified concurrently, please try again")]
    Conflict,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout operations over the repositories.
pub struct CheckoutService<'a> {
    carts: &'a dyn CartRepository,
    checkouts: &'a dyn CheckoutRepository,
    pricing: &'a PricingConfig,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories, pricing: &'a PricingConfig) -> Self {
        Self {
            carts: repos.carts.as_ref(),
            checkouts: repos.checkouts.as_ref(),
            pricing,
        }
    }

    /// Snapshot the cart into an order and empty the cart.
    ///
    /// The cart is emptied with a revision-checked write before the order is
    /// recorded, so two concurrent checkouts cannot both claim the same items.
    /// If recording fails the items are put back.
    ///
    /// # Errors
    ///
    /// - `IncompleteAddress` if any address field is blank.
    /// - `EmptyCart` if there is nothing to order.
    /// - `Conflict` if every attempt to claim the cart lost to a concurrent writer.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn place(
        &self,
        user_id: UserId,
        address: &ShippingAddress,
    ) -> Result<Checkout, CheckoutError> {
        let blank = address.blank_fields();
        if !blank.is_empty() {
            return Err(CheckoutError::IncompleteAddress(blank));
        }

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let cart = Cart::from_optional(user_id, self.carts.get(user_id).await?);
            if cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }

            let cleared_revision = match self.carts.save(user_id, &[], cart.revision()).await {
                Ok(revision) => revision,
                Err(RepositoryError::Conflict(reason)) => {
                    tracing::debug!(attempt, %reason, "Checkout lost the cart to a concurrent write");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let summary = cart.summary(self.pricing);
            let recorded = self
                .checkouts
                .create(NewCheckout {
                    user_id,
                    products: cart.items(),
                    address,
                    summary: &summary,
                    created_at: Utc::now(),
                })
                .await;

            return match recorded {
                Ok(checkout) => {
                    tracing::info!(checkout_id = %checkout.id, total = %summary.total_amount, "Order placed");
                    Ok(checkout)
                }
                Err(e) => {
                    if let Err(restore) = self
                        .carts
                        .save(user_id, cart.items(), Some(cleared_revision))
                        .await
                    {
                        tracing::error!(error = %restore, "Failed to restore cart after checkout error");
                    }
                    Err(e.into())
                }
            };
        }

        Err(CheckoutError::Conflict)
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the orders cannot be read.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Checkout>, CheckoutError> {
        Ok(self.checkouts.list(user_id).await?)
    }
}
