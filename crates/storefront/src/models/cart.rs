//! Cart domain type and summary arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};

use shopzify_core::api::{CartItem, CartProducts, CartResponse, CartSummary, Product, WishlistEntry};
use shopzify_core::{ProductId, UserId};

use crate::config::PricingConfig;
use crate::db::Revisioned;

/// A user's cart: ordered items and the revision they were loaded at.
#[derive(Debug, Clone)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    revision: Option<i64>,
}

impl Cart {
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            revision: None,
        }
    }

    #[must_use]
    pub fn from_optional(user_id: UserId, stored: Option<Revisioned<Vec<CartItem>>>) -> Self {
        match stored {
            Some(stored) => Self {
                user_id,
                items: stored.value,
                revision: Some(stored.revision),
            },
            None => Self::empty(user_id),
        }
    }

    /// Units of `product_id` currently in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> i32 {
        self.items
            .iter()
            .find(|item| item.product.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Set the quantity of `product`, appending a fresh snapshot if absent.
    pub fn set_quantity(&mut self, product: &Product, quantity: i32) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.product_id == product.id)
        {
            item.quantity = quantity;
        } else {
            self.items.push(CartItem {
                product: WishlistEntry::from(product),
                quantity,
            });
        }
    }

    /// Take one unit of `product_id` out, dropping the line at zero.
    ///
    /// Returns the remaining quantity, or `None` if the product is not in the cart.
    pub fn decrement(&mut self, product_id: ProductId) -> Option<i32> {
        let position = self
            .items
            .iter()
            .position(|item| item.product.product_id == product_id)?;

        let remaining = self.items.get(position).map(|item| item.quantity - 1)?;
        if remaining <= 0 {
            self.items.remove(position);
        } else if let Some(item) = self.items.get_mut(position) {
            item.quantity = remaining;
        }
        Some(remaining.max(0))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
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
    pub fn summary(&self, pricing: &PricingConfig) -> CartSummary {
        summarize(&self.items, pricing)
    }

    #[must_use]
    pub fn into_response(self, pricing: &PricingConfig) -> CartResponse {
        let summary = self.summary(pricing);
        CartResponse {
            cart: CartProducts {
                products: self.items,
            },
            summary,
        }
    }
}

/// Totals for `items` under `pricing`, rounded to cents.
#[must_use]
pub fn summarize(items: &[CartItem], pricing: &PricingConfig) -> CartSummary {
    let mut total_mrp = Decimal::ZERO;
    let mut subtotal = Decimal::ZERO;
    let mut item_count = 0;

    for item in items {
        let quantity = Decimal::from(item.quantity);
        total_mrp += item.product.original_price * quantity;
        subtotal += item.product.discounted_price * quantity;
        item_count += item.quantity;
    }

    let tax_charge = round_cents(subtotal * pricing.tax_rate);
    let shipping_charge = if items.is_empty() || subtotal >= pricing.free_shipping_threshold {
        Decimal::ZERO
    } else {
        pricing.shipping_charge
    };

    CartSummary {
        total_mrp: round_cents(total_mrp),
        subtotal: round_cents(subtotal),
        discount: round_cents(total_mrp - subtotal),
        tax_charge,
        shipping_charge: round_cents(shipping_charge),
        total_amount: round_cents(subtotal + tax_charge + shipping_charge),
        item_count,
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(id: i32, discounted: i64, original: i64) -> Product {
        Product {
            id: ProductId::new(id),
            image: String::new(),
            name: format!("Product {id}"),
            discounted_price: Decimal::from(discounted),
            original_price: Decimal::from(original),
            description: String::new(),
            quantity: 10,
            gender: "female".to_owned(),
            category: "dresses".to_owned(),
            status: true,
            badge: None,
            record_date: Utc::now(),
        }
    }

    #[test]
    fn test_set_quantity_appends_then_updates() {
        let mut cart = Cart::empty(UserId::new(1));
        let p = product(1, 100, 150);
        cart.set_quantity(&p, 1);
        cart.set_quantity(&p, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(p.id), 3);
    }

    #[test]
    fn test_decrement_removes_at_zero() {
        let mut cart = Cart::empty(UserId::new(1));
        let p = product(1, 100, 150);
        cart.set_quantity(&p, 2);

        assert_eq!(cart.decrement(p.id), Some(1));
        assert_eq!(cart.decrement(p.id), Some(0));
        assert!(cart.is_empty());
        assert_eq!(cart.decrement(p.id), None);
    }

    #[test]
    fn test_summary_below_free_shipping() {
        let mut cart = Cart::empty(UserId::new(1));
        cart.set_quantity(&product(1, 200, 250), 2);
        cart.set_quantity(&product(2, 99, 99), 1);

        let summary = cart.summary(&PricingConfig::default());
        assert_eq!(summary.total_mrp, Decimal::from(599));
        assert_eq!(summary.subtotal, Decimal::from(499));
        assert_eq!(summary.discount, Decimal::from(100));
        assert_eq!(summary.tax_charge, Decimal::new(2495, 2));
        assert_eq!(summary.shipping_charge, Decimal::from(50));
        assert_eq!(summary.total_amount, Decimal::new(57_395, 2));
        assert_eq!(summary.item_count, 3);
    }

    #[test]
    fn test_summary_free_shipping_at_threshold() {
        let mut cart = Cart::empty(UserId::new(1));
        cart.set_quantity(&product(1, 500, 600), 2);

        let summary = cart.summary(&PricingConfig::default());
        assert_eq!(summary.subtotal, Decimal::from(1000));
        assert_eq!(summary.shipping_charge, Decimal::ZERO);
        assert_eq!(summary.total_amount, Decimal::from(1050));
    }

    #[test]
    fn test_summary_empty_cart_is_zero() {
        let summary = Cart::empty(UserId::new(1)).summary(&PricingConfig::default());
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert_eq!(summary.shipping_charge, Decimal::ZERO);
        assert_eq!(summary.item_count, 0);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        let mut cart = Cart::empty(UserId::new(1));
        let mut p = product(1, 0, 0);
        p.discounted_price = Decimal::new(130, 2);
        p.original_price = Decimal::new(130, 2);
        cart.set_quantity(&p, 1);

        // 1.30 * 0.05 = 0.065
        let summary = cart.summary(&PricingConfig::default());
        assert_eq!(summary.tax_charge, Decimal::new(7, 2));
    }
}
