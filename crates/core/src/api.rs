//! JSON wire types shared by the storefront API and the client.
//!
//! Field names are camelCase on the wire. Product ids serialize as `_id` on
//! catalog records and as `productId` on wishlist and cart snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CheckoutId, ProductId, UserId};

// =============================================================================
// Catalog
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub image: String,
    pub name: String,
    pub discounted_price: Decimal,
    pub original_price: Decimal,
    pub description: String,
    /// Units in stock.
    pub quantity: i32,
    pub gender: String,
    pub category: String,
    /// Inactive products are hidden from the storefront listings.
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub record_date: DateTime<Utc>,
}

/// Body of `POST /product`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub image: String,
    pub name: String,
    pub discounted_price: Decimal,
    pub original_price: Decimal,
    pub description: String,
    pub quantity: i32,
    pub gender: String,
    pub category: String,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default)]
    pub badge: Option<String>,
}

const fn default_status() -> bool {
    true
}

/// Body of `PATCH /product/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Response of `GET /product` and `GET /product/admin/products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub product_details: Vec<Product>,
}

/// Response of `GET /product/nav/:menu/:sublabel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavProducts {
    pub products: Vec<Product>,
}

/// Query string for the product listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

// =============================================================================
// Wishlist
// =============================================================================

/// Denormalized product snapshot stored in a wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub discounted_price: Decimal,
    pub original_price: Decimal,
    pub description: String,
    pub category: String,
    pub gender: String,
}

impl From<&Product> for WishlistEntry {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            discounted_price: product.discounted_price,
            original_price: product.original_price,
            description: product.description.clone(),
            category: product.category.clone(),
            gender: product.gender.clone(),
        }
    }
}

/// A user's wishlist document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub user_id: UserId,
    pub products: Vec<WishlistEntry>,
}

/// Response of `GET /user-wishlist/wishlists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistResponse {
    pub wishlist: Wishlist,
}

/// The `product` field of a toggle request.
///
/// Catalog products carry their id as `_id`; wishlist entries carry it as
/// `productId`. Any other fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            product_id: None,
        }
    }
}

impl From<&WishlistEntry> for ProductRef {
    fn from(entry: &WishlistEntry) -> Self {
        Self {
            id: None,
            product_id: Some(entry.product_id),
        }
    }
}

/// Body of `POST /user-wishlist/wishlist/toggle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleWishlistRequest {
    pub product: ProductRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_wish_list: Option<bool>,
}

impl ToggleWishlistRequest {
    /// The product id this request refers to.
    ///
    /// Reads `productId` when the request comes from a wishlist entry and
    /// `_id` otherwise.
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        if self.is_wish_list.unwrap_or(false) {
            self.product.product_id
        } else {
            self.product.id
        }
    }
}

// =============================================================================
// Cart & checkout
// =============================================================================

/// A cart line: product snapshot plus quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: WishlistEntry,
    pub quantity: i32,
}

/// Computed totals for a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub total_mrp: Decimal,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax_charge: Decimal,
    pub shipping_charge: Decimal,
    pub total_amount: Decimal,
    pub item_count: i32,
}

/// The `cart` field of [`CartResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProducts {
    pub products: Vec<CartItem>,
}

/// Response of `GET /user-cart/carts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart: CartProducts,
    pub summary: CartSummary,
}

/// The `product` field of the cart add/remove requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductRef {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// Body of `POST /user-cart/post/cart` and `POST /user-cart/remove/cart`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartRequest {
    pub product: CartProductRef,
}

/// Where a checkout ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Names of the fields that are empty or whitespace.
    #[must_use]
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Body of `POST /user-checkout/post/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub address: ShippingAddress,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    #[serde(rename = "_id")]
    pub id: CheckoutId,
    pub user_id: UserId,
    pub products: Vec<CartItem>,
    pub address: ShippingAddress,
    pub summary: CartSummary,
    pub created_at: DateTime<Utc>,
}

/// Response of `POST /user-checkout/post/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCreated {
    pub message: String,
    pub checkout: Checkout,
}

// =============================================================================
// Navigation
// =============================================================================

/// A navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    #[serde(default)]
    pub sublabels: Vec<String>,
}

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login` and `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// =============================================================================
// Messages
// =============================================================================

/// A plain `{message}` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_message: Option<String>,
}
