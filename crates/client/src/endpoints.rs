//! Typed storefront endpoints.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use shopzify_core::api::{
    AccessTokenResponse, CartProductRef, CartRequest, CartResponse, Checkout, CheckoutCreated,
    CheckoutRequest, LoginRequest, MenuItem, MessageResponse, NavProducts, NewProduct, Product,
    ProductList, ProductPatch, ShippingAddress, SignupRequest, ToggleWishlistRequest, Wishlist,
    WishlistResponse,
};
use shopzify_core::types::{Email, Password, ProductId};

use crate::cache::Tag;
use crate::client::ApiClient;
use crate::error::ClientError;

/// Tags that show catalog data.
const CATALOG: &[Tag] = &[Tag::Product, Tag::Search];

fn with_limit(path: &str, limit: Option<i64>) -> String {
    match limit {
        Some(limit) => format!("{path}?limit={limit}"),
        None => path.to_owned(),
    }
}

impl ApiClient {
    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Active products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products(&self, limit: Option<i64>) -> Result<ProductList, ClientError> {
        self.query(Tag::Product, with_limit("product", limit)).await
    }

    /// Every product, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn admin_products(&self, limit: Option<i64>) -> Result<ProductList, ClientError> {
        self.query(Tag::Product, with_limit("product/admin/products", limit))
            .await
    }

    /// Free-text product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn search(&self, key: &str) -> Result<Vec<Product>, ClientError> {
        self.query(
            Tag::Search,
            format!("product/search/{}", urlencoding::encode(key)),
        )
        .await
    }

    /// Active products whose category contains `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products_by_category(&self, key: &str) -> Result<Vec<Product>, ClientError> {
        self.query(
            Tag::Product,
            format!("product/category/{}", urlencoding::encode(key)),
        )
        .await
    }

    /// Products behind a navigation menu entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn nav_products(
        &self,
        menu: &str,
        sublabel: Option<&str>,
    ) -> Result<NavProducts, ClientError> {
        let path = format!(
            "product/nav/{}/{}",
            urlencoding::encode(menu),
            urlencoding::encode(sublabel.unwrap_or("undefined"))
        );
        self.query(Tag::Product, path).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the product is invalid.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ClientError> {
        let body = serde_json::to_value(product)?;
        self.mutate(Method::POST, "product", Some(body), CATALOG)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ClientError> {
        let body = serde_json::to_value(patch)?;
        self.mutate(Method::PATCH, &format!("product/{id}"), Some(body), CATALOG)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<MessageResponse, ClientError> {
        self.mutate(Method::DELETE, &format!("product/{id}"), None, CATALOG)
            .await
    }

    /// Navigation menus in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn menus(&self) -> Result<Vec<MenuItem>, ClientError> {
        self.query(Tag::Navbar, "nav-menu/menus".to_owned()).await
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    /// The signed-in user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ClientError::Api`] if the user never toggled a
    /// product.
    pub async fn wishlist(&self) -> Result<Wishlist, ClientError> {
        let response: WishlistResponse = self
            .query(Tag::Wishlist, "user-wishlist/wishlists".to_owned())
            .await?;
        Ok(response.wishlist)
    }

    /// Add or remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    #[instrument(skip(self, request))]
    pub async fn toggle_wishlist(
        &self,
        request: &ToggleWishlistRequest,
    ) -> Result<MessageResponse, ClientError> {
        let body = serde_json::to_value(request)?;
        self.mutate(
            Method::POST,
            "user-wishlist/wishlist/toggle",
            Some(body),
            &[Tag::Wishlist],
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cart(&self) -> Result<CartResponse, ClientError> {
        self.query(Tag::Cart, "user-cart/carts".to_owned()).await
    }

    /// Add `quantity` units (default 1) of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product is out of stock.
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: Option<i32>,
    ) -> Result<CartResponse, ClientError> {
        let body = serde_json::to_value(CartRequest {
            product: CartProductRef {
                product_id,
                quantity,
            },
        })?;
        self.mutate(Method::POST, "user-cart/post/cart", Some(body), &[Tag::Cart])
            .await
    }

    /// Remove one unit of a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product is not in the
    /// cart.
    pub async fn remove_from_cart(
        &self,
        product_id: ProductId,
    ) -> Result<CartResponse, ClientError> {
        let body = serde_json::to_value(CartRequest {
            product: CartProductRef {
                product_id,
                quantity: None,
            },
        })?;
        self.mutate(Method::POST, "user-cart/remove/cart", Some(body), &[Tag::Cart])
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clear_cart(&self) -> Result<CartResponse, ClientError> {
        self.mutate(Method::PUT, "user-cart/delete/cart", None, &[Tag::Cart])
            .await
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without sending anything when an
    /// address field is blank, otherwise the server's error.
    pub async fn place_checkout(
        &self,
        address: &ShippingAddress,
    ) -> Result<CheckoutCreated, ClientError> {
        let blank = address.blank_fields();
        if !blank.is_empty() {
            return Err(ClientError::Validation(format!(
                "Please complete the shipping address: {}",
                blank.join(", ")
            )));
        }

        let body = serde_json::to_value(CheckoutRequest {
            address: address.clone(),
        })?;
        self.mutate(
            Method::POST,
            "user-checkout/post/checkout",
            Some(body),
            &[Tag::Checkout, Tag::Cart],
        )
        .await
    }

    /// Past orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn checkouts(&self) -> Result<Vec<Checkout>, ClientError> {
        self.query(Tag::Checkout, "user-checkout/get/checkout".to_owned())
            .await
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    /// Register a new account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a blank name, malformed email
    /// or short password, otherwise the server's error.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<MessageResponse, ClientError> {
        if name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".to_owned()));
        }
        validate_credentials(email, password)?;

        let body = serde_json::to_value(SignupRequest {
            name: name.trim().to_owned(),
            email: email.trim().to_owned(),
            password: password.to_owned(),
        })?;
        self.public("auth/signup", Some(body)).await
    }

    /// Sign in and store the access token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for malformed input, otherwise the
    /// server's error (401 for wrong credentials).
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        validate_credentials(email, password)?;

        let body = serde_json::to_value(LoginRequest {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        })?;
        let response: AccessTokenResponse = self.public("auth/login", Some(body)).await?;

        self.session().set_token(response.access_token).await;
        self.cache().invalidate_all().await;
        Ok(())
    }

    /// Sign out. The local session is cleared even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let result = self.public("auth/logout", Some(json!({}))).await;
        self.session().clear().await;
        self.cache().invalidate_all().await;
        result
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ClientError> {
    Email::parse(email.trim()).map_err(|e| ClientError::Validation(e.to_string()))?;
    Password::parse(password).map_err(|e| ClientError::Validation(e.to_string()))?;
    Ok(())
}
