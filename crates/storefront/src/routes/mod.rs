//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                            - Liveness
//! GET    /health/ready                      - Readiness (store reachable)
//!
//! # Auth
//! POST   /auth/signup                       - Register
//! POST   /auth/login                        - Start session, issue access token
//! POST   /auth/refresh                      - New access token from session cookie
//! POST   /auth/logout                       - End session
//!
//! # Catalog
//! GET    /product                           - Active products (?limit=)
//! POST   /product                           - Create product
//! GET    /product/admin/products            - All products (?limit=)
//! GET    /product/search/{key}              - Free-text search
//! GET    /product/category/{key}            - Category match
//! GET    /product/nav/{menu}/{sublabel}     - Navigation filter
//! PATCH  /product/{id}                      - Update product
//! DELETE /product/{id}                      - Delete product
//!
//! # Wishlist (bearer token)
//! POST   /user-wishlist/wishlist/toggle     - Add or remove a product
//! GET    /user-wishlist/wishlists           - Current wishlist
//!
//! # Cart (bearer token)
//! POST   /user-cart/post/cart               - Add a product
//! POST   /user-cart/remove/cart             - Remove one unit
//! PUT    /user-cart/delete/cart             - Empty the cart
//! GET    /user-cart/carts                   - Cart with summary
//!
//! # Checkout (bearer token)
//! POST   /user-checkout/post/checkout       - Place order
//! GET    /user-checkout/get/checkout        - Order history
//!
//! # Navigation
//! GET    /nav-menu/menus                    - Menu entries
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod menu;
pub mod product;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(product::index).post(product::create))
        .route("/admin/products", get(product::admin_index))
        .route("/search/{key}", get(product::search))
        .route("/category/{key}", get(product::category))
        .route("/nav/{menu}/{sublabel}", get(product::nav))
        .route("/{id}", patch(product::update).delete(product::delete))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist/toggle", post(wishlist::toggle))
        .route("/wishlists", get(wishlist::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/post/cart", post(cart::add))
        .route("/remove/cart", post(cart::remove))
        .route("/delete/cart", put(cart::clear))
        .route("/carts", get(cart::show))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/post/checkout", post(checkout::place))
        .route("/get/checkout", get(checkout::list))
}

/// Create all routes for the storefront except `/auth`, which the caller
/// nests so it can be rate limited separately.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/product", product_routes())
        .nest("/user-wishlist", wishlist_routes())
        .nest("/user-cart", cart_routes())
        .nest("/user-checkout", checkout_routes())
        .route("/nav-menu/menus", get(menu::list))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router and request helpers for handler tests.

    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore as SessionMemoryStore;

    use shopzify_core::api::{NewProduct, Product};

    use crate::config::{AuthConfig, PricingConfig};
    use crate::db::memory::MemoryStore;
    use crate::state::AppState;

    pub struct TestApp {
        pub router: Router,
        pub state: AppState,
    }

    impl TestApp {
        pub fn new() -> Self {
            let auth = AuthConfig::new(
                SecretString::from("k7#Qm2$vX9!pL4@wR8^nT3&bY6*cF1zJ"),
                Duration::from_secs(900),
            );
            let state = AppState::in_memory(
                &Arc::new(MemoryStore::new()),
                &auth,
                PricingConfig::default(),
            );
            let router = crate::app(state.clone(), SessionMemoryStore::default(), false, &[], false);
            Self { router, state }
        }

        pub async fn send(&self, request: Request<Body>) -> Response<Body> {
            self.router.clone().oneshot(request).await.unwrap()
        }

        pub async fn product(&self, name: &str, gender: &str, category: &str) -> Product {
            self.state
                .repos()
                .products
                .create(&NewProduct {
                    image: format!("{name}.png"),
                    name: name.to_owned(),
                    discounted_price: Decimal::from(450),
                    original_price: Decimal::from(500),
                    description: format!("{name} in cotton"),
                    quantity: 3,
                    gender: gender.to_owned(),
                    category: category.to_owned(),
                    status: true,
                    badge: None,
                })
                .await
                .unwrap()
        }

        /// Register and log in, returning the access token.
        pub async fn login(&self, email: &str) -> String {
            let signup = json_request(
                "POST",
                "/auth/signup",
                None,
                &serde_json::json!({"name": "Ada", "email": email, "password": "lovelace1815"}),
            );
            assert_eq!(self.send(signup).await.status(), StatusCode::CREATED);

            let login = json_request(
                "POST",
                "/auth/login",
                None,
                &serde_json::json!({"email": email, "password": "lovelace1815"}),
            );
            let body: serde_json::Value = read_json(self.send(login).await).await;
            body["accessToken"].as_str().unwrap().to_owned()
        }
    }

    pub fn json_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
