//! End-to-end tests for Shopzify.
//!
//! Each test starts the real storefront router on an ephemeral port, backed
//! by the in-memory store and in-memory sessions, and drives it through
//! `shopzify-client`. No database is needed:
//!
//! ```bash
//! cargo test -p shopzify-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore as SessionMemoryStore;

use shopzify_client::ApiClient;
use shopzify_core::api::{NewProduct, Product, ShippingAddress};
use shopzify_storefront::config::{AuthConfig, PricingConfig};
use shopzify_storefront::db::memory::MemoryStore;
use shopzify_storefront::state::AppState;

/// A storefront serving on `127.0.0.1`.
pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    /// Start a server with an empty store.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let auth = AuthConfig::new(
            SecretString::from("Zr8!uQ4#mW1$kE6^pT9&hB3*vN7@cX2y"),
            Duration::from_secs(900),
        );
        let state = AppState::in_memory(
            &Arc::new(MemoryStore::new()),
            &auth,
            PricingConfig::default(),
        );
        let router = shopzify_storefront::app(
            state,
            SessionMemoryStore::default(),
            false,
            &[],
            false,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve storefront");
        });

        Self {
            base_url: format!("http://{addr}/"),
        }
    }

    /// A fresh client with its own cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is invalid.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).expect("client")
    }

    /// A client that signed up and logged in as `email`.
    ///
    /// # Panics
    ///
    /// Panics if sign-up or login fails.
    pub async fn signed_in(&self, email: &str) -> ApiClient {
        let client = self.client();
        client
            .signup("Test Shopper", email, "correct-horse-battery")
            .await
            .expect("signup");
        client
            .login(email, "correct-horse-battery")
            .await
            .expect("login");
        client
    }
}

/// Create a product through the admin endpoint.
///
/// # Panics
///
/// Panics if the product is rejected.
pub async fn create_product(client: &ApiClient, name: &str, gender: &str, category: &str) -> Product {
    client
        .create_product(&NewProduct {
            image: format!("https://images.example.com/{category}.jpg"),
            name: name.to_owned(),
            discounted_price: Decimal::from(450),
            original_price: Decimal::from(500),
            description: format!("{name} made from organic cotton"),
            quantity: 5,
            gender: gender.to_owned(),
            category: category.to_owned(),
            status: true,
            badge: None,
        })
        .await
        .expect("create product")
}

/// A complete shipping address.
#[must_use]
pub fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Test Shopper".to_owned(),
        street: "12 Market Road".to_owned(),
        city: "Pune".to_owned(),
        state: "MH".to_owned(),
        postal_code: "411001".to_owned(),
        country: "IN".to_owned(),
        phone: "+91 98765 43210".to_owned(),
    }
}
