//! HTTP transport with access-token handling.
//!
//! Requests carry the session's access token as a bearer header. A 401 leads
//! to one refresh through the `auth/refresh` endpoint, which authenticates
//! with the session cookie held by the cookie store, and one retry with the
//! new token. Concurrent 401s are serialized on a gate so only the first one
//! refreshes; the rest see that the session epoch moved and reuse its result.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

use shopzify_core::api::{AccessTokenResponse, ErrorBody};

use crate::cache::{CacheKey, QueryCache, Tag};
use crate::error::ClientError;
use crate::session::AuthSession;

/// Client for the storefront API.
///
/// Cheap to clone; clones share the cookie store, session and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    session: AuthSession,
    refresh_gate: Mutex<()>,
    cache: QueryCache,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base,
                session: AuthSession::new(),
                refresh_gate: Mutex::new(()),
                cache: QueryCache::new(),
            }),
        })
    }

    /// The authentication state shared by all clones.
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.inner.session
    }

    pub(crate) fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Cached `GET` of `path` under `tag`.
    pub(crate) async fn query<T: DeserializeOwned>(
        &self,
        tag: Tag,
        path: String,
    ) -> Result<T, ClientError> {
        let key = CacheKey { tag, path };
        if let Some(hit) = self.inner.cache.get(&key).await {
            debug!(path = %key.path, "Cache hit");
            return Ok(serde_json::from_value(hit)?);
        }

        let value = self.execute(&Method::GET, &key.path, None).await?;
        let typed = serde_json::from_value(value.clone())?;
        self.inner.cache.insert(key, value).await;
        Ok(typed)
    }

    /// Authenticated request, then invalidate `tags` on success.
    pub(crate) async fn mutate<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        tags: &[Tag],
    ) -> Result<T, ClientError> {
        let value = self.execute(&method, path, body.as_ref()).await?;
        self.inner.cache.invalidate_tags(tags).await;
        Ok(serde_json::from_value(value)?)
    }

    /// Request without a bearer token and without the refresh-and-retry
    /// step. Used for the auth endpoints themselves.
    pub(crate) async fn public<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let response = self.send(&Method::POST, path, body.as_ref(), None).await?;
        Ok(serde_json::from_value(decode(response).await?)?)
    }

    /// Send with the current token; on 401 refresh once and retry once.
    #[instrument(skip(self, method, body), fields(method = %method))]
    async fn execute(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let (token, epoch) = self.inner.session.snapshot().await;
        let response = self.send(method, path, body, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        let Some(token) = self.reauthenticate(epoch).await else {
            return decode(response).await;
        };

        debug!("Retrying with refreshed token");
        let retry = self.send(method, path, body, Some(&token)).await?;
        decode(retry).await
    }

    /// Obtain a token newer than the one seen at `epoch`.
    ///
    /// Returns `None` when the session ended up anonymous.
    async fn reauthenticate(&self, epoch: u64) -> Option<String> {
        let _gate = self.inner.refresh_gate.lock().await;

        let (current, now) = self.inner.session.snapshot().await;
        if now != epoch {
            debug!("Token already replaced by another request");
            return current;
        }

        self.refresh_locked().await.ok()
    }

    /// Refresh the access token. Caller holds the refresh gate.
    async fn refresh_locked(&self) -> Result<String, ClientError> {
        let result = async {
            let response = self
                .send(&Method::POST, "auth/refresh", None, None)
                .await?;
            let body: AccessTokenResponse = serde_json::from_value(decode(response).await?)?;
            Ok::<_, ClientError>(body.access_token)
        }
        .await;

        match result {
            Ok(token) => {
                debug!("Access token refreshed");
                self.inner.session.set_token(token.clone()).await;
                Ok(token)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, signing out");
                self.inner.session.clear().await;
                self.inner.cache.invalidate_all().await;
                Err(err)
            }
        }
    }

    /// Refresh the access token from the session cookie.
    ///
    /// On failure the session becomes anonymous.
    ///
    /// # Errors
    ///
    /// Returns the refresh endpoint's error, typically a 401 when the
    /// session cookie is missing or expired.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let _gate = self.inner.refresh_gate.lock().await;
        self.refresh_locked().await.map(|_| ())
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.inner.base.join(path)?;
        let mut request = self.inner.http.request(method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

/// Turn a response into its JSON body or an [`ClientError::Api`].
async fn decode(response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text)?);
    }

    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| {
        debug!(%status, "Error response without a JSON body");
        ErrorBody::default()
    });
    Err(ClientError::Api { status, body })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Json;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};
    use serde_json::json;
    use tokio::task::JoinSet;

    use shopzify_core::api::{ProductRef, ToggleWishlistRequest};
    use shopzify_core::types::ProductId;

    use super::*;
    use crate::test_support::spawn;

    #[derive(Default)]
    struct Hits {
        refresh: AtomicUsize,
        toggle: AtomicUsize,
    }

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    async fn toggle_requires_fresh(
        State(hits): State<Arc<Hits>>,
        headers: HeaderMap,
    ) -> (AxumStatus, Json<Value>) {
        hits.toggle.fetch_add(1, Ordering::SeqCst);
        if bearer(&headers) == Some("fresh") {
            (
                AxumStatus::OK,
                Json(json!({"message": "Product added to wishlist"})),
            )
        } else {
            (AxumStatus::UNAUTHORIZED, Json(json!({"message": "Unauthorized"})))
        }
    }

    async fn refresh_ok(State(hits): State<Arc<Hits>>) -> Json<Value> {
        hits.refresh.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Json(json!({"accessToken": "fresh"}))
    }

    async fn refresh_rejected(State(hits): State<Arc<Hits>>) -> (AxumStatus, Json<Value>) {
        hits.refresh.fetch_add(1, Ordering::SeqCst);
        (
            AxumStatus::UNAUTHORIZED,
            Json(json!({"message": "Session expired, please log in again"})),
        )
    }

    async fn always_unauthorized(State(hits): State<Arc<Hits>>) -> (AxumStatus, Json<Value>) {
        hits.toggle.fetch_add(1, Ordering::SeqCst);
        (AxumStatus::UNAUTHORIZED, Json(json!({"message": "Unauthorized"})))
    }

    fn toggle_request() -> ToggleWishlistRequest {
        ToggleWishlistRequest {
            product: ProductRef {
                id: Some(ProductId::new(1)),
                product_id: None,
            },
            is_wish_list: None,
        }
    }

    #[tokio::test]
    async fn test_concurrent_unauthorized_requests_share_one_refresh() {
        let hits = Arc::new(Hits::default());
        let router = axum::Router::new()
            .route("/user-wishlist/wishlist/toggle", post(toggle_requires_fresh))
            .route("/auth/refresh", post(refresh_ok))
            .with_state(Arc::clone(&hits));
        let client = ApiClient::new(&spawn(router).await).unwrap();
        client.session().set_token("stale").await;

        let mut tasks = JoinSet::new();
        for _ in 0..5 {
            let client = client.clone();
            tasks.spawn(async move { client.toggle_wishlist(&toggle_request()).await });
        }
        while let Some(joined) = tasks.join_next().await {
            let response = joined.unwrap().unwrap();
            assert_eq!(response.message, "Product added to wishlist");
        }

        assert_eq!(hits.refresh.load(Ordering::SeqCst), 1);
        assert_eq!(
            client.session().state().await,
            crate::AuthState::Authenticated {
                access_token: "fresh".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_signs_out_and_returns_original_401() {
        let hits = Arc::new(Hits::default());
        let router = axum::Router::new()
            .route("/user-wishlist/wishlist/toggle", post(toggle_requires_fresh))
            .route("/auth/refresh", post(refresh_rejected))
            .with_state(Arc::clone(&hits));
        let client = ApiClient::new(&spawn(router).await).unwrap();
        client.session().set_token("stale").await;

        let err = client.toggle_wishlist(&toggle_request()).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.user_message().0, "Unauthorized");
        assert!(!client.session().is_authenticated().await);
        assert_eq!(hits.refresh.load(Ordering::SeqCst), 1);
        assert_eq!(hits.toggle.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_is_retried_only_once() {
        let hits = Arc::new(Hits::default());
        let router = axum::Router::new()
            .route("/user-wishlist/wishlist/toggle", post(always_unauthorized))
            .route("/auth/refresh", post(refresh_ok))
            .with_state(Arc::clone(&hits));
        let client = ApiClient::new(&spawn(router).await).unwrap();
        client.session().set_token("stale").await;

        let err = client.toggle_wishlist(&toggle_request()).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(hits.toggle.load(Ordering::SeqCst), 2);
        assert_eq!(hits.refresh.load(Ordering::SeqCst), 1);
        // The refresh itself succeeded, so the session keeps the new token
        assert!(client.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_queries_are_cached_until_a_mutation_invalidates_them() {
        let hits = Arc::new(Hits::default());
        let router = axum::Router::new()
            .route(
                "/nav-menu/menus",
                get(|State(hits): State<Arc<Hits>>| async move {
                    hits.toggle.fetch_add(1, Ordering::SeqCst);
                    Json(json!([{"label": "men", "sublabels": ["shirts"]}]))
                }),
            )
            .with_state(Arc::clone(&hits));
        let client = ApiClient::new(&spawn(router).await).unwrap();

        let first = client.menus().await.unwrap();
        let second = client.menus().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(hits.toggle.load(Ordering::SeqCst), 1);

        client.cache().invalidate_tags(&[Tag::Navbar]).await;
        client.menus().await.unwrap();
        assert_eq!(hits.toggle.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_json_error_body_uses_fallback_message() {
        let router = axum::Router::new().route(
            "/nav-menu/menus",
            get(|| async { (AxumStatus::BAD_GATEWAY, "upstream down") }),
        );
        let client = ApiClient::new(&spawn(router).await).unwrap();

        let err = client.menus().await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.user_message().0, crate::FALLBACK_MESSAGE);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            client.inner.base.join("product").unwrap().as_str(),
            "http://localhost:3000/api/product"
        );
    }
}
