//! Wishlist route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use shopzify_core::api::{MessageResponse, ToggleWishlistRequest, WishlistResponse};

use crate::error::{AppJson, Result};
use crate::middleware::RequireUser;
use crate::services::wishlist::{WishlistError, WishlistService};
use crate::state::AppState;

/// Add the product if absent, remove it if present.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    AppJson(request): AppJson<ToggleWishlistRequest>,
) -> Result<Json<MessageResponse>> {
    let product_id = request
        .product_id()
        .ok_or(WishlistError::MissingProductId)?;

    let outcome = WishlistService::new(state.repos())
        .toggle(user_id, product_id)
        .await?;
    Ok(Json(MessageResponse::new(outcome.message())))
}

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<WishlistResponse>> {
    let wishlist = WishlistService::new(state.repos()).get(user_id).await?;
    Ok(Json(WishlistResponse {
        wishlist: wishlist.into_response(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use shopzify_core::api::ErrorBody;

    use super::*;
    use crate::routes::test_support::{TestApp, get, json_request, read_json};

    #[tokio::test]
    async fn test_requires_access_token() {
        let app = TestApp::new();
        let response = app.send(get("/user-wishlist/wishlists", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .send(get("/user-wishlist/wishlists", Some("not-a-token")))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let app = TestApp::new();
        let product = app.product("Tee", "male", "tops").await;
        let token = app.login("ada@example.com").await;

        let response = app.send(get("/user-wishlist/wishlists", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.message, "Wishlist not found");

        let add = json_request(
            "POST",
            "/user-wishlist/wishlist/toggle",
            Some(&token),
            &serde_json::json!({"product": {"_id": product.id}}),
        );
        let body: MessageResponse = read_json(app.send(add).await).await;
        assert_eq!(body.message, "Product added to wishlist");

        let response: WishlistResponse =
            read_json(app.send(get("/user-wishlist/wishlists", Some(&token))).await).await;
        assert_eq!(response.wishlist.products.len(), 1);
        assert_eq!(response.wishlist.products[0].product_id, product.id);

        // Removal from the wishlist page sends the entry, keyed by productId
        let remove = json_request(
            "POST",
            "/user-wishlist/wishlist/toggle",
            Some(&token),
            &serde_json::json!({"product": {"productId": product.id}, "isWishList": true}),
        );
        let body: MessageResponse = read_json(app.send(remove).await).await;
        assert_eq!(body.message, "Product removed from wishlist");

        let response: WishlistResponse =
            read_json(app.send(get("/user-wishlist/wishlists", Some(&token))).await).await;
        assert!(response.wishlist.products.is_empty());
    }

    #[tokio::test]
    async fn test_missing_id_and_unknown_product() {
        let app = TestApp::new();
        let token = app.login("ada@example.com").await;

        let missing = json_request(
            "POST",
            "/user-wishlist/wishlist/toggle",
            Some(&token),
            &serde_json::json!({"product": {"productId": 1}}),
        );
        assert_eq!(app.send(missing).await.status(), StatusCode::BAD_REQUEST);

        let unknown = json_request(
            "POST",
            "/user-wishlist/wishlist/toggle",
            Some(&token),
            &serde_json::json!({"product": {"_id": 42}}),
        );
        let response = app.send(unknown).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.message, "Product not found");
    }
}
