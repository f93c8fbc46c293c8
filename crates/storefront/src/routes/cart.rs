//! Cart route handlers.
//!
//! Every handler answers with the full cart and its summary so the client can
//! re-render from one response.

use axum::{Json, extract::State};
use tracing::instrument;

use shopzify_core::api::{CartRequest, CartResponse};

use crate::error::{AppJson, Result};
use crate::middleware::RequireUser;
use crate::services::cart::CartService;
use crate::state::AppState;

#[instrument(skip_all, fields(user_id = %user_id, product_id = %request.product.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    AppJson(request): AppJson<CartRequest>,
) -> Result<Json<CartResponse>> {
    let quantity = request.product.quantity.unwrap_or(1);
    let cart = CartService::new(state.repos())
        .add(user_id, request.product.product_id, quantity)
        .await?;
    Ok(Json(cart.into_response(state.pricing())))
}

#[instrument(skip_all, fields(user_id = %user_id, product_id = %request.product.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    AppJson(request): AppJson<CartRequest>,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.repos())
        .remove_one(user_id, request.product.product_id)
        .await?;
    Ok(Json(cart.into_response(state.pricing())))
}

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.repos()).clear(user_id).await?;
    Ok(Json(cart.into_response(state.pricing())))
}

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.repos()).get(user_id).await?;
    Ok(Json(cart.into_response(state.pricing())))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use rust_decimal::Decimal;

    use shopzify_core::api::ErrorBody;

    use super::*;
    use crate::routes::test_support::{TestApp, get, json_request, read_json};

    #[tokio::test]
    async fn test_add_remove_clear() {
        let app = TestApp::new();
        let product = app.product("Tee", "male", "tops").await;
        let token = app.login("ada@example.com").await;

        let empty: CartResponse = read_json(app.send(get("/user-cart/carts", Some(&token))).await).await;
        assert!(empty.cart.products.is_empty());
        assert_eq!(empty.summary.shipping_charge, Decimal::ZERO);

        let add = json_request(
            "POST",
            "/user-cart/post/cart",
            Some(&token),
            &serde_json::json!({"product": {"productId": product.id, "quantity": 2}}),
        );
        let cart: CartResponse = read_json(app.send(add).await).await;
        assert_eq!(cart.cart.products[0].quantity, 2);
        assert_eq!(cart.summary.subtotal, Decimal::from(900));
        assert_eq!(cart.summary.total_mrp, Decimal::from(1000));
        assert_eq!(cart.summary.discount, Decimal::from(100));
        assert_eq!(cart.summary.tax_charge, Decimal::from(45));
        assert_eq!(cart.summary.shipping_charge, Decimal::from(50));
        assert_eq!(cart.summary.total_amount, Decimal::from(995));
        assert_eq!(cart.summary.item_count, 2);

        let remove = json_request(
            "POST",
            "/user-cart/remove/cart",
            Some(&token),
            &serde_json::json!({"product": {"productId": product.id}}),
        );
        let cart: CartResponse = read_json(app.send(remove).await).await;
        assert_eq!(cart.cart.products[0].quantity, 1);

        let clear = Request::builder()
            .method("PUT")
            .uri("/user-cart/delete/cart")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let cart: CartResponse = read_json(app.send(clear).await).await;
        assert!(cart.cart.products.is_empty());
    }

    #[tokio::test]
    async fn test_stock_limit_is_a_validation_error() {
        let app = TestApp::new();
        let product = app.product("Tee", "male", "tops").await;
        let token = app.login("ada@example.com").await;

        let add = json_request(
            "POST",
            "/user-cart/post/cart",
            Some(&token),
            &serde_json::json!({"product": {"productId": product.id, "quantity": 4}}),
        );
        let response = app.send(add).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.message, "Only 3 left in stock");
    }

    #[tokio::test]
    async fn test_removing_absent_item() {
        let app = TestApp::new();
        let token = app.login("ada@example.com").await;
        let remove = json_request(
            "POST",
            "/user-cart/remove/cart",
            Some(&token),
            &serde_json::json!({"product": {"productId": 5}}),
        );
        let response = app.send(remove).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.message, "Product not in cart");
    }
}
