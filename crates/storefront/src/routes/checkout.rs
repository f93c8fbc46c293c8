//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use shopzify_core::api::{Checkout, CheckoutCreated, CheckoutRequest};

use crate::error::{AppJson, Result};
use crate::middleware::RequireUser;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    AppJson(request): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutCreated>)> {
    let checkout = CheckoutService::new(state.repos(), state.pricing())
        .place(user_id, &request.address)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutCreated {
            message: "Order placed successfully".to_owned(),
            checkout,
        }),
    ))
}

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<Checkout>>> {
    let checkouts = CheckoutService::new(state.repos(), state.pricing())
        .list(user_id)
        .await?;
    Ok(Json(checkouts))
}
