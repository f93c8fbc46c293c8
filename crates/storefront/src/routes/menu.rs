//! Navigation menu handler.

use axum::{Json, extract::State};

use shopzify_core::api::MenuItem;

use crate::error::Result;
use crate::state::AppState;

/// Menu entries in display order.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>> {
    Ok(Json(state.repos().menus.list().await?))
}
