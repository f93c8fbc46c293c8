//! Catalog route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use shopzify_core::ProductId;
use shopzify_core::api::{
    ListQuery, MessageResponse, NavProducts, NewProduct, Product, ProductList, ProductPatch,
};

use crate::error::{AppJson, AppPath, AppQuery, Result};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

fn catalog(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(state.repos().products.as_ref())
}

/// Active products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<ProductList>> {
    let product_details = catalog(&state).list_active(query.limit).await?;
    Ok(Json(ProductList { product_details }))
}

/// Every product, including inactive ones.
#[instrument(skip(state))]
pub async fn admin_index(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<ProductList>> {
    let product_details = catalog(&state).list_all(query.limit).await?;
    Ok(Json(ProductList { product_details }))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog(&state).search(&key).await?))
}

#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog(&state).by_category(&key).await?))
}

#[instrument(skip(state))]
pub async fn nav(
    State(state): State<AppState>,
    AppPath((menu, sublabel)): AppPath<(String, String)>,
) -> Result<Json<NavProducts>> {
    let products = catalog(&state).by_nav(&menu, &sublabel).await?;
    Ok(Json(NavProducts { products }))
}

#[instrument(skip_all, fields(name = %product.name))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(product): AppJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let created = catalog(&state).create(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
    AppJson(patch): AppJson<ProductPatch>,
) -> Result<Json<Product>> {
    Ok(Json(catalog(&state).update(id, patch).await?))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    catalog(&state).delete(id).await?;
    Ok(Json(MessageResponse::new("Deleted Product")))
}
