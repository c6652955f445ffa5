//! Read-only product catalog.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::db::{Product, ProductResponse};
use crate::AppState;

/// List all products
///
/// GET /products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products: Vec<Product> = sqlx::query_as(
        "SELECT products_id, products_name, products_description, products_price, \
         products_blob_images FROM products",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Error al obtener los productos");
        ApiError::store()
    })?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}
