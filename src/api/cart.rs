//! Shopping cart handlers.
//!
//! The cart holds at most one row per distinct product name. Adding an
//! already-present product increments its quantity through a single
//! conditional upsert, so two concurrent adds for the same new product
//! cannot create duplicate rows.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::validation::require_field;
use crate::api::Ack;
use crate::db::{AddToCartRequest, CartItem, CartLine};
use crate::AppState;

/// List cart lines without row ids
///
/// GET /cart
pub async fn list_cart(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CartLine>>, ApiError> {
    let lines: Vec<CartLine> = sqlx::query_as(
        "SELECT cart_product_name, cart_product_price, cart_quantity FROM cart",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Error al obtener elementos del carrito");
        ApiError::store()
    })?;

    Ok(Json(lines))
}

/// List cart lines including the row id
///
/// GET /cart-items
pub async fn list_cart_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CartItem>>, ApiError> {
    let items: Vec<CartItem> = sqlx::query_as(
        "SELECT cart_id, cart_product_name, cart_product_price, cart_quantity FROM cart",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Error al obtener elementos del carrito");
        ApiError::store()
    })?;

    Ok(Json(items))
}

/// Add a product to the cart, incrementing the quantity if a line for the
/// product name already exists. The stored price is never re-synced from
/// the request once the line exists.
///
/// POST /add-to-cart
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<Ack>, ApiError> {
    let name = require_field(&request.products_name).ok_or_else(ApiError::missing_fields)?;
    let price = request.products_price.ok_or_else(ApiError::missing_fields)?;

    // Insert-or-increment in one statement; the UNIQUE constraint on the
    // product name makes this safe against concurrent identical requests.
    let (quantity,): (i64,) = sqlx::query_as(
        "INSERT INTO cart (cart_product_name, cart_product_price, cart_quantity) \
         VALUES (?, ?, 1) \
         ON CONFLICT(cart_product_name) DO UPDATE SET cart_quantity = cart_quantity + 1 \
         RETURNING cart_quantity",
    )
    .bind(name)
    .bind(price)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Error al agregar el producto al carrito");
        ApiError::store()
    })?;

    if quantity > 1 {
        Ok(Json(Ack::new("Quantity_updated")))
    } else {
        Ok(Json(Ack::new("Product_added_to_cart")))
    }
}

/// Remove a cart line by row id. Unknown ids are a no-op success.
///
/// DELETE /cart-items/:id
pub async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    sqlx::query("DELETE FROM cart WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error al eliminar el elemento del carrito");
            ApiError::store()
        })?;

    Ok(Json(Ack::new("Item_removed_from_cart")))
}

/// Increase a cart line's quantity by one. Unknown ids are a no-op success.
///
/// PUT /cart-items/increase-quantity/:id
pub async fn increase_quantity(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    sqlx::query("UPDATE cart SET cart_quantity = cart_quantity + 1 WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error al aumentar la cantidad del elemento del carrito");
            ApiError::store()
        })?;

    Ok(Json(Ack::new("Quantity_increased")))
}

/// Decrease a cart line's quantity by one. A line that reaches zero is
/// deleted, so clients never observe a zero or negative quantity. Both
/// statements run in one transaction.
///
/// PUT /cart-items/decrease-quantity/:id
pub async fn decrease_quantity(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    let mut tx = state.db.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Error al disminuir la cantidad del elemento del carrito");
        ApiError::store()
    })?;

    let result = async {
        sqlx::query("UPDATE cart SET cart_quantity = cart_quantity - 1 WHERE cart_id = ?")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cart WHERE cart_id = ? AND cart_quantity <= 0")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;
        Ok::<(), sqlx::Error>(())
    }
    .await;

    match result {
        Ok(()) => {
            tx.commit().await.map_err(|e| {
                tracing::error!(error = %e, "Error al disminuir la cantidad del elemento del carrito");
                ApiError::store()
            })?;
            Ok(Json(Ack::new("Quantity_decreased")))
        }
        Err(e) => {
            tracing::error!(error = %e, "Error al disminuir la cantidad del elemento del carrito");
            // Dropping the transaction rolls it back
            Err(ApiError::store())
        }
    }
}
