//! Cart rows and cart request types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cart row as returned by `GET /cart` (no row id).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub cart_product_name: String,
    pub cart_product_price: f64,
    pub cart_quantity: i64,
}

/// Cart row as returned by `GET /cart-items`, including the row id used by
/// the item mutation endpoints.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
    pub cart_id: i64,
    pub cart_product_name: String,
    pub cart_product_price: f64,
    pub cart_quantity: i64,
}

/// Body of `POST /add-to-cart`. Clients also send `products_id`, which is
/// not used for cart bookkeeping and is ignored on deserialization.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub products_name: Option<String>,
    pub products_price: Option<f64>,
}
