//! Product rows and their transport representation.

use serde::Serialize;
use sqlx::FromRow;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub products_id: i64,
    pub products_name: String,
    pub products_description: Option<String>,
    pub products_price: f64,
    pub products_blob_images: Option<Vec<u8>>,
}

/// Product with the image BLOB encoded for JSON transport. An absent image
/// serializes as `null`, never as an empty string.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub products_id: i64,
    pub products_name: String,
    pub products_description: Option<String>,
    pub products_price: f64,
    pub products_blob_images: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            products_id: product.products_id,
            products_name: product.products_name,
            products_description: product.products_description,
            products_price: product.products_price,
            products_blob_images: product
                .products_blob_images
                .map(|blob| BASE64.encode(blob)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(image: Option<Vec<u8>>) -> Product {
        Product {
            products_id: 1,
            products_name: "Txapela".to_string(),
            products_description: Some("Wool beret".to_string()),
            products_price: 24.5,
            products_blob_images: image,
        }
    }

    #[test]
    fn image_is_base64_encoded() {
        let resp = ProductResponse::from(product(Some(vec![0xde, 0xad, 0xbe, 0xef])));
        assert_eq!(resp.products_blob_images.as_deref(), Some("3q2+7w=="));
    }

    #[test]
    fn missing_image_stays_null() {
        let resp = ProductResponse::from(product(None));
        assert_eq!(resp.products_blob_images, None);

        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["products_blob_images"].is_null());
    }
}
