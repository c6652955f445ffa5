pub mod auth;
mod cart;
pub mod error;
mod products;
mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// JSON acknowledgement body, `{"status": "..."}`
#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
}

impl Ack {
    pub fn new(status: &'static str) -> Self {
        Self { status }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // One configured browser origin, cookies allowed
    let origin = state
        .config
        .cors
        .allowed_origin
        .parse::<HeaderValue>()
        .expect("Invalid CORS origin");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Auth
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logged_in", get(auth::logged_in))
        .route("/logout", get(auth::logout))
        // Catalog
        .route("/products", get(products::list_products))
        // Cart
        .route("/cart", get(cart::list_cart))
        .route("/add-to-cart", post(cart::add_to_cart))
        .route("/cart-items", get(cart::list_cart_items))
        .route("/cart-items/:id", delete(cart::remove_cart_item))
        .route(
            "/cart-items/increase-quantity/:id",
            put(cart::increase_quantity),
        )
        .route(
            "/cart-items/decrease-quantity/:id",
            put(cart::decrease_quantity),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared harness for handler tests: a real router over an in-memory
    //! SQLite pool, driven through `tower::ServiceExt::oneshot`.

    use axum::{
        body::Body,
        http::{header, Request, Response},
        Router,
    };
    use http_body_util::BodyExt;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::session::MemorySessionStore;
    use crate::AppState;

    pub async fn test_app() -> (Router, Arc<AppState>) {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::migrate(&db).await.unwrap();

        let state = Arc::new(AppState::new(
            Config::default(),
            db,
            Arc::new(MemorySessionStore::new()),
        ));
        (super::create_router(state.clone()), state)
    }

    pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    pub async fn put(app: &Router, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    /// Status code plus parsed JSON body.
    pub async fn response_json(response: Response<Body>) -> (u16, serde_json::Value) {
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    /// The `name=value` pair from the response's Set-Cookie header.
    pub fn session_cookie_from(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).to_string())
    }
}
