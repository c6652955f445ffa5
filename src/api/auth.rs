//! Registration, login, session check and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::validation::{require_field, validate_email};
use crate::api::Ack;
use crate::db::{LoginRequest, RegisterRequest, User, UserResponse};
use crate::session::SessionData;
use crate::AppState;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random session token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for use as the session store key
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Register endpoint
///
/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Ack>), ApiError> {
    let name = require_field(&request.users_name).ok_or_else(ApiError::missing_fields)?;
    let email = require_field(&request.users_email).ok_or_else(ApiError::missing_fields)?;
    let password = require_field(&request.users_password).ok_or_else(ApiError::missing_fields)?;

    validate_email(email).map_err(|reason| {
        tracing::warn!(%reason, "Registration rejected");
        ApiError::validation("Invalid_email")
    })?;

    let password_hash = hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Error al cifrar la contraseña");
        ApiError::store()
    })?;

    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO users (users_id, users_name, users_email, users_password) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .execute(&state.db)
    .await
    .map_err(|e| {
        // Also reached when the email is already taken (UNIQUE constraint)
        tracing::error!(error = %e, "Error al registrar usuario");
        ApiError::store()
    })?;

    tracing::info!(email = %email, "User registered");
    Ok((StatusCode::CREATED, Json(Ack::new("User_created"))))
}

/// Login endpoint
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Ack>), ApiError> {
    let email = require_field(&request.users_email).ok_or_else(ApiError::missing_fields)?;
    let password = require_field(&request.users_password).ok_or_else(ApiError::missing_fields)?;

    // Email is unique, so at most one row can match
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE users_email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error al consultar usuario");
            ApiError::store()
        })?;

    let user = user.ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(password, &user.users_password) {
        return Err(ApiError::invalid_credentials());
    }

    let token = generate_token();
    let expires_at =
        chrono::Utc::now() + chrono::Duration::minutes(state.config.session.ttl_minutes);
    state
        .sessions
        .set(
            &hash_token(&token),
            SessionData {
                user: UserResponse::from(user),
                expires_at,
            },
        )
        .await?;

    let jar = jar.add(session_cookie(&state, token));

    Ok((jar, Json(Ack::new("created"))))
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.config.session.cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    if state.config.session.cookie_secure {
        // Cross-origin deployment behind HTTPS
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::None);
    } else {
        cookie.set_same_site(SameSite::Lax);
    }
    cookie
}

/// The authenticated session behind the request's cookie.
pub struct CurrentSession(pub SessionData);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_string())
            .ok_or_else(ApiError::not_logged_in)?;

        let session = state.sessions.get(&hash_token(&token)).await?;
        session.map(CurrentSession).ok_or_else(ApiError::not_logged_in)
    }
}

/// Response for the session check
#[derive(Debug, Serialize)]
pub struct LoggedInResponse {
    pub status: &'static str,
    pub user: UserResponse,
}

/// Session check endpoint
///
/// GET /logged_in
pub async fn logged_in(CurrentSession(session): CurrentSession) -> Json<LoggedInResponse> {
    Json(LoggedInResponse {
        status: "LOGGED_IN",
        user: session.user,
    })
}

/// Logout endpoint
///
/// GET /logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Ack>), ApiError> {
    if let Some(cookie) = jar.get(&state.config.session.cookie_name) {
        let token = cookie.value().to_string();
        state.sessions.destroy(&hash_token(&token)).await.map_err(|e| {
            tracing::error!(error = %e, "Error al cerrar sesión");
            ApiError::store()
        })?;
    }
    // Logging out without a session is an idempotent success

    // Removal cookie must carry the same path the login cookie was set with
    let mut removal = Cookie::from(state.config.session.cookie_name.clone());
    removal.set_path("/");
    let jar = jar.remove(removal);
    Ok((jar, Json(Ack::new("Logged out"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{get, post_json, response_json, session_cookie_from, test_app};
    use serde_json::json;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("pw123").unwrap();
        assert_ne!(hash, "pw123");
        assert!(verify_password("pw123", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("pw123", "not-a-phc-string"));
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(hash_token(&a), a);
    }

    #[tokio::test]
    async fn register_with_missing_field_is_400_and_creates_no_row() {
        let (app, state) = test_app().await;

        let resp = post_json(
            &app,
            "/register",
            json!({ "users_name": "Ana", "users_email": "ana@x.com" }),
        )
        .await;
        let (status, body) = response_json(resp).await;
        assert_eq!(status, 400);
        assert_eq!(body["status"], "Missing_fields");

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn register_rejects_malformed_email() {
        let (app, _state) = test_app().await;

        let resp = post_json(
            &app,
            "/register",
            json!({
                "users_name": "Ana",
                "users_email": "not-an-email",
                "users_password": "pw123"
            }),
        )
        .await;
        let (status, body) = response_json(resp).await;
        assert_eq!(status, 400);
        assert_eq!(body["status"], "Invalid_email");
    }

    #[tokio::test]
    async fn register_twice_with_same_email_is_a_store_error() {
        let (app, _state) = test_app().await;
        let body = json!({
            "users_name": "Ana",
            "users_email": "ana@x.com",
            "users_password": "pw123"
        });

        let (status, reply) = response_json(post_json(&app, "/register", body.clone()).await).await;
        assert_eq!(status, 201);
        assert_eq!(reply["status"], "User_created");

        let (status, reply) = response_json(post_json(&app, "/register", body).await).await;
        assert_eq!(status, 500);
        assert_eq!(reply["status"], "Internal_server_error");
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_401() {
        let (app, _state) = test_app().await;
        post_json(
            &app,
            "/register",
            json!({
                "users_name": "Ana",
                "users_email": "ana@x.com",
                "users_password": "pw123"
            }),
        )
        .await;

        // Wrong password
        let (status, body) = response_json(
            post_json(
                &app,
                "/login",
                json!({ "users_email": "ana@x.com", "users_password": "nope" }),
            )
            .await,
        )
        .await;
        assert_eq!(status, 401);
        assert_eq!(body["status"], "Invalid_credentials");

        // Unknown email
        let (status, _) = response_json(
            post_json(
                &app,
                "/login",
                json!({ "users_email": "who@x.com", "users_password": "pw123" }),
            )
            .await,
        )
        .await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn login_then_logged_in_returns_same_user() {
        let (app, _state) = test_app().await;
        post_json(
            &app,
            "/register",
            json!({
                "users_name": "Ana",
                "users_email": "ana@x.com",
                "users_password": "pw123"
            }),
        )
        .await;

        let resp = post_json(
            &app,
            "/login",
            json!({ "users_email": "ana@x.com", "users_password": "pw123" }),
        )
        .await;
        let cookie = session_cookie_from(&resp).expect("login must set the session cookie");
        let (status, body) = response_json(resp).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "created");

        let (status, body) = response_json(get(&app, "/logged_in", Some(&cookie)).await).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "LOGGED_IN");
        assert_eq!(body["user"]["users_email"], "ana@x.com");
        assert_eq!(body["user"]["users_name"], "Ana");
        assert!(body["user"].get("users_password").is_none());
    }

    #[tokio::test]
    async fn logged_in_without_session_is_401() {
        let (app, _state) = test_app().await;
        let (status, body) = response_json(get(&app, "/logged_in", None).await).await;
        assert_eq!(status, 401);
        assert_eq!(body["status"], "NOT_LOGGED_IN");
    }

    #[tokio::test]
    async fn logout_destroys_the_session() {
        let (app, _state) = test_app().await;
        post_json(
            &app,
            "/register",
            json!({
                "users_name": "Ana",
                "users_email": "ana@x.com",
                "users_password": "pw123"
            }),
        )
        .await;
        let resp = post_json(
            &app,
            "/login",
            json!({ "users_email": "ana@x.com", "users_password": "pw123" }),
        )
        .await;
        let cookie = session_cookie_from(&resp).unwrap();

        let (status, body) = response_json(get(&app, "/logout", Some(&cookie)).await).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "Logged out");

        let (status, _) = response_json(get(&app, "/logged_in", Some(&cookie)).await).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn logout_without_session_still_succeeds() {
        let (app, _state) = test_app().await;
        let (status, body) = response_json(get(&app, "/logout", None).await).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "Logged out");
    }
}
