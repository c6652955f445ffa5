//! User row and auth request/response types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub users_id: String,
    pub users_name: String,
    pub users_email: String,
    /// Argon2 digest, never the plaintext.
    pub users_password: String,
    pub created_at: String,
}

/// User as exposed to clients: the password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub users_id: String,
    pub users_name: String,
    pub users_email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            users_id: user.users_id,
            users_name: user.users_name,
            users_email: user.users_email,
        }
    }
}

/// Body of `POST /register`. Fields are optional so that missing ones can
/// be reported as a 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub users_name: Option<String>,
    pub users_email: Option<String>,
    pub users_password: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub users_email: Option<String>,
    pub users_password: Option<String>,
}
