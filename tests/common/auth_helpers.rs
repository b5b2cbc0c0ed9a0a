//! Authentication test helpers
//!
//! Provides utilities for registering and seeding users and for logging in
//! through the API.

use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};
use uuid::Uuid;

use streamhub::backend::auth::users::{NewUser, User, UserStore};
use streamhub::backend::media::UploadedMedia;

use super::TestApp;

pub const USERS: &str = "/api/v1/users";

/// Path under the users API
pub fn users_path(path: &str) -> String {
    format!("{}{}", USERS, path)
}

/// Small fake PNG payload
pub fn image_part(file_name: &'static str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec())
        .file_name(file_name)
        .mime_type("image/png")
}

/// Registration form with every text field and an avatar
pub fn registration_form(full_name: &str, username: &str, email: &str, password: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("fullName", full_name.to_string())
        .add_text("username", username.to_string())
        .add_text("email", email.to_string())
        .add_text("password", password.to_string())
        .add_part("avatar", image_part("avatar.png"))
}

/// Register through the API and return the `data` object
pub async fn register_user(app: &TestApp, username: &str, email: &str, password: &str) -> Value {
    let response = app
        .server
        .post(&users_path("/register"))
        .multipart(registration_form("Test User", username, email, password))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Insert a user straight into the store, bypassing the media host
pub async fn seed_user(app: &TestApp, username: &str, email: &str, password: &str) -> User {
    let password_hash = bcrypt::hash(password, 4).unwrap();
    app.users
        .insert(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Seeded User".to_string(),
            password_hash,
            avatar: UploadedMedia {
                url: format!("https://media.test/{}.png", username),
                public_id: format!("seed-{}", username),
            },
            cover_image: None,
        })
        .await
        .unwrap()
}

/// Token pair returned by a successful login
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

/// Log in by username and return the issued pair
pub async fn login(app: &TestApp, username: &str, password: &str) -> Session {
    let response = app
        .server
        .post(&users_path("/login"))
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let data = &body["data"];
    Session {
        user_id: data["user"]["id"].as_str().unwrap().parse().unwrap(),
        access_token: data["accessToken"].as_str().unwrap().to_string(),
        refresh_token: data["refreshToken"].as_str().unwrap().to_string(),
    }
}

/// The refresh token currently stored for `user_id`
pub async fn stored_refresh_token(app: &TestApp, user_id: Uuid) -> Option<String> {
    app.users
        .find_by_id(user_id)
        .await
        .unwrap()
        .and_then(|user| user.refresh_token)
}
