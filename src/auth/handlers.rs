use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest},
        extractors::CurrentUser,
        password::{hash_password, verify_password},
        repo::AccessToken,
        token,
    },
    error::ApiError,
    state::AppState,
    users::repo::User,
};

pub(crate) type FieldErrors = HashMap<&'static str, Vec<String>>;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn push(errors: &mut FieldErrors, field: &'static str, message: &str) {
    errors.entry(field).or_default().push(message.to_string());
}

fn validate_registration(payload: &RegisterRequest, min_password_len: usize) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if payload.name.is_empty() {
        push(&mut errors, "name", "The name field is required.");
    } else if payload.name.len() > 255 {
        push(&mut errors, "name", "The name may not be greater than 255 characters.");
    }

    if payload.email.is_empty() {
        push(&mut errors, "email", "The email field is required.");
    } else if !is_valid_email(&payload.email) || payload.email.len() > 255 {
        push(&mut errors, "email", "The email must be a valid email address.");
    }

    if payload.password.len() < min_password_len {
        push(
            &mut errors,
            "password",
            &format!("The password must be at least {} characters.", min_password_len),
        );
    }
    if payload.password != payload.password_confirmation {
        push(&mut errors, "password", "The password confirmation does not match.");
    }

    errors
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    let errors = validate_registration(&payload, state.config.auth.min_password_len);
    if !errors.is_empty() {
        warn!(email = %payload.email, "registration payload invalid");
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::field("email", "The email has already been taken."));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash).await?;

    let secret = token::mint_secret(state.config.auth.token_length);
    AccessToken::create(&state.db, user.id, &secret).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            token: secret,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = FieldErrors::new();
    if payload.email.is_empty() || !is_valid_email(&payload.email) {
        push(&mut errors, "email", "The email must be a valid email address.");
    }
    if payload.password.is_empty() {
        push(&mut errors, "password", "The password field is required.");
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // One generic message for unknown email and wrong password alike, so the
    // response never reveals whether the email exists.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::field("email", "The provided credentials are incorrect."));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::field("email", "The provided credentials are incorrect."));
    }

    let secret = token::mint_secret(state.config.auth.token_length);
    AccessToken::create(&state.db, user.id, &secret).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        user,
        token: secret,
    }))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let dropped = AccessToken::delete_all_for_user(&state.db, user.id).await?;
    info!(user_id = %user.id, dropped, "user logged out");
    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, email: &str, password: &str, confirmation: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            password_confirmation: confirmation.into(),
        }
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn valid_registration_passes() {
        let errors = validate_registration(&payload("Jane", "jane@example.com", "longenough", "longenough"), 8);
        assert!(errors.is_empty());
    }

    #[test]
    fn short_password_is_flagged() {
        let errors = validate_registration(&payload("Jane", "jane@example.com", "short", "short"), 8);
        assert_eq!(errors["password"], vec!["The password must be at least 8 characters."]);
    }

    #[test]
    fn mismatched_confirmation_is_flagged() {
        let errors = validate_registration(&payload("Jane", "jane@example.com", "longenough", "different"), 8);
        assert!(errors["password"]
            .iter()
            .any(|m| m == "The password confirmation does not match."));
    }

    #[test]
    fn missing_fields_collect_per_field_messages() {
        let errors = validate_registration(&payload("", "", "", ""), 8);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn overlong_name_is_flagged() {
        let errors = validate_registration(
            &payload(&"x".repeat(256), "jane@example.com", "longenough", "longenough"),
            8,
        );
        assert_eq!(errors["name"], vec!["The name may not be greater than 255 characters."]);
    }
}
