use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::CurrentUser,
        handlers::{is_valid_email, FieldErrors},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{ChangePasswordRequest, UpdateProfileRequest, UserListResponse},
        repo::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_current_user))
        .route("/user/profile", put(update_profile))
        .route("/user/password", put(change_password))
        .route("/users", get(list_users))
        .route("/users/:id/profile", get(get_user_profile))
}

#[instrument(skip(user))]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[instrument(skip(state, user, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = FieldErrors::new();
    if payload.name.is_empty() {
        errors.entry("name").or_default().push("The name field is required.".into());
    } else if payload.name.len() > 255 {
        errors
            .entry("name")
            .or_default()
            .push("The name may not be greater than 255 characters.".into());
    }
    if payload.email.is_empty() || !is_valid_email(&payload.email) || payload.email.len() > 255 {
        errors
            .entry("email")
            .or_default()
            .push("The email must be a valid email address.".into());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Uniqueness check must not trip over the caller's own row.
    if let Some(existing) = User::find_by_email(&state.db, &payload.email).await? {
        if existing.id != user.id {
            warn!(user_id = %user.id, email = %payload.email, "profile email already taken");
            return Err(ApiError::field("email", "The email has already been taken."));
        }
    }

    let updated = User::update_profile(&state.db, user.id, &payload.name, &payload.email).await?;
    info!(user_id = %updated.id, "profile updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let min_len = state.config.auth.min_password_len;

    let mut errors = FieldErrors::new();
    if payload.current_password.is_empty() {
        errors
            .entry("current_password")
            .or_default()
            .push("The current password field is required.".into());
    }
    if payload.password.len() < min_len {
        errors
            .entry("password")
            .or_default()
            .push(format!("The password must be at least {} characters.", min_len));
    }
    if payload.password != payload.password_confirmation {
        errors
            .entry("password")
            .or_default()
            .push("The password confirmation does not match.".into());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "password change with wrong current password");
        return Err(ApiError::field("current_password", "Current password is incorrect."));
    }

    let hash = hash_password(&payload.password)?;
    User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}

#[instrument(skip(state, _user))]
pub async fn get_user_profile(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(UserListResponse { data: users }))
}
