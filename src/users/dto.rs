use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Request body for profile update.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

/// Request body for password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Response wrapper for the user listing.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<User>,
}
