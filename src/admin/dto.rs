use serde::Serialize;
use uuid::Uuid;

use crate::posts::dto::PostResponse;
use crate::users::repo::User;

/// Aggregate counts for the dashboard, computed at call time.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_admins: i64,
}

/// Dashboard payload: stats plus the five newest users and posts.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: Stats,
    pub recent_users: Vec<User>,
    pub recent_posts: Vec<PostResponse>,
}

/// Slim user shape returned after an admin toggle.
#[derive(Debug, Serialize)]
pub struct ToggledUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for ToggledUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleAdminResponse {
    pub message: String,
    pub user: ToggledUser,
}
