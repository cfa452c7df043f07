use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::dto::{DashboardResponse, Stats, ToggleAdminResponse, ToggledUser},
    auth::extractors::AdminUser,
    error::ApiError,
    posts::{dto::PostResponse, repo::Post},
    state::AppState,
    users::repo::{User, UserWithPostCount},
};

const RECENT_LIMIT: i64 = 5;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/toggle-admin", patch(toggle_admin))
}

#[instrument(skip(state, _admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let (total_users, total_admins) = User::counts(&state.db).await?;
    let total_posts = Post::count(&state.db).await?;

    let recent_users = User::recent(&state.db, RECENT_LIMIT).await?;
    let recent_posts = Post::recent_with_author(&state.db, RECENT_LIMIT)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(DashboardResponse {
        stats: Stats {
            total_users,
            total_posts,
            total_admins,
        },
        recent_users,
        recent_posts,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserWithPostCount>>, ApiError> {
    let users = User::list_with_post_count(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state, admin))]
pub async fn toggle_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleAdminResponse>, ApiError> {
    let user = User::toggle_admin(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(
        target_id = %user.id,
        is_admin = user.is_admin,
        acting_admin = %admin.id,
        "admin flag toggled"
    );
    Ok(Json(ToggleAdminResponse {
        message: "User admin status updated successfully".into(),
        user: ToggledUser::from(user),
    }))
}
