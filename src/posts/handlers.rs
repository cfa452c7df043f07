use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::MessageResponse, extractors::CurrentUser, handlers::FieldErrors},
    error::ApiError,
    posts::{
        dto::{PageMeta, Pagination, PostBody, PostPage, PostResponse},
        policy::can_mutate,
        repo::Post,
    },
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

fn validate_post_body(payload: &PostBody) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if payload.title.is_empty() {
        errors.entry("title").or_default().push("The title field is required.".into());
    } else if payload.title.len() > 255 {
        errors
            .entry("title")
            .or_default()
            .push("The title may not be greater than 255 characters.".into());
    }
    if payload.content.is_empty() {
        errors
            .entry("content")
            .or_default()
            .push("The content field is required.".into());
    }
    errors
}

#[instrument(skip(state, _user))]
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PostPage>, ApiError> {
    let (page, per_page) = pagination.normalize(state.config.default_page_size);

    let total = Post::count(&state.db).await?;
    let rows = Post::list_page(&state.db, per_page, (page - 1) * per_page).await?;

    Ok(Json(PostPage {
        data: rows.into_iter().map(PostResponse::from).collect(),
        meta: PageMeta::compute(page, per_page, total),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<PostBody>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    payload.title = payload.title.trim().to_string();

    let errors = validate_post_body(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // The owner is always the token-resolved acting user; a client-supplied
    // owner id is never read.
    let post = Post::create(&state.db, user.id, &payload.title, &payload.content).await?;

    let row = Post::find_with_author(&state.db, post.id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    info!(post_id = %post.id, user_id = %user.id, "post created");
    Ok((StatusCode::CREATED, Json(PostResponse::from(row))))
}

#[instrument(skip(state, _user))]
pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let row = Post::find_with_author(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(PostResponse::from(row)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<PostBody>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = Post::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    if !can_mutate(&user, &post) {
        warn!(post_id = %post.id, user_id = %user.id, "post update refused");
        return Err(ApiError::Forbidden("Unauthorized".into()));
    }

    payload.title = payload.title.trim().to_string();
    let errors = validate_post_body(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Post::update(&state.db, post.id, &payload.title, &payload.content).await?;

    let row = Post::find_with_author(&state.db, post.id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    info!(post_id = %post.id, user_id = %user.id, "post updated");
    Ok(Json(PostResponse::from(row)))
}

#[instrument(skip(state, user))]
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let post = Post::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    if !can_mutate(&user, &post) {
        warn!(post_id = %post.id, user_id = %user.id, "post delete refused");
        return Err(ApiError::Forbidden("Unauthorized".into()));
    }

    Post::delete(&state.db, post.id).await?;

    info!(post_id = %post.id, user_id = %user.id, "post deleted");
    Ok(Json(MessageResponse {
        message: "Post deleted successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_and_content_are_flagged() {
        let errors = validate_post_body(&PostBody {
            title: "".into(),
            content: "".into(),
        });
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("content"));
    }

    #[test]
    fn overlong_title_is_flagged() {
        let errors = validate_post_body(&PostBody {
            title: "x".repeat(256),
            content: "body".into(),
        });
        assert_eq!(errors["title"], vec!["The title may not be greater than 255 characters."]);
    }

    #[test]
    fn well_formed_body_passes() {
        let errors = validate_post_body(&PostBody {
            title: "Hello".into(),
            content: "World, this is a test.".into(),
        });
        assert!(errors.is_empty());
    }
}
