//! Local cache of server state. Every update goes through a transition
//! function that consumes the old state and returns the new one, so each
//! mutation point is visible at the call site. For a given entity the last
//! response applied wins.

use uuid::Uuid;

use crate::client::api::{ApiPost, ApiPostPage, ApiUser, AuthPayload};

/// Snapshot of what the client believes the server state to be.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<ApiUser>,
    pub token: Option<String>,
    pub posts: Vec<ApiPost>,
    pub current_page: Option<i64>,
    pub last_page: Option<i64>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Register or login succeeded.
pub fn login_succeeded(state: SessionState, auth: AuthPayload) -> SessionState {
    SessionState {
        user: Some(auth.user),
        token: Some(auth.token),
        ..state
    }
}

/// Logout succeeded. Cached posts go too; they were fetched as an
/// authenticated user.
pub fn logged_out(_state: SessionState) -> SessionState {
    SessionState::default()
}

/// The server answered 401: the token is no longer valid.
pub fn unauthenticated(_state: SessionState) -> SessionState {
    SessionState::default()
}

/// A page of posts arrived; it replaces the cached list wholesale.
pub fn posts_loaded(state: SessionState, page: ApiPostPage) -> SessionState {
    SessionState {
        posts: page.data,
        current_page: Some(page.meta.current_page),
        last_page: Some(page.meta.last_page),
        ..state
    }
}

/// A post was created; prepend it, keeping the newest-first order.
pub fn post_created(mut state: SessionState, post: ApiPost) -> SessionState {
    state.posts.insert(0, post);
    state
}

/// A post was updated; the new version overwrites the cached one by id.
pub fn post_updated(mut state: SessionState, post: ApiPost) -> SessionState {
    if let Some(slot) = state.posts.iter_mut().find(|p| p.id == post.id) {
        *slot = post;
    }
    state
}

/// A post was deleted server-side; drop it from the cache.
pub fn post_deleted(mut state: SessionState, id: Uuid) -> SessionState {
    state.posts.retain(|p| p.id != id);
    state
}

/// Profile update or fresh `/user` fetch overwrites the cached user.
pub fn user_refreshed(state: SessionState, user: ApiUser) -> SessionState {
    SessionState {
        user: Some(user),
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::{ApiAuthor, ApiPageMeta};

    fn user() -> ApiUser {
        ApiUser {
            id: Uuid::new_v4(),
            name: "Jane Smith".into(),
            email: "jane@example.com".into(),
            is_admin: false,
        }
    }

    fn post(title: &str) -> ApiPost {
        ApiPost {
            id: Uuid::new_v4(),
            title: title.into(),
            content: "body".into(),
            author: ApiAuthor {
                id: Some(Uuid::new_v4()),
                name: "Jane Smith".into(),
                email: "jane@example.com".into(),
            },
        }
    }

    fn page(posts: Vec<ApiPost>) -> ApiPostPage {
        let total = posts.len() as i64;
        ApiPostPage {
            data: posts,
            meta: ApiPageMeta {
                current_page: 1,
                per_page: 10,
                total,
                last_page: 1,
            },
        }
    }

    #[test]
    fn login_then_logout_round_trips_to_empty() {
        let state = login_succeeded(
            SessionState::default(),
            AuthPayload {
                user: user(),
                token: "secret".into(),
            },
        );
        assert!(state.is_authenticated());
        assert!(state.user.is_some());

        let state = logged_out(state);
        assert!(!state.is_authenticated());
        assert!(state.user.is_none());
        assert!(state.posts.is_empty());
    }

    #[test]
    fn unauthenticated_clears_cached_token() {
        let mut state = SessionState::default();
        state.token = Some("stale".into());
        state.user = Some(user());

        let state = unauthenticated(state);
        assert!(state.token.is_none());
        assert!(state.user.is_none());
    }

    #[test]
    fn posts_loaded_replaces_the_cache() {
        let state = posts_loaded(SessionState::default(), page(vec![post("one"), post("two")]));
        assert_eq!(state.posts.len(), 2);

        let state = posts_loaded(state, page(vec![post("three")]));
        assert_eq!(state.posts.len(), 1);
        assert_eq!(state.posts[0].title, "three");
    }

    #[test]
    fn created_post_lands_first() {
        let state = posts_loaded(SessionState::default(), page(vec![post("old")]));
        let state = post_created(state, post("new"));
        assert_eq!(state.posts[0].title, "new");
        assert_eq!(state.posts[1].title, "old");
    }

    #[test]
    fn later_update_overwrites_earlier_state_for_same_id() {
        let original = post("before");
        let id = original.id;
        let state = posts_loaded(SessionState::default(), page(vec![original.clone()]));

        let mut updated = original;
        updated.title = "after".into();
        let state = post_updated(state, updated);

        assert_eq!(state.posts.len(), 1);
        assert_eq!(state.posts[0].id, id);
        assert_eq!(state.posts[0].title, "after");
    }

    #[test]
    fn update_for_unknown_id_is_a_no_op() {
        let state = posts_loaded(SessionState::default(), page(vec![post("kept")]));
        let state = post_updated(state, post("elsewhere"));
        assert_eq!(state.posts.len(), 1);
        assert_eq!(state.posts[0].title, "kept");
    }

    #[test]
    fn deleted_post_is_dropped() {
        let doomed = post("doomed");
        let id = doomed.id;
        let state = posts_loaded(SessionState::default(), page(vec![doomed, post("kept")]));

        let state = post_deleted(state, id);
        assert_eq!(state.posts.len(), 1);
        assert_eq!(state.posts[0].title, "kept");
    }

    #[test]
    fn user_refresh_overwrites_cached_user() {
        let state = user_refreshed(SessionState::default(), user());
        let mut renamed = user();
        renamed.name = "Jane Doe".into();
        let state = user_refreshed(state, renamed.clone());
        assert_eq!(state.user.unwrap().name, "Jane Doe");
    }
}
