use crate::posts::repo::Post;
use crate::users::repo::User;

/// Author-or-admin rule for mutating a post. Applies to update and delete;
/// reads and creates never consult it.
pub fn can_mutate(user: &User, post: &Post) -> bool {
    post.user_id == user.id || user.is_admin
}
