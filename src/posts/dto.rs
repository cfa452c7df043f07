use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::repo::PostWithAuthor;

/// Request body for create and update. Fields are fully replaced, not merged.
#[derive(Debug, Deserialize)]
pub struct PostBody {
    pub title: String,
    pub content: String,
}

/// Query parameters for the post listing.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    pub per_page: Option<i64>,
}

fn default_page() -> i64 {
    1
}

impl Pagination {
    /// Clamp to a sane 1-based page and bounded page size.
    pub fn normalize(&self, default_per_page: i64) -> (i64, i64) {
        let page = self.page.max(1);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        (page, per_page)
    }
}

/// Author block on a post response. A dangling owner degrades to the
/// "Unknown" placeholder instead of failing the read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

impl Author {
    fn unknown() -> Self {
        Self {
            id: None,
            name: "Unknown".into(),
            email: "unknown@example.com".into(),
        }
    }
}

/// Post as returned by the API, author resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(row: PostWithAuthor) -> Self {
        let author = match (row.author_id, row.author_name, row.author_email) {
            (Some(id), Some(name), Some(email)) => Author {
                id: Some(id),
                name,
                email,
            },
            _ => Author::unknown(),
        };
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Offset pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl PageMeta {
    pub fn compute(current_page: i64, per_page: i64, total: i64) -> Self {
        let last_page = ((total + per_page - 1) / per_page).max(1);
        Self {
            current_page,
            per_page,
            total,
            last_page,
        }
    }
}

/// One page of posts.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostPage {
    pub data: Vec<PostResponse>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(author: bool) -> PostWithAuthor {
        let author_id = Uuid::new_v4();
        PostWithAuthor {
            id: Uuid::new_v4(),
            title: "Hello".into(),
            content: "World, this is a test.".into(),
            user_id: author_id,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            author_id: author.then_some(author_id),
            author_name: author.then(|| "Jane Smith".to_string()),
            author_email: author.then(|| "jane@example.com".to_string()),
        }
    }

    #[test]
    fn resolved_author_is_passed_through() {
        let response = PostResponse::from(row(true));
        assert_eq!(response.author.name, "Jane Smith");
        assert_eq!(response.author.email, "jane@example.com");
        assert!(response.author.id.is_some());
    }

    #[test]
    fn dangling_owner_degrades_to_placeholder() {
        let response = PostResponse::from(row(false));
        assert_eq!(response.author, Author::unknown());
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"name\":\"Unknown\""));
        assert!(json.contains("\"id\":null"));
    }

    #[test]
    fn post_body_has_nowhere_for_a_client_supplied_owner() {
        // the owner always comes from the resolved bearer token; an injected
        // user_id in the body is ignored at the deserialization boundary
        let body: PostBody = serde_json::from_str(
            r#"{"title":"Hello","content":"World","user_id":"7f1c0f0a-58c9-4f0b-9be6-2b0f6e63c7c1"}"#,
        )
        .unwrap();
        assert_eq!(body.title, "Hello");
        assert_eq!(body.content, "World");
    }

    #[test]
    fn normalize_applies_defaults_and_bounds() {
        let p = Pagination { page: 0, per_page: None };
        assert_eq!(p.normalize(10), (1, 10));

        let p = Pagination { page: 3, per_page: Some(500) };
        assert_eq!(p.normalize(10), (3, 100));

        let p = Pagination { page: -2, per_page: Some(0) };
        assert_eq!(p.normalize(10), (1, 1));
    }

    #[test]
    fn page_meta_covers_partial_last_page() {
        // 25 posts at 10 per page: pages 1-3, final page partial
        let meta = PageMeta::compute(2, 10, 25);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.total, 25);
    }

    #[test]
    fn page_meta_of_empty_store_is_one_page() {
        assert_eq!(PageMeta::compute(1, 10, 0).last_page, 1);
    }

    #[test]
    fn page_meta_exact_multiple() {
        assert_eq!(PageMeta::compute(1, 10, 30).last_page, 3);
    }
}
