use anyhow::Context;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Client-side view of a request failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the bearer token (401). The caller must drop any
    /// cached token and re-authenticate.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

// Wire shapes, deserialize-only. Unknown fields are ignored so the client
// stays tolerant of additive server changes.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: ApiUser,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiAuthor {
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: ApiAuthor,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiPageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPostPage {
    pub data: Vec<ApiPost>,
    pub meta: ApiPageMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStats {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_admins: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDashboard {
    pub stats: ApiStats,
    pub recent_users: Vec<ApiUser>,
    pub recent_posts: Vec<ApiPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAdminUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub post_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleAdminPayload {
    pub message: String,
    pub user: ApiUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub message: String,
}

/// One HTTP client per session. Holds the base URL and, once logged in, the
/// bearer token attached to every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        Url::parse(base).context("invalid base URL")?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn req(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthenticated);
        }
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<AuthPayload, ClientError> {
        let resp = self
            .req(Method::POST, "/api/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password,
                "password_confirmation": password_confirmation,
            }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ClientError> {
        let resp = self
            .req(Method::POST, "/api/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn logout(&self) -> Result<MessagePayload, ClientError> {
        let resp = self.req(Method::POST, "/api/logout").send().await?;
        Self::parse(resp).await
    }

    pub async fn current_user(&self) -> Result<ApiUser, ClientError> {
        let resp = self.req(Method::GET, "/api/user").send().await?;
        Self::parse(resp).await
    }

    pub async fn update_profile(&self, name: &str, email: &str) -> Result<ApiUser, ClientError> {
        let resp = self
            .req(Method::PUT, "/api/user/profile")
            .json(&json!({ "name": name, "email": email }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<MessagePayload, ClientError> {
        let resp = self
            .req(Method::PUT, "/api/user/password")
            .json(&json!({
                "current_password": current_password,
                "password": password,
                "password_confirmation": password_confirmation,
            }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn user_profile(&self, id: Uuid) -> Result<ApiUser, ClientError> {
        let resp = self
            .req(Method::GET, &format!("/api/users/{}/profile", id))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn posts(&self, page: i64, per_page: Option<i64>) -> Result<ApiPostPage, ClientError> {
        let mut req = self.req(Method::GET, "/api/posts").query(&[("page", page)]);
        if let Some(per_page) = per_page {
            req = req.query(&[("per_page", per_page)]);
        }
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<ApiPost, ClientError> {
        let resp = self
            .req(Method::GET, &format!("/api/posts/{}", id))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn create_post(&self, title: &str, content: &str) -> Result<ApiPost, ClientError> {
        let resp = self
            .req(Method::POST, "/api/posts")
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<ApiPost, ClientError> {
        let resp = self
            .req(Method::PUT, &format!("/api/posts/{}", id))
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<MessagePayload, ClientError> {
        let resp = self
            .req(Method::DELETE, &format!("/api/posts/{}", id))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn dashboard(&self) -> Result<ApiDashboard, ClientError> {
        let resp = self.req(Method::GET, "/api/admin/dashboard").send().await?;
        Self::parse(resp).await
    }

    pub async fn admin_users(&self) -> Result<Vec<ApiAdminUser>, ClientError> {
        let resp = self.req(Method::GET, "/api/admin/users").send().await?;
        Self::parse(resp).await
    }

    pub async fn toggle_admin(&self, id: Uuid) -> Result<ToggleAdminPayload, ClientError> {
        let resp = self
            .req(Method::PATCH, &format!("/api/admin/users/{}/toggle-admin", id))
            .send()
            .await?;
        Self::parse(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("http://localhost:8080").is_ok());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base, "http://localhost:8080");
    }

    #[test]
    fn post_page_deserializes_from_wire_shape() {
        let body = r#"{
            "data": [{
                "id": "7f1c0f0a-58c9-4f0b-9be6-2b0f6e63c7c1",
                "title": "Hello",
                "content": "World, this is a test.",
                "author": {"id": null, "name": "Unknown", "email": "unknown@example.com"},
                "created_at": "2025-03-01T00:00:00Z",
                "updated_at": "2025-03-01T00:00:00Z"
            }],
            "meta": {"current_page": 1, "per_page": 10, "total": 1, "last_page": 1}
        }"#;
        let page: ApiPostPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].author.name, "Unknown");
        assert_eq!(page.meta.total, 1);
    }
}
