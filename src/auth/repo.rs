use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::User;

/// Bearer token record. One row per login or registration; a user may hold
/// several at once.
#[derive(Debug, Clone, FromRow)]
pub struct AccessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: OffsetDateTime,
    pub last_used_at: Option<OffsetDateTime>,
}

impl AccessToken {
    /// Store a freshly minted token for the user.
    pub async fn create(db: &PgPool, user_id: Uuid, token: &str) -> anyhow::Result<AccessToken> {
        let row = sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Resolve a bearer token to its owning user. A token with no matching
    /// row, or one whose owner row is gone, resolves to `None`.
    pub async fn resolve(db: &PgPool, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.is_admin, u.created_at, u.updated_at
            FROM access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;

        if user.is_some() {
            // last-used bookkeeping; a failure here must not fail the request
            let _ = sqlx::query("UPDATE access_tokens SET last_used_at = now() WHERE token = $1")
                .bind(token)
                .execute(db)
                .await;
        }

        Ok(user)
    }

    /// Drop every token the user holds, not just the one used for the request.
    pub async fn delete_all_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}
