/// Verification token store
///
/// Tracks single-use email-verification tokens. The token string itself is
/// a signed purpose JWT whose expiry is a structured claim; this store
/// additionally persists the expiry and a state flag so a token can be
/// spent exactly once. Once passive, a record never becomes reusable no
/// matter how often the token is re-presented.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE verification_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token VARCHAR(1024) NOT NULL UNIQUE,
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     state record_state NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::RecordState;

/// Verification token record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationToken {
    /// Unique record ID
    pub id: Uuid,

    /// The opaque token string mailed to the company
    pub token: String,

    /// Company the token verifies
    pub company_id: Uuid,

    /// Expiry instant, mirrored from the token's embedded claim
    pub expires_at: DateTime<Utc>,

    /// Active until spent or expired
    pub state: RecordState,

    pub created_at: DateTime<Utc>,
}

/// Input for persisting a freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVerificationToken {
    pub token: String,
    pub company_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Persists a freshly issued token in the active state
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateVerificationToken,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, VerificationToken>(
            r#"
            INSERT INTO verification_tokens (token, company_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, company_id, expires_at, state, created_at
            "#,
        )
        .bind(data.token)
        .bind(data.company_id)
        .bind(data.expires_at)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Looks up a token by its string
    pub async fn find_by_token(
        executor: impl PgExecutor<'_>,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, VerificationToken>(
            r#"
            SELECT id, token, company_id, expires_at, state, created_at
            FROM verification_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Marks an active record passive
    ///
    /// The state predicate makes this a conditional write: returns false
    /// if the record was already passive, so two concurrent spends of the
    /// same token cannot both win.
    pub async fn consume(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE verification_tokens SET state = 'passive' WHERE id = $1 AND state = 'active'",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the record is already spent
    pub fn is_spent(&self) -> bool {
        self.state == RecordState::Passive
    }

    /// Whether the persisted expiry has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
