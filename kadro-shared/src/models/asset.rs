/// Asset model and database operations
///
/// An asset is a physical item assigned to a user. The assignment carries
/// an approval state driven by the assigned employee.
///
/// # State Machine
///
/// ```text
/// (none) → pending → approved
///                  → rejected
/// ```
///
/// Approved and rejected are terminal; a rejection keeps its reason for
/// audit. The transition guard lives in the UPDATE predicate, so two
/// concurrent responses to the same pending assignment cannot both win.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE asset_state AS ENUM ('pending', 'approved', 'rejected');
///
/// CREATE TABLE assets (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     name VARCHAR(255) NOT NULL,
///     serial_number VARCHAR(255),
///     state asset_state NOT NULL DEFAULT 'pending',
///     rejection_reason TEXT,
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     responded_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kadro_shared::models::asset::{Asset, CreateAsset};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, company_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let asset = Asset::create(&pool, CreateAsset {
///     company_id,
///     user_id,
///     name: "ThinkPad T14".to_string(),
///     serial_number: Some("SN-0042".to_string()),
/// }).await?;
///
/// // The assigned employee approves it
/// let approved = Asset::approve(&pool, asset.id).await?;
/// assert!(approved);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

const ASSET_COLUMNS: &str = "id, company_id, user_id, name, serial_number, state, \
                             rejection_reason, assigned_at, responded_at, created_at, updated_at";

/// Asset assignment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetState {
    /// Assigned, waiting for the employee's response
    Pending,

    /// Employee accepted the assignment (terminal)
    Approved,

    /// Employee rejected the assignment (terminal, reason retained)
    Rejected,
}

impl AssetState {
    /// Converts state to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::Pending => "pending",
            AssetState::Approved => "approved",
            AssetState::Rejected => "rejected",
        }
    }

    /// Checks if state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetState::Approved | AssetState::Rejected)
    }

    /// Checks if transition to target state is valid
    pub fn can_transition_to(&self, target: AssetState) -> bool {
        matches!(
            (self, target),
            (AssetState::Pending, AssetState::Approved)
                | (AssetState::Pending, AssetState::Rejected)
        )
    }
}

/// Asset record with its assignment state
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    /// Unique asset ID
    pub id: Uuid,

    /// Company that owns the asset
    pub company_id: Uuid,

    /// Employee the asset is assigned to
    pub user_id: Uuid,

    /// Item description (e.g., "ThinkPad T14")
    pub name: String,

    /// Optional serial/inventory number
    pub serial_number: Option<String>,

    /// Current assignment state
    pub state: AssetState,

    /// Why the employee rejected the assignment (audit)
    pub rejection_reason: Option<String>,

    /// When the manager assigned the asset
    pub assigned_at: DateTime<Utc>,

    /// When the employee approved or rejected (null while pending)
    pub responded_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for assigning a new asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
}

impl Asset {
    /// Creates an assignment in the pending state
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateAsset,
    ) -> Result<Self, sqlx::Error> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            INSERT INTO assets (company_id, user_id, name, serial_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {ASSET_COLUMNS}
            "#,
        ))
        .bind(data.company_id)
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.serial_number)
        .fetch_one(executor)
        .await?;

        Ok(asset)
    }

    /// Finds an asset by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(asset)
    }

    /// Lists assets assigned to one user
    pub async fn list_by_user(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assets = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE user_id = $1 ORDER BY assigned_at DESC",
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(assets)
    }

    /// Lists all assets across a company's personnel
    pub async fn list_by_company(
        executor: impl PgExecutor<'_>,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assets = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE company_id = $1 ORDER BY assigned_at DESC",
        ))
        .bind(company_id)
        .fetch_all(executor)
        .await?;

        Ok(assets)
    }

    /// Transitions pending → approved
    ///
    /// The state predicate makes this a conditional write: returns false
    /// if the asset was not in the pending state (already responded, or
    /// lost a race to a concurrent response).
    pub async fn approve(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET state = 'approved', responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND state = 'pending'
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transitions pending → rejected, retaining the reason
    pub async fn reject(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        reason: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET state = 'rejected', rejection_reason = $2, responded_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND state = 'pending'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
