/// User model and database operations
///
/// Users are either the company manager (one per company, created during
/// registration) or personnel (provisioned by the manager). A user always
/// references the company it belongs to, so a manager user can only be
/// inserted after its company row exists; see [`ProvisionalManager`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('company_manager', 'employee');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     password_digest VARCHAR(255) NOT NULL,
///     role user_role NOT NULL,
///     state record_state NOT NULL DEFAULT 'active',
///     company_id UUID NOT NULL REFERENCES companies(id),
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     avatar_url VARCHAR(512),
///     address_id UUID REFERENCES addresses(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kadro_shared::models::user::{User, UserRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, company_id: Uuid) -> Result<(), sqlx::Error> {
/// let roster = User::list_by_company_and_role(&pool, company_id, UserRole::Employee).await?;
/// println!("{} employees", roster.len());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::RecordState;

const USER_COLUMNS: &str = "id, email, password_digest, role, state, company_id, first_name, \
                            last_name, avatar_url, address_id, created_at, updated_at";

/// User role within a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Administers personnel and assets; one per company
    CompanyManager,

    /// Subject to asset assignments
    Employee,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::CompanyManager => "company_manager",
            UserRole::Employee => "employee",
        }
    }
}

/// User record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address (unique, case-insensitive via CITEXT)
    pub email: String,

    /// Deterministic credential digest (see `auth::credentials`)
    pub password_digest: String,

    /// Manager or employee
    pub role: UserRole,

    /// Lifecycle state; never hard-deleted in scope
    pub state: RecordState,

    /// Company the user belongs to (non-owning back-reference)
    pub company_id: Uuid,

    pub first_name: String,
    pub last_name: String,

    /// Avatar URL returned by the media store
    pub avatar_url: Option<String>,

    /// The user's address, when one was captured at registration
    pub address_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_digest: String,
    pub role: UserRole,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address_id: Option<Uuid>,
}

/// Manager account captured at registration, before its company exists
///
/// A user row cannot be inserted until the company id it references is
/// known, so registration holds the manager's fields here and calls
/// [`ProvisionalManager::commit`] once the company row is persisted. The
/// emitted user is active from the start; there is no intermediate
/// passive write to flip later.
#[derive(Debug, Clone)]
pub struct ProvisionalManager {
    pub email: String,
    pub password_digest: String,
    pub first_name: String,
    pub last_name: String,
    pub address_id: Option<Uuid>,
}

impl ProvisionalManager {
    /// Completes provisioning by binding the manager to its company
    pub fn commit(self, company_id: Uuid) -> CreateUser {
        CreateUser {
            email: self.email,
            password_digest: self.password_digest,
            role: UserRole::CompanyManager,
            company_id,
            first_name: self.first_name,
            last_name: self.last_name,
            address_id: self.address_id,
        }
    }
}

impl User {
    /// Inserts a new user in the active state
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateUser,
    ) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_digest, role, company_id, first_name,
                               last_name, address_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.password_digest)
        .bind(data.role)
        .bind(data.company_id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.address_id)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Login lookup: user by email and credential digest
    pub async fn find_by_email_and_digest(
        executor: impl PgExecutor<'_>,
        email: &str,
        password_digest: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND password_digest = $2",
        ))
        .bind(email)
        .bind(password_digest)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Checks whether a user with this email exists
    pub async fn exists_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(executor)
                .await?;

        Ok(exists)
    }

    /// Finds the manager user of a company
    pub async fn find_manager_of_company(
        executor: impl PgExecutor<'_>,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE company_id = $1 AND role = $2",
        ))
        .bind(company_id)
        .bind(UserRole::CompanyManager)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Lists the users of a company with a given role
    ///
    /// Used by the manager profile to enrich with the employee roster.
    pub async fn list_by_company_and_role(
        executor: impl PgExecutor<'_>,
        company_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE company_id = $1 AND role = $2
            ORDER BY created_at
            "#,
        ))
        .bind(company_id)
        .bind(role)
        .fetch_all(executor)
        .await?;

        Ok(users)
    }

    /// Persists the avatar URL returned by the media store
    pub async fn update_avatar(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        avatar_url: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(avatar_url)
                .execute(executor)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the stored credential digest
    pub async fn update_password(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        password_digest: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_digest = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_digest)
                .execute(executor)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
