/// Company model and database operations
///
/// A company owns exactly one manager user, zero-or-more employees, one
/// membership, and one address. The `mail_verified` flag starts false and
/// flips true exactly once via the verification workflow.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     password_digest VARCHAR(255) NOT NULL,
///     mail_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     logo_url VARCHAR(512),
///     address_id UUID NOT NULL REFERENCES addresses(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kadro_shared::models::company::Company;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if let Some(company) = Company::find_by_email(&pool, "hr@acme.example").await? {
///     println!("mail verified: {}", company.mail_verified);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

const COMPANY_COLUMNS: &str = "id, name, email, password_digest, mail_verified, logo_url, \
                               address_id, created_at, updated_at";

/// Company record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID
    pub id: Uuid,

    /// Company display name
    pub name: String,

    /// Company email (unique, case-insensitive via CITEXT)
    pub email: String,

    /// Deterministic credential digest (see `auth::credentials`)
    pub password_digest: String,

    /// Whether the company email has been verified
    ///
    /// Set true exactly once by the verification workflow
    pub mail_verified: bool,

    /// Logo URL returned by the media store
    pub logo_url: Option<String>,

    /// The company's address (exclusively owned)
    pub address_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub address_id: Uuid,
}

impl Company {
    /// Inserts a new company with `mail_verified = false`
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateCompany,
    ) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO companies (name, email, password_digest, address_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMPANY_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_digest)
        .bind(data.address_id)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    /// Finds a company by email address (case-insensitive)
    pub async fn find_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    /// Login lookup: company by email and credential digest
    ///
    /// The digest is deterministic, so this is a plain equality join.
    pub async fn find_by_email_and_digest(
        executor: impl PgExecutor<'_>,
        email: &str,
        password_digest: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE email = $1 AND password_digest = $2",
        ))
        .bind(email)
        .bind(password_digest)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    /// Checks whether a company with this email exists
    pub async fn exists_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM companies WHERE email = $1)")
                .bind(email)
                .fetch_one(executor)
                .await?;

        Ok(exists)
    }

    /// Marks the company email as verified
    ///
    /// Returns true if the company was found and updated.
    pub async fn set_mail_verified(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE companies SET mail_verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persists the logo URL returned by the media store
    pub async fn update_logo(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        logo_url: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE companies SET logo_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(logo_url)
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
        let result = sqlx::query(
            "UPDATE companies SET password_digest = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_digest)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
