/// Address model
///
/// Plain value records attached to both users and companies. Registration
/// inserts two independent rows even when the manager's address and the
/// company's address are textually identical.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE addresses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     country VARCHAR(100) NOT NULL,
///     city VARCHAR(100) NOT NULL,
///     district VARCHAR(100) NOT NULL,
///     street VARCHAR(255) NOT NULL,
///     zip_code VARCHAR(20) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Address record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    /// Unique address ID
    pub id: Uuid,

    pub country: String,
    pub city: String,
    pub district: String,
    pub street: String,
    pub zip_code: String,

    /// When the address was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating an address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddress {
    pub country: String,
    pub city: String,
    pub district: String,
    pub street: String,
    pub zip_code: String,
}

impl Address {
    /// Inserts a new address row
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateAddress,
    ) -> Result<Self, sqlx::Error> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (country, city, district, street, zip_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, country, city, district, street, zip_code, created_at
            "#,
        )
        .bind(data.country)
        .bind(data.city)
        .bind(data.district)
        .bind(data.street)
        .bind(data.zip_code)
        .fetch_one(executor)
        .await?;

        Ok(address)
    }

    /// Finds an address by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, country, city, district, street, zip_code, created_at
            FROM addresses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(address)
    }
}
