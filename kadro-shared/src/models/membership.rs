/// Membership model and database operations
///
/// The company's subscription record, created once at registration. Price
/// and date range derive deterministically from the membership-type
/// lookup: price = base price × discount rate, start/end dates copied
/// from the type's term.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_type AS ENUM ('monthly', 'yearly');
///
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     membership_type membership_type NOT NULL,
///     price DOUBLE PRECISION NOT NULL,
///     start_date TIMESTAMPTZ NOT NULL,
///     end_date TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Membership type lookup
///
/// The type fixes the base price, the discount applied to it, and the
/// subscription term the start/end dates are copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Monthly,
    Yearly,
}

impl MembershipType {
    /// Base price before discount
    pub fn base_price(&self) -> f64 {
        match self {
            MembershipType::Monthly => 2000.0,
            MembershipType::Yearly => 24000.0,
        }
    }

    /// Discount rate applied to the base price
    pub fn discount_rate(&self) -> f64 {
        match self {
            MembershipType::Monthly => 1.0,
            MembershipType::Yearly => 0.85,
        }
    }

    /// Subscription term the membership dates are copied from
    pub fn term(&self) -> Duration {
        match self {
            MembershipType::Monthly => Duration::days(30),
            MembershipType::Yearly => Duration::days(365),
        }
    }

    /// Computed subscription price: base price × discount rate
    pub fn price(&self) -> f64 {
        self.base_price() * self.discount_rate()
    }
}

/// Membership record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    pub membership_type: MembershipType,

    /// Price computed from the type lookup at creation time
    pub price: f64,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership
///
/// Price and dates are derived from the type; callers only choose the type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub company_id: Uuid,
    pub membership_type: MembershipType,
}

impl Membership {
    /// Inserts the company's membership, deriving price and dates from the type
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateMembership,
    ) -> Result<Self, sqlx::Error> {
        let start_date = Utc::now();
        let end_date = start_date + data.membership_type.term();

        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (company_id, membership_type, price, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, membership_type, price, start_date, end_date, created_at
            "#,
        )
        .bind(data.company_id)
        .bind(data.membership_type)
        .bind(data.membership_type.price())
        .bind(start_date)
        .bind(end_date)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Finds the membership of a company
    pub async fn find_by_company(
        executor: impl PgExecutor<'_>,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, company_id, membership_type, price, start_date, end_date, created_at
            FROM memberships
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(membership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_is_base_times_discount() {
        assert_eq!(MembershipType::Monthly.price(), 2000.0);
        assert_eq!(MembershipType::Yearly.price(), 24000.0 * 0.85);
    }

    #[test]
    fn test_terms() {
        assert_eq!(MembershipType::Monthly.term(), Duration::days(30));
        assert_eq!(MembershipType::Yearly.term(), Duration::days(365));
    }
}
