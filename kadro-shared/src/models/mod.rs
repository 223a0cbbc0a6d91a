/// Database models for Kadro
///
/// One module per entity, each carrying its schema and CRUD operations.
/// Model functions are executor-generic so the same query runs against a
/// pool or inside an open transaction; registration and verification
/// mutate several rows and must commit or roll back as one unit.
///
/// # Models
///
/// - `user`: managers and personnel, with roles and lifecycle state
/// - `company`: the registered company, owner of membership and address
/// - `address`: plain value records attached to users and companies
/// - `membership`: the company's subscription, priced from a type lookup
/// - `verification_token`: single-use email-verification artifacts
/// - `asset`: physical items assigned to personnel, with approval state
///
/// # Example
///
/// ```no_run
/// use kadro_shared::models::user::User;
/// use kadro_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let user = User::find_by_email(&pool, "manager@acme.example").await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

pub mod address;
pub mod asset;
pub mod company;
pub mod membership;
pub mod user;
pub mod verification_token;

/// Lifecycle state shared by users and verification tokens
///
/// A passive verification token is spent and never becomes active again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "record_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    /// Live record
    Active,

    /// Retired record (spent token, deactivated user)
    Passive,
}

impl RecordState {
    /// Converts state to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Active => "active",
            RecordState::Passive => "passive",
        }
    }
}
