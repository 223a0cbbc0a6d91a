/// Database layer
///
/// # Modules
///
/// - [`pool`]: PostgreSQL connection pool creation and health checks
/// - [`migrations`]: Embedded sqlx migration runner

pub mod migrations;
pub mod pool;
