/// Authentication primitives for Kadro
///
/// # Modules
///
/// - [`jwt`]: Session and purpose-bound token generation and validation
/// - [`credentials`]: Deterministic credential digests used for
///   `(email, digest)` lookups
///
/// # Example
///
/// ```
/// use kadro_shared::auth::jwt::{create_token, validate_token, Claims, TokenPurpose};
/// use kadro_shared::auth::credentials::digest_password;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = digest_password("user_password");
///
/// let claims = Claims::session(Uuid::new_v4());
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod jwt;
