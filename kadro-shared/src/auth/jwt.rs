/// Token service: session and purpose-bound tokens
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256). Every token carries a
/// structured claims payload (subject id, purpose, issued-at and expiry),
/// so callers decode expiry via the schema rather than slicing the token
/// string at a fixed offset.
///
/// # Token purposes
///
/// - **Session**: long-lived (30 days), authenticates API requests
/// - **Verification**: short-lived (24 hours), sent in the account
///   verification email; also persisted in the verification token store
///   for single-use tracking
/// - **PasswordReset**: short-lived (30 minutes), sent in the reset email
///
/// # Example
///
/// ```
/// use kadro_shared::auth::jwt::{create_token, validate_token, Claims, TokenPurpose};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let subject = Uuid::new_v4();
/// let secret = "secret-key-at-least-32-bytes-long!!";
///
/// let claims = Claims::session(subject);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, subject);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format, or issuer check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token purpose does not match what the caller expected
    #[error("Wrong token purpose: expected {expected}, got {actual}")]
    WrongPurpose {
        expected: &'static str,
        actual: &'static str,
    },
}

/// What a token is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Long-lived API session token
    Session,

    /// Email verification token (one workflow, one use)
    Verification,

    /// Password reset token
    PasswordReset,
}

impl TokenPurpose {
    /// Default lifetime for this purpose
    pub fn default_lifetime(&self) -> Duration {
        match self {
            TokenPurpose::Session => Duration::days(30),
            TokenPurpose::Verification => Duration::hours(24),
            TokenPurpose::PasswordReset => Duration::minutes(30),
        }
    }

    /// Purpose as a string, used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Session => "session",
            TokenPurpose::Verification => "verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// JWT claims structure
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`, `jti`) plus the
/// Kadro `purpose` claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id for sessions and resets, company id for verification
    pub sub: Uuid,

    /// Issuer, always "kadro"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token id, fresh per issue
    ///
    /// Keeps two tokens for the same subject distinct even when issued
    /// within the same second; the verification store indexes the token
    /// string uniquely and re-dispatch must always insert a new row.
    pub jti: Uuid,

    /// Token purpose (custom claim)
    pub purpose: TokenPurpose,
}

impl Claims {
    /// Creates claims with the purpose's default lifetime
    pub fn new(subject: Uuid, purpose: TokenPurpose) -> Self {
        Self::with_lifetime(subject, purpose, purpose.default_lifetime())
    }

    /// Creates session claims for an authenticated subject
    pub fn session(subject: Uuid) -> Self {
        Self::new(subject, TokenPurpose::Session)
    }

    /// Creates claims with an explicit lifetime
    pub fn with_lifetime(subject: Uuid, purpose: TokenPurpose, lifetime: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + lifetime;

        Self {
            sub: subject,
            iss: "kadro".to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4(),
            purpose,
        }
    }

    /// Checks if the embedded expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Expiry as a UTC instant, for persistence alongside the token string
    pub fn expires_at(&self) -> chrono::DateTime<Utc> {
        chrono::DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Creates a signed token from claims
///
/// Pure function of the signing secret and the claims; no side effects.
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies signature, expiry, not-before, and that the issuer is "kadro".
/// Callers must separately check the purpose via [`validate_purpose_token`]
/// or [`validate_session_token`].
///
/// # Errors
///
/// - `TokenError::Expired` if the embedded expiry has passed
/// - `TokenError::ValidationError` for any signature/format/issuer failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["kadro"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks it's a session token
pub fn validate_session_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    validate_purpose_token(token, secret, TokenPurpose::Session)
}

/// Validates a token and checks it carries the expected purpose
///
/// A verification token presented to the password-reset endpoint (or vice
/// versa) fails here even though its signature is valid.
pub fn validate_purpose_token(
    token: &str,
    secret: &str,
    expected: TokenPurpose,
) -> Result<Claims, TokenError> {
    let claims = validate_token(token, secret)?;

    if claims.purpose != expected {
        return Err(TokenError::WrongPurpose {
            expected: expected.as_str(),
            actual: claims.purpose.as_str(),
        });
    }

    Ok(claims)
}
