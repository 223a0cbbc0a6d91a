/// Uniform response envelope
///
/// Every documented success path returns HTTP 200 with this envelope:
/// `{code, success, message, data}`. Errors carry the same shape with
/// `success = false` and no data (see `error.rs`).
///
/// # Example
///
/// ```
/// use kadro_api::response::Envelope;
///
/// let ok = Envelope::ok("Login successful", "token-string");
/// assert!(ok.success);
/// assert_eq!(ok.code, 200);
/// ```

use serde::{Deserialize, Serialize};

/// Response envelope wrapping every operation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// HTTP-style status code, 200 on success paths
    pub code: u16,

    /// Whether the operation succeeded
    pub success: bool,

    /// Human-readable message
    pub message: String,

    /// Operation payload, absent on failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success envelope with payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Success envelope without payload
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
