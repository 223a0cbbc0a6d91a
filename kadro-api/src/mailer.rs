/// Mail sender port
///
/// The identity workflow fans out to an external mail sender at
/// registration, at mail-unverified login, and on password-reset requests.
/// Transport mechanics are out of scope, so the workflow only sees this
/// trait: a synchronous call, fire-and-forget from the workflow's
/// perspective, and never part of a transaction boundary.
///
/// Two implementations ship here: [`LogMailer`] (logs the dispatch, the
/// development default) and [`RecordingMailer`] (captures dispatches so
/// tests can assert on exact send counts).

use async_trait::async_trait;
use std::sync::Mutex;

/// Mail sender error type
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// The transport rejected or failed the dispatch
    #[error("Mail dispatch failed: {0}")]
    DispatchFailed(String),
}

/// A dispatched mail, as seen by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMail {
    /// Account verification mail carrying a verification token
    Verification { to: String, token: String },

    /// Password reset mail carrying a reset token
    PasswordReset { to: String, token: String },
}

/// Mail sender contract consumed by the identity workflow
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the account verification mail
    async fn send_verification(&self, to: &str, token: &str) -> Result<(), MailerError>;

    /// Sends the password reset mail
    async fn send_reset(&self, to: &str, token: &str) -> Result<(), MailerError>;
}

/// Mailer that logs dispatches via tracing
///
/// Used in development and wherever no real transport is configured; the
/// token lands in the log so the flow stays exercisable end to end.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, token: &str) -> Result<(), MailerError> {
        tracing::info!(to = %to, token = %token, "Dispatching verification mail");
        Ok(())
    }

    async fn send_reset(&self, to: &str, token: &str) -> Result<(), MailerError> {
        tracing::info!(to = %to, token = %token, "Dispatching password reset mail");
        Ok(())
    }
}

/// Mailer that records every dispatch in memory
///
/// Test double: workflow tests assert on the exact number and content of
/// dispatches (e.g., exactly one fresh verification mail per unverified
/// login attempt).
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundMail>>,
}

impl RecordingMailer {
    /// Creates an empty recording mailer
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything dispatched so far
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of dispatches so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, to: &str, token: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(OutboundMail::Verification {
            to: to.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn send_reset(&self, to: &str, token: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(OutboundMail::PasswordReset {
            to: to.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}
