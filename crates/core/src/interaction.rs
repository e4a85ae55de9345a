//! User interaction collaborators.
//!
//! The coordinator asks for confirmation before destructive actions and
//! reports outcomes through a notifier. Presentation layers provide their own
//! implementations; the ones here are non-interactive.

use async_trait::async_trait;
use tracing::{error, info};

/// Asks the user a yes/no question.
#[async_trait]
pub trait Confirmation: Send + Sync {
    /// Returns `true` if the user accepted.
    async fn confirm(&self, title: &str, body: &str) -> bool;
}

/// Reports the outcome of an action to the user.
pub trait Notifier: Send + Sync {
    /// Report a successful action.
    fn success(&self, message: &str);

    /// Report a failed action.
    fn error(&self, message: &str);
}

/// Confirmation that answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm {
    answer: bool,
}

impl AutoConfirm {
    /// Accept every question.
    #[must_use]
    pub fn accept() -> Self {
        Self { answer: true }
    }

    /// Decline every question.
    #[must_use]
    pub fn decline() -> Self {
        Self { answer: false }
    }
}

impl Default for AutoConfirm {
    fn default() -> Self {
        Self::accept()
    }
}

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, title: &str, body: &str) -> bool {
        info!(title, body, answer = self.answer, "auto confirmation");
        self.answer
    }
}

/// Notifier writing messages as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(message, "success");
    }

    fn error(&self, message: &str) {
        error!(message, "error");
    }
}
