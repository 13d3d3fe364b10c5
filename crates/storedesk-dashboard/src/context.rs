//! State shared by every view

use crate::confirm::Confirm;
use crate::notify::Notifications;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use storedesk_client::{ApiClient, ClientError};
use storedesk_core::config::DashboardConfig;

/// What a user action ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The backend accepted the change
    Applied,
    /// The admin declined the confirmation; nothing was sent
    Declined,
    /// Client-side checks failed; nothing was sent
    Invalid(String),
    /// The backend or the network failed; local state is unchanged
    Failed(String),
}

impl Outcome {
    /// Whether the action went through
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Message for the admin, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Invalid(message) | Self::Failed(message) => Some(message),
            Self::Applied | Self::Declined => None,
        }
    }
}

/// Client, notification queue, confirmation seam and settings handed to each view
#[derive(Clone)]
pub struct Context {
    /// Backend client; clones share the session
    pub client: ApiClient,
    /// Notification queue
    pub notifications: Notifications,
    /// Page sizes, timers and thresholds
    pub settings: DashboardConfig,
    confirm: Arc<dyn Confirm>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("client", &self.client)
            .field("notifications", &self.notifications.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Build a context; the notification TTL comes from `settings`
    #[must_use]
    pub fn new(client: ApiClient, settings: DashboardConfig, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            client,
            notifications: Notifications::new(Duration::from_millis(settings.notification_ttl_ms)),
            settings,
            confirm,
        }
    }

    /// Ask the admin before a destructive action
    #[must_use]
    pub fn confirm(&self, prompt: &str) -> bool {
        let agreed = self.confirm.confirm(prompt);
        if !agreed {
            tracing::debug!(prompt, "action declined");
        }
        agreed
    }

    /// Queue a success notice and report the change as applied
    pub(crate) fn applied(&self, message: impl Into<String>) -> Outcome {
        self.notifications.success(message);
        Outcome::Applied
    }

    /// Queue a rejection of local input
    pub(crate) fn invalid(&self, message: impl Into<String>) -> Outcome {
        let message = message.into();
        self.notifications.error(message.clone());
        Outcome::Invalid(message)
    }

    /// Turn a failed call into an error notice
    ///
    /// Validation errors become [`Outcome::Invalid`] with their own text; anything
    /// else shows the backend message or `fallback`.
    pub(crate) fn failed(&self, err: &ClientError, fallback: &str) -> Outcome {
        if let ClientError::Validation(inner) = err {
            return self.invalid(core_message(inner));
        }
        let message = err.user_message(fallback);
        self.failed_with(err, message)
    }

    /// Like [`Self::failed`] with a message the caller already formatted
    pub(crate) fn failed_with(&self, err: &ClientError, message: String) -> Outcome {
        tracing::warn!(error = %err, %message, "action failed");
        self.notifications.error(message.clone());
        Outcome::Failed(message)
    }

    /// A fetch failed; the view keeps whatever it had
    pub(crate) fn fetch_failed(&self, err: &ClientError, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %err, %message, "fetch failed");
        self.notifications.error(message);
    }
}

/// Message of a core error without its category prefix
pub(crate) fn core_message(err: &storedesk_core::Error) -> String {
    match err {
        storedesk_core::Error::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
