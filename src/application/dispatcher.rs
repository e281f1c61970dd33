use super::notifications::{Branding, Notification, compose};
use crate::domain::document::{InvoiceTemplateVars, RenderedDocument};
use crate::domain::ports::{SharedDocumentRenderer, SharedEmailTransport};
use crate::error::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TransportNotConfigured,
    NoRecipient,
}

/// Result of a best-effort delivery attempt.
///
/// Never converted into the outcome of the operation that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped(SkipReason),
    Failed(String),
}

/// Sends transactional emails without ever failing the caller.
pub struct Dispatcher {
    transport: SharedEmailTransport,
    branding: Branding,
    renderers: Vec<SharedDocumentRenderer>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        transport: SharedEmailTransport,
        branding: Branding,
        renderers: Vec<SharedDocumentRenderer>,
    ) -> Self {
        Self {
            transport,
            branding,
            renderers,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Composes and sends `notification`, logging and swallowing any failure.
    pub async fn dispatch(&self, notification: Notification) -> DispatchOutcome {
        let kind = notification.kind();
        if !self.transport.is_configured() {
            debug!(kind, "email transport not configured, skipping");
            return DispatchOutcome::Skipped(SkipReason::TransportNotConfigured);
        }

        let attachments = if notification.wants_attachments() {
            match self.render_attachments() {
                Ok(attachments) => attachments,
                Err(e) => {
                    warn!(kind, error = %e, "failed to render email attachments");
                    return DispatchOutcome::Failed(e.to_string());
                }
            }
        } else {
            Vec::new()
        };

        let Some(email) = compose(&self.branding, &notification, attachments) else {
            debug!(kind, "no recipient, skipping");
            return DispatchOutcome::Skipped(SkipReason::NoRecipient);
        };
        let to = email.to.clone();

        match tokio::time::timeout(self.send_timeout, self.transport.send(email)).await {
            Ok(Ok(())) => {
                info!(kind, to = %to, "email sent");
                DispatchOutcome::Sent
            }
            Ok(Err(e)) => {
                warn!(kind, to = %to, error = %e, "email send failed");
                DispatchOutcome::Failed(e.to_string())
            }
            Err(_) => {
                warn!(kind, to = %to, timeout = ?self.send_timeout, "email send timed out");
                DispatchOutcome::Failed("timed out".to_string())
            }
        }
    }

    fn render_attachments(&self) -> Result<Vec<RenderedDocument>> {
        let vars = InvoiceTemplateVars::sample(&self.branding.app_origin);
        self.renderers
            .iter()
            .map(|renderer| renderer.render(&vars))
            .collect()
    }
}
