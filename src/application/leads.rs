use super::dispatcher::{DispatchOutcome, Dispatcher};
use super::notifications::Notification;
use crate::domain::lead::{EmailAddress, LeadRecord};
use crate::domain::ports::{LeadInsert, SharedLeadStore};
use crate::error::{LaunchpadError, Result};
use std::sync::Arc;
use tracing::info;

const MAX_UTMS_LEN: usize = 2048;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscribeLead {
    pub email: String,
    pub utms: Option<String>,
    pub first_name: Option<String>,
    /// Hidden form field. Humans leave it empty.
    pub honeypot: Option<String>,
    /// Send the invoice template resource instead of the reservation email.
    pub wants_template: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Duplicate,
    /// The honeypot was filled in; nothing was stored or sent.
    Trapped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscribed {
    pub outcome: SubscribeOutcome,
    pub notification: Option<DispatchOutcome>,
}

pub struct LeadService {
    leads: SharedLeadStore,
    dispatcher: Arc<Dispatcher>,
}

impl LeadService {
    pub fn new(leads: SharedLeadStore, dispatcher: Arc<Dispatcher>) -> Self {
        Self { leads, dispatcher }
    }

    pub async fn subscribe(&self, request: SubscribeLead) -> Result<Subscribed> {
        if request
            .honeypot
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
        {
            info!("lead honeypot triggered, discarding submission");
            return Ok(Subscribed {
                outcome: SubscribeOutcome::Trapped,
                notification: None,
            });
        }

        let email = EmailAddress::parse(&request.email)?;
        let utms = request
            .utms
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        if utms.as_ref().is_some_and(|u| u.len() > MAX_UTMS_LEN) {
            return Err(LaunchpadError::ValidationError(
                "Attribution data is too long".to_string(),
            ));
        }

        let outcome = match self
            .leads
            .insert_if_absent(LeadRecord::new(email.clone(), utms))
            .await?
        {
            LeadInsert::Created(lead) => {
                info!(lead_id = %lead.id, "lead captured");
                SubscribeOutcome::Created
            }
            LeadInsert::Existing(lead) => {
                info!(lead_id = %lead.id, "lead already registered");
                SubscribeOutcome::Duplicate
            }
        };

        let notification = if request.wants_template {
            Notification::TemplateResource {
                to: email,
                first_name: request.first_name,
            }
        } else {
            Notification::Reserved {
                to: email,
                first_name: request.first_name,
            }
        };
        let notification = self.dispatcher.dispatch(notification).await;

        Ok(Subscribed {
            outcome,
            notification: Some(notification),
        })
    }
}
