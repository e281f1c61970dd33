use super::document::{InvoiceTemplateVars, RenderedDocument};
use super::lead::{EmailAddress, LeadRecord};
use super::payment::{
    AmountMinor, MerchantTransactionId, PaymentRecord, StatusTransition, TransitionOutcome,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists a new record. Fails with `Duplicate` if the merchant
    /// transaction id is already known.
    async fn insert(&self, record: PaymentRecord) -> Result<()>;
    async fn get(&self, id: &MerchantTransactionId) -> Result<Option<PaymentRecord>>;
    /// Applies `transition` atomically with respect to other writers of the
    /// same key. Returns `None` when no record matches.
    async fn transition(
        &self,
        id: &MerchantTransactionId,
        transition: StatusTransition,
    ) -> Result<Option<(PaymentRecord, TransitionOutcome)>>;
    async fn count(&self) -> Result<usize>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeadInsert {
    Created(LeadRecord),
    Existing(LeadRecord),
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Inserts the lead unless one with the same email exists.
    async fn insert_if_absent(&self, lead: LeadRecord) -> Result<LeadInsert>;
    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<LeadRecord>>;
    async fn count(&self) -> Result<usize>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub amount: AmountMinor,
    pub currency: String,
    pub receipt: MerchantTransactionId,
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder>;
    /// Key id handed to the checkout widget. Never the secret.
    fn public_key(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachments: Vec<RenderedDocument>,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Whether credentials are present. Callers skip sending when this is false.
    fn is_configured(&self) -> bool;
    async fn send(&self, email: OutboundEmail) -> Result<()>;
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, vars: &InvoiceTemplateVars) -> Result<RenderedDocument>;
}

pub type SharedPaymentStore = Arc<dyn PaymentStore>;
pub type SharedLeadStore = Arc<dyn LeadStore>;
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
pub type SharedEmailTransport = Arc<dyn EmailTransport>;
pub type SharedDocumentRenderer = Arc<dyn DocumentRenderer>;
