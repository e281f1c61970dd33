use crate::domain::lead::{EmailAddress, LeadRecord};
use crate::domain::payment::{
    MerchantTransactionId, PaymentRecord, StatusTransition, TransitionOutcome,
};
use crate::domain::ports::{LeadInsert, LeadStore, PaymentStore};
use crate::error::{LaunchpadError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment records.
///
/// Uses `Arc<RwLock<HashMap<MerchantTransactionId, PaymentRecord>>>` so reads
/// proceed concurrently. Each transition holds the write lock only for the
/// read-modify-write of a single record, never across I/O.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<MerchantTransactionId, PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        let mut payments = self.payments.write().await;
        match payments.entry(record.merchant_transaction_id.clone()) {
            Entry::Occupied(entry) => Err(LaunchpadError::Duplicate(entry.key().to_string())),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &MerchantTransactionId) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn transition(
        &self,
        id: &MerchantTransactionId,
        transition: StatusTransition,
    ) -> Result<Option<(PaymentRecord, TransitionOutcome)>> {
        let mut payments = self.payments.write().await;
        Ok(payments.get_mut(id).map(|record| {
            let outcome = record.apply(&transition);
            (record.clone(), outcome)
        }))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.payments.read().await.len())
    }
}

/// A thread-safe in-memory store for leads, keyed by normalised email.
#[derive(Default, Clone)]
pub struct InMemoryLeadStore {
    leads: Arc<RwLock<HashMap<EmailAddress, LeadRecord>>>,
}

impl InMemoryLeadStore {
    /// Creates a new, empty in-memory lead store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert_if_absent(&self, lead: LeadRecord) -> Result<LeadInsert> {
        let mut leads = self.leads.write().await;
        match leads.entry(lead.email.clone()) {
            Entry::Occupied(entry) => Ok(LeadInsert::Existing(entry.get().clone())),
            Entry::Vacant(entry) => Ok(LeadInsert::Created(entry.insert(lead).clone())),
        }
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<LeadRecord>> {
        let leads = self.leads.read().await;
        Ok(leads.get(email).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.leads.read().await.len())
    }
}
