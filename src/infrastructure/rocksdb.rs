use crate::domain::lead::{EmailAddress, LeadRecord};
use crate::domain::payment::{
    MerchantTransactionId, PaymentRecord, StatusTransition, TransitionOutcome,
};
use crate::domain::ports::{LeadInsert, LeadStore, PaymentStore};
use crate::error::{LaunchpadError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for storing leads.
pub const CF_LEADS: &str = "leads";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `PaymentRecord` and `LeadRecord` entities using
/// separate Column Families. Read-modify-write sequences (inserts that must
/// not overwrite, status transitions) run under a single writer lock so that
/// duplicate callbacks settle deterministically.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("payments" and "leads") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let cf_leads = ColumnFamilyDescriptor::new(CF_LEADS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments, cf_leads])?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    LaunchpadError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Deserialization error: {}", e),
                    )))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value).map_err(|e| {
            LaunchpadError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn count_cf(&self, cf_name: &str) -> Result<usize> {
        let cf = self.cf(cf_name)?;
        let mut count = 0;
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LaunchpadError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        let _guard = self.writer.lock().await;
        let key = record.merchant_transaction_id.as_str().as_bytes();
        if self.read::<PaymentRecord>(CF_PAYMENTS, key)?.is_some() {
            return Err(LaunchpadError::Duplicate(
                record.merchant_transaction_id.to_string(),
            ));
        }
        self.write(CF_PAYMENTS, key, &record)
    }

    async fn get(&self, id: &MerchantTransactionId) -> Result<Option<PaymentRecord>> {
        self.read(CF_PAYMENTS, id.as_str().as_bytes())
    }

    async fn transition(
        &self,
        id: &MerchantTransactionId,
        transition: StatusTransition,
    ) -> Result<Option<(PaymentRecord, TransitionOutcome)>> {
        let _guard = self.writer.lock().await;
        let key = id.as_str().as_bytes();
        let Some(mut record) = self.read::<PaymentRecord>(CF_PAYMENTS, key)? else {
            return Ok(None);
        };
        let outcome = record.apply(&transition);
        if outcome == TransitionOutcome::Applied {
            self.write(CF_PAYMENTS, key, &record)?;
        }
        Ok(Some((record, outcome)))
    }

    async fn count(&self) -> Result<usize> {
        self.count_cf(CF_PAYMENTS)
    }
}

#[async_trait]
impl LeadStore for RocksDBStore {
    async fn insert_if_absent(&self, lead: LeadRecord) -> Result<LeadInsert> {
        let _guard = self.writer.lock().await;
        let key = lead.email.as_str().as_bytes();
        if let Some(existing) = self.read::<LeadRecord>(CF_LEADS, key)? {
            return Ok(LeadInsert::Existing(existing));
        }
        self.write(CF_LEADS, key, &lead)?;
        Ok(LeadInsert::Created(lead))
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<LeadRecord>> {
        self.read(CF_LEADS, email.as_str().as_bytes())
    }

    async fn count(&self) -> Result<usize> {
        self.count_cf(CF_LEADS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{AmountMinor, PaymentStatus};
    use tempfile::tempdir;

    fn pending(mtid: &MerchantTransactionId) -> PaymentRecord {
        PaymentRecord::pending(
            mtid.clone(),
            AmountMinor::new(99900).unwrap(),
            "Lifetime Access".to_string(),
            Some("user-1".to_string()),
            "order_1".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        // Verify CFs exist
        assert!(store.db.cf_handle(CF_PAYMENTS).is_some());
        assert!(store.db.cf_handle(CF_LEADS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_payment_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let mtid = MerchantTransactionId::generate();
        let record = pending(&mtid);

        PaymentStore::insert(&store, record.clone()).await.unwrap();
        assert!(matches!(
            PaymentStore::insert(&store, record.clone()).await,
            Err(LaunchpadError::Duplicate(_))
        ));

        let retrieved = PaymentStore::get(&store, &mtid).await.unwrap().unwrap();
        assert_eq!(retrieved, record);

        let (_, outcome) = store
            .transition(
                &mtid,
                StatusTransition::Fail {
                    reason: "dismissed".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::Applied);

        let retrieved = PaymentStore::get(&store, &mtid).await.unwrap().unwrap();
        assert_eq!(retrieved.status, PaymentStatus::Failed);
        assert_eq!(PaymentStore::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_lead_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let email = EmailAddress::parse("lead@example.com").unwrap();

        let first = store
            .insert_if_absent(LeadRecord::new(email.clone(), None))
            .await
            .unwrap();
        assert!(matches!(first, LeadInsert::Created(_)));

        let second = store
            .insert_if_absent(LeadRecord::new(email.clone(), None))
            .await
            .unwrap();
        assert!(matches!(second, LeadInsert::Existing(_)));
        assert_eq!(LeadStore::count(&store).await.unwrap(), 1);
    }
}
