use crate::error::{LaunchpadError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const TXN_PREFIX: &str = "TXN";
const TXN_SUFFIX_LEN: usize = 8;
const TXN_MAX_LEN: usize = 64;

/// Locally generated correlation key for a payment.
///
/// Generated ids have the shape `TXN_<unix-millis>_<suffix>` where the suffix is
/// eight random lowercase alphanumerics. Ids coming back from clients are only
/// checked for a safe character set, since older ids may predate the suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantTransactionId(String);

impl MerchantTransactionId {
    pub fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TXN_SUFFIX_LEN)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        Self(format!(
            "{}_{}_{}",
            TXN_PREFIX,
            Utc::now().timestamp_millis(),
            suffix
        ))
    }

    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(LaunchpadError::ValidationError(
                "merchantTransactionId is required".to_string(),
            ));
        }
        if value.len() > TXN_MAX_LEN
            || !value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(LaunchpadError::ValidationError(
                "merchantTransactionId is malformed".to_string(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MerchantTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A strictly positive amount in the currency's smallest unit (paise for INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountMinor(u64);

impl AmountMinor {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LaunchpadError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    /// Converts a major-unit price (rupees) into minor units (paise).
    pub fn from_major(major: Decimal) -> Result<Self> {
        if major <= Decimal::ZERO {
            return Err(LaunchpadError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        let minor = major * dec!(100);
        if minor.fract() != Decimal::ZERO {
            return Err(LaunchpadError::ValidationError(
                "Amount has more than two decimal places".to_string(),
            ));
        }
        let minor = u64::try_from(minor).map_err(|_| {
            LaunchpadError::ValidationError("Amount is out of range".to_string())
        })?;
        Self::new(minor)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The amount back in major units, e.g. `999.00` for `99900`.
    pub fn to_major(&self) -> Decimal {
        Decimal::from(self.0) / dec!(100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The only ways a payment record may change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    Succeed {
        gateway_payment_id: String,
        payment_method: String,
    },
    Fail {
        reason: String,
    },
}

impl StatusTransition {
    pub fn target(&self) -> PaymentStatus {
        match self {
            Self::Succeed { .. } => PaymentStatus::Success,
            Self::Fail { .. } => PaymentStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The record moved from `pending` to the requested terminal state.
    Applied,
    /// The record was already in the requested terminal state; nothing changed.
    AlreadyInState,
    /// The record holds a different terminal state, which is kept.
    Rejected { current: PaymentStatus },
}

/// A locally tracked payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: Uuid,
    pub merchant_transaction_id: MerchantTransactionId,
    pub amount: AmountMinor,
    pub description: String,
    pub user_id: Option<String>,
    pub status: PaymentStatus,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn pending(
        merchant_transaction_id: MerchantTransactionId,
        amount: AmountMinor,
        description: String,
        user_id: Option<String>,
        gateway_order_id: String,
    ) -> Result<Self> {
        if description.trim().is_empty() {
            return Err(LaunchpadError::ValidationError(
                "Description is required".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            merchant_transaction_id,
            amount,
            description,
            user_id,
            status: PaymentStatus::Pending,
            gateway_order_id,
            gateway_payment_id: None,
            payment_method: None,
            failure_reason: None,
            created_at: Utc::now(),
        })
    }

    /// Applies a status transition, keeping terminal states stable.
    pub fn apply(&mut self, transition: &StatusTransition) -> TransitionOutcome {
        let target = transition.target();
        if self.status.is_terminal() {
            return if self.status == target {
                TransitionOutcome::AlreadyInState
            } else {
                TransitionOutcome::Rejected {
                    current: self.status,
                }
            };
        }

        match transition {
            StatusTransition::Succeed {
                gateway_payment_id,
                payment_method,
            } => {
                self.gateway_payment_id = Some(gateway_payment_id.clone());
                self.payment_method = Some(payment_method.clone());
            }
            StatusTransition::Fail { reason } => {
                self.failure_reason = Some(reason.clone());
            }
        }
        self.status = target;
        TransitionOutcome::Applied
    }
}
