use super::dispatcher::{DispatchOutcome, Dispatcher};
use super::notifications::Notification;
use super::signature;
use crate::domain::lead::EmailAddress;
use crate::domain::payment::{
    AmountMinor, MerchantTransactionId, PaymentRecord, StatusTransition, TransitionOutcome,
};
use crate::domain::ports::{OrderRequest, SharedPaymentGateway, SharedPaymentStore};
use crate::error::{LaunchpadError, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Label recorded on successful payments; the checkout widget does not
/// report which instrument was used.
pub const PAYMENT_METHOD_LABEL: &str = "UPI/Card/NetBanking";

/// Server-side price list. Client-supplied amounts are never used.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub price: AmountMinor,
    pub description: String,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatePayment {
    pub user_id: Option<String>,
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub gateway_order_id: String,
    pub amount: u64,
    pub currency: String,
    pub merchant_transaction_id: MerchantTransactionId,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyPayment {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    pub merchant_transaction_id: MerchantTransactionId,
    pub payer_email: Option<EmailAddress>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayment {
    pub merchant_transaction_id: MerchantTransactionId,
    /// Whether a local record backs this verification.
    pub recorded: bool,
    /// Present only when this call moved the record to `success`.
    pub notification: Option<DispatchOutcome>,
}

/// Drives a payment from order creation through signature verification.
///
/// The store serializes transitions per merchant transaction id, and no store
/// lock is held while the gateway or the email transport is being called.
pub struct PaymentEngine {
    payments: SharedPaymentStore,
    gateway: Option<SharedPaymentGateway>,
    signing_secret: Option<String>,
    pricing: PricingConfig,
    dispatcher: Arc<Dispatcher>,
    require_local_record: bool,
}

impl PaymentEngine {
    /// Creates an engine with no gateway configured.
    ///
    /// # Arguments
    ///
    /// * `payments` - The store for payment records.
    /// * `dispatcher` - Best-effort email delivery for confirmations.
    /// * `pricing` - The trusted price and product description.
    pub fn new(
        payments: SharedPaymentStore,
        dispatcher: Arc<Dispatcher>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            payments,
            gateway: None,
            signing_secret: None,
            pricing,
            dispatcher,
            require_local_record: true,
        }
    }

    pub fn with_gateway(mut self, gateway: SharedPaymentGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = Some(secret.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// When false, a correctly signed callback for an unknown transaction id
    /// is reported as verified without touching the store.
    pub fn require_local_record(mut self, required: bool) -> Self {
        self.require_local_record = required;
        self
    }

    /// Creates a gateway order for the configured price and records it as pending.
    ///
    /// Nothing is stored unless the gateway accepted the order. A failed store
    /// write after that point is logged and the order is still returned.
    pub async fn create_order(&self, request: CreatePayment) -> Result<CreatedOrder> {
        let gateway = self.gateway.as_ref().ok_or_else(|| {
            LaunchpadError::ConfigurationError("Missing payment gateway keys".to_string())
        })?;

        let user_id = request
            .user_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let attribution = request
            .attribution
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let merchant_transaction_id = MerchantTransactionId::generate();
        let notes = BTreeMap::from([
            ("description".to_string(), self.pricing.description.clone()),
            (
                "userId".to_string(),
                user_id.clone().unwrap_or_else(|| "anonymous".to_string()),
            ),
            (
                "ctaVariant".to_string(),
                attribution.unwrap_or_else(|| "na".to_string()),
            ),
        ]);

        let order = gateway
            .create_order(OrderRequest {
                amount: self.pricing.price,
                currency: self.pricing.currency.clone(),
                receipt: merchant_transaction_id.clone(),
                notes,
            })
            .await?;

        let record = PaymentRecord::pending(
            merchant_transaction_id.clone(),
            self.pricing.price,
            self.pricing.description.clone(),
            user_id,
            order.id.clone(),
        )?;
        if let Err(e) = self.payments.insert(record).await {
            error!(
                merchant_transaction_id = %merchant_transaction_id,
                gateway_order_id = %order.id,
                error = %e,
                "gateway order created but the pending record could not be stored"
            );
        }

        info!(
            merchant_transaction_id = %merchant_transaction_id,
            gateway_order_id = %order.id,
            amount = order.amount,
            "payment order created"
        );

        Ok(CreatedOrder {
            gateway_order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            merchant_transaction_id,
            key: gateway.public_key().to_string(),
        })
    }

    /// Checks a checkout callback signature and settles the matching record.
    ///
    /// A mismatch moves the record to `failed`. A match moves it to `success`
    /// and sends the confirmation email, but only on the call that performed
    /// the transition, so repeated callbacks never send twice.
    pub async fn verify(&self, request: VerifyPayment) -> Result<VerifiedPayment> {
        let secret = self.signing_secret.as_deref().ok_or_else(|| {
            LaunchpadError::ConfigurationError("Missing payment gateway secret".to_string())
        })?;
        let mtid = request.merchant_transaction_id.clone();

        if let Some(existing) = self.payments.get(&mtid).await?
            && existing.gateway_order_id != request.gateway_order_id
        {
            warn!(
                merchant_transaction_id = %mtid,
                expected = %existing.gateway_order_id,
                received = %request.gateway_order_id,
                "callback order id does not match the payment record"
            );
            return Err(LaunchpadError::OrderMismatch);
        }

        let valid = signature::verify(
            secret,
            &request.gateway_order_id,
            &request.gateway_payment_id,
            &request.signature,
        );

        if !valid {
            let transition = StatusTransition::Fail {
                reason: "invalid_signature".to_string(),
            };
            match self.payments.transition(&mtid, transition).await? {
                Some((_, outcome)) => {
                    warn!(merchant_transaction_id = %mtid, ?outcome, "payment signature mismatch")
                }
                None => warn!(
                    merchant_transaction_id = %mtid,
                    "payment signature mismatch for unknown transaction"
                ),
            }
            return Err(LaunchpadError::InvalidSignature);
        }

        let transition = StatusTransition::Succeed {
            gateway_payment_id: request.gateway_payment_id.clone(),
            payment_method: PAYMENT_METHOD_LABEL.to_string(),
        };
        let Some((record, outcome)) = self.payments.transition(&mtid, transition).await? else {
            if self.require_local_record {
                warn!(merchant_transaction_id = %mtid, "verified callback for unknown transaction");
                return Err(LaunchpadError::NotFound);
            }
            warn!(
                merchant_transaction_id = %mtid,
                "verified callback for unknown transaction, nothing to update"
            );
            return Ok(VerifiedPayment {
                merchant_transaction_id: mtid,
                recorded: false,
                notification: None,
            });
        };

        match outcome {
            TransitionOutcome::Applied => {
                info!(
                    merchant_transaction_id = %mtid,
                    gateway_payment_id = %request.gateway_payment_id,
                    "payment verified"
                );
                let notification = self
                    .dispatcher
                    .dispatch(Notification::PaymentConfirmed {
                        to: request.payer_email,
                        first_name: request.first_name,
                        order_id: mtid.clone(),
                        amount: record.amount,
                        payment_method: PAYMENT_METHOD_LABEL.to_string(),
                        paid_at: Utc::now(),
                    })
                    .await;
                Ok(VerifiedPayment {
                    merchant_transaction_id: mtid,
                    recorded: true,
                    notification: Some(notification),
                })
            }
            TransitionOutcome::AlreadyInState => {
                info!(merchant_transaction_id = %mtid, "payment already verified");
                Ok(VerifiedPayment {
                    merchant_transaction_id: mtid,
                    recorded: true,
                    notification: None,
                })
            }
            TransitionOutcome::Rejected { current } => {
                warn!(
                    merchant_transaction_id = %mtid,
                    %current,
                    "valid signature for a payment already finalized"
                );
                Err(LaunchpadError::AlreadyFinalized(current))
            }
        }
    }

    /// Marks a payment failed on the client's say-so, without a signature.
    /// A payment that already succeeded is left untouched.
    pub async fn mark_failed(
        &self,
        mtid: &MerchantTransactionId,
        reason: Option<String>,
    ) -> Result<PaymentRecord> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "client_reported".to_string());
        let transition = StatusTransition::Fail {
            reason: reason.clone(),
        };

        match self.payments.transition(mtid, transition).await? {
            None => Err(LaunchpadError::NotFound),
            Some((_, TransitionOutcome::Rejected { current })) => {
                warn!(merchant_transaction_id = %mtid, %current, %reason, "ignoring failure report");
                Err(LaunchpadError::AlreadyFinalized(current))
            }
            Some((record, outcome)) => {
                info!(merchant_transaction_id = %mtid, ?outcome, %reason, "payment marked failed");
                Ok(record)
            }
        }
    }

    pub async fn status(&self, mtid: &MerchantTransactionId) -> Result<PaymentRecord> {
        self.payments
            .get(mtid)
            .await?
            .ok_or(LaunchpadError::NotFound)
    }
}
