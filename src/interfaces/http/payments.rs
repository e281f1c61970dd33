use super::AppState;
use super::error::ApiError;
use super::extract::ValidatedJson;
use crate::application::engine::{CreatePayment, VerifyPayment};
use crate::domain::lead::EmailAddress;
use crate::domain::payment::{MerchantTransactionId, PaymentRecord, PaymentStatus};
use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use validator::Validate;

/// Checkout request. Any `amount` or `description` the client sends is
/// ignored; both come from the server's pricing.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    #[validate(length(max = 128))]
    pub user_id: Option<String>,
    #[validate(length(max = 64))]
    pub cta_variant: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    pub merchant_transaction_id: String,
    pub key: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPaymentBody {
    #[validate(length(min = 1, max = 128))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1, max = 128))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1, max = 256))]
    pub razorpay_signature: String,
    #[serde(rename = "merchantTransactionId")]
    #[validate(length(min = 1, max = 64))]
    pub merchant_transaction_id: String,
    /// Payer address for the confirmation email. A malformed value only
    /// disables the email; it never fails verification.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "firstName")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentFailedBody {
    #[serde(rename = "merchantTransactionId")]
    #[validate(length(min = 1, max = 64))]
    pub merchant_transaction_id: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub id: String,
    pub merchant_transaction_id: String,
    pub amount: u64,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: Option<String>,
}

impl From<PaymentRecord> for PaymentView {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            merchant_transaction_id: record.merchant_transaction_id.to_string(),
            amount: record.amount.value(),
            status: record.status,
            payment_method: record.payment_method,
            created_at: record.created_at,
            razorpay_order_id: record.gateway_order_id,
            razorpay_payment_id: record.gateway_payment_id,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreatePaymentBody>,
) -> Result<Json<CreatePaymentResponse>, ApiError> {
    let order = state
        .engine
        .create_order(CreatePayment {
            user_id: body.user_id,
            attribution: body.cta_variant,
        })
        .await?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        order_id: order.gateway_order_id,
        amount: order.amount,
        currency: order.currency,
        merchant_transaction_id: order.merchant_transaction_id.to_string(),
        key: order.key,
    }))
}

pub async fn verify(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<VerifyPaymentBody>,
) -> Result<Json<Value>, ApiError> {
    let merchant_transaction_id = MerchantTransactionId::parse(&body.merchant_transaction_id)?;
    let payer_email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .and_then(|e| match EmailAddress::parse(e) {
            Ok(address) => Some(address),
            Err(_) => {
                warn!(merchant_transaction_id = %merchant_transaction_id, "ignoring malformed payer email");
                None
            }
        });

    state
        .engine
        .verify(VerifyPayment {
            gateway_order_id: body.razorpay_order_id,
            gateway_payment_id: body.razorpay_payment_id,
            signature: body.razorpay_signature,
            merchant_transaction_id,
            payer_email,
            first_name: body.first_name,
        })
        .await?;

    Ok(Json(json!({ "success": true, "verified": true })))
}

pub async fn failed(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<PaymentFailedBody>,
) -> Result<Json<Value>, ApiError> {
    let merchant_transaction_id = MerchantTransactionId::parse(&body.merchant_transaction_id)?;
    state
        .engine
        .mark_failed(&merchant_transaction_id, body.error)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn status(
    State(state): State<AppState>,
    Path(merchant_transaction_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let merchant_transaction_id = MerchantTransactionId::parse(&merchant_transaction_id)?;
    let record = state.engine.status(&merchant_transaction_id).await?;
    Ok(Json(
        json!({ "success": true, "payment": PaymentView::from(record) }),
    ))
}
