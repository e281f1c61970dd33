use crate::domain::ports::{GatewayOrder, OrderRequest, PaymentGateway};
use crate::error::{LaunchpadError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com";

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: u64,
    currency: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    description: Option<String>,
}

/// Razorpay Orders API client.
///
/// Authenticates with the key id / key secret pair over HTTP basic auth.
/// Every request is bounded by the client timeout.
pub struct RazorpayGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LaunchpadError::ConfigurationError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        let url = format!("{}/v1/orders", self.api_base);
        let body = CreateOrderBody {
            amount: request.amount.value(),
            currency: &request.currency,
            receipt: request.receipt.as_str(),
            notes: &request.notes,
        };
        debug!(receipt = %request.receipt, amount = body.amount, "creating gateway order");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| LaunchpadError::GatewayError(format!("order request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let description = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.description)
                .unwrap_or_else(|| status.to_string());
            return Err(LaunchpadError::GatewayError(description));
        }

        let order: OrderResponse = response.json().await.map_err(|e| {
            LaunchpadError::GatewayError(format!("malformed order response: {}", e))
        })?;
        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    fn public_key(&self) -> &str {
        &self.key_id
    }
}
