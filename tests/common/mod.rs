#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use launchpad::application::dispatcher::Dispatcher;
use launchpad::application::engine::{PaymentEngine, PricingConfig};
use launchpad::application::leads::LeadService;
use launchpad::application::notifications::Branding;
use launchpad::application::signature;
use launchpad::domain::payment::AmountMinor;
use launchpad::domain::ports::{
    EmailTransport, GatewayOrder, OrderRequest, OutboundEmail, PaymentGateway,
    SharedDocumentRenderer,
};
use launchpad::error::{LaunchpadError, Result};
use launchpad::infrastructure::documents::{CsvInvoiceRenderer, HtmlInvoiceRenderer};
use launchpad::infrastructure::in_memory::{InMemoryLeadStore, InMemoryPaymentStore};
use launchpad::interfaces::http::{AppState, router};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "rzp_test_secret";
pub const KEY_ID: &str = "rzp_test_key";

/// Gateway double that records every order request.
#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    counter: AtomicU64,
    pub requests: Mutex<Vec<OrderRequest>>,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        if self.fail {
            return Err(LaunchpadError::GatewayError(
                "The api key provided is invalid".to_string(),
            ));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let order = GatewayOrder {
            id: format!("order_{}", n),
            amount: request.amount.value(),
            currency: request.currency.clone(),
        };
        self.requests.lock().unwrap().push(request);
        Ok(order)
    }

    fn public_key(&self) -> &str {
        KEY_ID
    }
}

/// Email transport double.
#[derive(Default)]
pub struct RecordingTransport {
    pub configured: bool,
    pub fail: bool,
    pub sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingTransport {
    pub fn working() -> Self {
        Self {
            configured: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            configured: true,
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, email: OutboundEmail) -> Result<()> {
        if self.fail {
            return Err(LaunchpadError::EmailError("SMTP connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub fn pricing() -> PricingConfig {
    PricingConfig {
        price: AmountMinor::new(99900).unwrap(),
        description: "InvoiceBolt Lifetime Access".to_string(),
        currency: "INR".to_string(),
    }
}

pub fn sign(order_id: &str, payment_id: &str) -> String {
    signature::sign(SECRET, order_id, payment_id)
}

/// Fully wired service over in-memory stores and test doubles.
pub struct Harness {
    pub engine: Arc<PaymentEngine>,
    pub leads: Arc<LeadService>,
    pub payment_store: Arc<InMemoryPaymentStore>,
    pub lead_store: Arc<InMemoryLeadStore>,
    pub gateway: Arc<FakeGateway>,
    pub transport: Arc<RecordingTransport>,
}

pub struct HarnessBuilder {
    gateway: Option<Arc<FakeGateway>>,
    transport: Arc<RecordingTransport>,
    secret: Option<&'static str>,
    require_local_record: bool,
}

impl HarnessBuilder {
    pub fn gateway(mut self, gateway: FakeGateway) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    pub fn transport(mut self, transport: RecordingTransport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn without_secret(mut self) -> Self {
        self.secret = None;
        self
    }

    pub fn require_local_record(mut self, required: bool) -> Self {
        self.require_local_record = required;
        self
    }

    pub fn build(self) -> Harness {
        let payment_store = Arc::new(InMemoryPaymentStore::new());
        let lead_store = Arc::new(InMemoryLeadStore::new());
        let gateway = self.gateway.unwrap_or_default();
        let renderers = vec![
            Arc::new(HtmlInvoiceRenderer) as SharedDocumentRenderer,
            Arc::new(CsvInvoiceRenderer) as SharedDocumentRenderer,
        ];
        let dispatcher = Arc::new(Dispatcher::new(
            self.transport.clone(),
            Branding::default(),
            renderers,
        ));

        let mut engine = PaymentEngine::new(payment_store.clone(), dispatcher.clone(), pricing())
            .with_gateway(gateway.clone())
            .require_local_record(self.require_local_record);
        if let Some(secret) = self.secret {
            engine = engine.with_signing_secret(secret);
        }

        Harness {
            engine: Arc::new(engine),
            leads: Arc::new(LeadService::new(lead_store.clone(), dispatcher)),
            payment_store,
            lead_store,
            gateway,
            transport: self.transport,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            gateway: None,
            transport: Arc::new(RecordingTransport::working()),
            secret: Some(SECRET),
            require_local_record: true,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn router(&self) -> Router {
        router(AppState {
            engine: self.engine.clone(),
            leads: self.leads.clone(),
        })
    }
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
