mod common;

use common::{FakeGateway, Harness, RecordingTransport, sign};
use launchpad::application::dispatcher::DispatchOutcome;
use launchpad::application::engine::{CreatePayment, CreatedOrder, VerifyPayment};
use launchpad::domain::lead::EmailAddress;
use launchpad::domain::payment::{MerchantTransactionId, PaymentStatus};
use launchpad::domain::ports::PaymentStore;
use launchpad::error::LaunchpadError;

async fn create(harness: &Harness) -> CreatedOrder {
    harness
        .engine
        .create_order(CreatePayment::default())
        .await
        .unwrap()
}

fn callback(order: &CreatedOrder, payment_id: &str, signature: String) -> VerifyPayment {
    VerifyPayment {
        gateway_order_id: order.gateway_order_id.clone(),
        gateway_payment_id: payment_id.to_string(),
        signature,
        merchant_transaction_id: order.merchant_transaction_id.clone(),
        payer_email: Some(EmailAddress::parse("buyer@example.com").unwrap()),
        first_name: Some("Asha".to_string()),
    }
}

fn valid_callback(order: &CreatedOrder) -> VerifyPayment {
    callback(order, "pay_123", sign(&order.gateway_order_id, "pay_123"))
}

#[tokio::test]
async fn test_order_uses_server_price_in_paise() {
    let harness = Harness::new();
    let order = create(&harness).await;

    assert_eq!(order.amount, 99900);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.key, common::KEY_ID);

    let requests = harness.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount.value(), 99900);
    assert_eq!(requests[0].receipt, order.merchant_transaction_id);
    assert_eq!(requests[0].notes["userId"], "anonymous");
    assert_eq!(requests[0].notes["ctaVariant"], "na");

    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
    assert_eq!(record.gateway_order_id, order.gateway_order_id);
}

#[tokio::test]
async fn test_gateway_failure_persists_nothing() {
    let harness = Harness::builder().gateway(FakeGateway::failing()).build();

    let result = harness.engine.create_order(CreatePayment::default()).await;
    assert!(matches!(result, Err(LaunchpadError::GatewayError(_))));
    assert_eq!(harness.payment_store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_verify_twice_sends_one_email() {
    let harness = Harness::new();
    let order = create(&harness).await;

    let first = harness.engine.verify(valid_callback(&order)).await.unwrap();
    assert_eq!(first.notification, Some(DispatchOutcome::Sent));

    let second = harness.engine.verify(valid_callback(&order)).await.unwrap();
    assert_eq!(second.notification, None);

    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Success);
    assert_eq!(record.gateway_payment_id.as_deref(), Some("pay_123"));
    assert_eq!(record.payment_method.as_deref(), Some("UPI/Card/NetBanking"));

    let sent = harness.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "buyer@example.com");
    assert!(sent[0].text.contains(order.merchant_transaction_id.as_str()));
}

#[tokio::test]
async fn test_tampered_signature_fails_payment() {
    let harness = Harness::new();
    let order = create(&harness).await;

    let mut signature = sign(&order.gateway_order_id, "pay_123");
    let flipped = if signature.ends_with('0') { '1' } else { '0' };
    signature.pop();
    signature.push(flipped);

    let result = harness
        .engine
        .verify(callback(&order, "pay_123", signature))
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, LaunchpadError::InvalidSignature));
    assert_eq!(err.to_string(), "Invalid signature");

    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Failed);
    assert_eq!(record.failure_reason.as_deref(), Some("invalid_signature"));
    assert!(harness.transport.sent().is_empty());
}

#[tokio::test]
async fn test_failed_payment_is_not_revived_by_valid_signature() {
    let harness = Harness::new();
    let order = create(&harness).await;

    let _ = harness
        .engine
        .verify(callback(&order, "pay_123", "deadbeef".to_string()))
        .await;
    let result = harness.engine.verify(valid_callback(&order)).await;

    assert!(matches!(
        result,
        Err(LaunchpadError::AlreadyFinalized(PaymentStatus::Failed))
    ));
    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Failed);
    assert!(harness.transport.sent().is_empty());
}

#[tokio::test]
async fn test_bad_signature_after_success_keeps_success() {
    let harness = Harness::new();
    let order = create(&harness).await;

    harness.engine.verify(valid_callback(&order)).await.unwrap();
    let result = harness
        .engine
        .verify(callback(&order, "pay_123", "00".repeat(32)))
        .await;

    assert!(matches!(result, Err(LaunchpadError::InvalidSignature)));
    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Success);
}

#[tokio::test]
async fn test_order_mismatch_leaves_record_pending() {
    let harness = Harness::new();
    let order = create(&harness).await;

    let mut request = callback(&order, "pay_123", sign("order_other", "pay_123"));
    request.gateway_order_id = "order_other".to_string();
    let result = harness.engine.verify(request).await;

    assert!(matches!(result, Err(LaunchpadError::OrderMismatch)));
    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_email_failure_does_not_fail_verification() {
    let harness = Harness::builder()
        .transport(RecordingTransport::failing())
        .build();
    let order = create(&harness).await;

    let verified = harness.engine.verify(valid_callback(&order)).await.unwrap();
    assert!(matches!(
        verified.notification,
        Some(DispatchOutcome::Failed(_))
    ));

    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Success);
}

#[tokio::test]
async fn test_unknown_transaction_requires_record_by_default() {
    let harness = Harness::new();
    let request = VerifyPayment {
        gateway_order_id: "order_x".to_string(),
        gateway_payment_id: "pay_x".to_string(),
        signature: sign("order_x", "pay_x"),
        merchant_transaction_id: MerchantTransactionId::generate(),
        payer_email: None,
        first_name: None,
    };

    let result = harness.engine.verify(request).await;
    assert!(matches!(result, Err(LaunchpadError::NotFound)));
}

#[tokio::test]
async fn test_unknown_transaction_can_be_reported_verified() {
    let harness = Harness::builder().require_local_record(false).build();
    let request = VerifyPayment {
        gateway_order_id: "order_x".to_string(),
        gateway_payment_id: "pay_x".to_string(),
        signature: sign("order_x", "pay_x"),
        merchant_transaction_id: MerchantTransactionId::generate(),
        payer_email: Some(EmailAddress::parse("buyer@example.com").unwrap()),
        first_name: None,
    };

    let verified = harness.engine.verify(request).await.unwrap();
    assert!(!verified.recorded);
    assert_eq!(verified.notification, None);
    assert_eq!(harness.payment_store.count().await.unwrap(), 0);
    assert!(harness.transport.sent().is_empty());
}

#[tokio::test]
async fn test_missing_secret_is_configuration_error() {
    let harness = Harness::builder().without_secret().build();
    let order = create(&harness).await;

    let result = harness.engine.verify(valid_callback(&order)).await;
    assert!(matches!(result, Err(LaunchpadError::ConfigurationError(_))));

    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_client_failure_report() {
    let harness = Harness::new();
    let order = create(&harness).await;

    let record = harness
        .engine
        .mark_failed(&order.merchant_transaction_id, Some("user_cancelled".to_string()))
        .await
        .unwrap();
    assert_eq!(record.status, PaymentStatus::Failed);
    assert_eq!(record.failure_reason.as_deref(), Some("user_cancelled"));
}

#[tokio::test]
async fn test_client_failure_report_cannot_undo_success() {
    let harness = Harness::new();
    let order = create(&harness).await;
    harness.engine.verify(valid_callback(&order)).await.unwrap();

    let result = harness
        .engine
        .mark_failed(&order.merchant_transaction_id, None)
        .await;
    assert!(matches!(
        result,
        Err(LaunchpadError::AlreadyFinalized(PaymentStatus::Success))
    ));
    let record = harness.engine.status(&order.merchant_transaction_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Success);
}
