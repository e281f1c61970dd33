//! Application layer containing the core business logic orchestration.
//!
//! `PaymentEngine` drives the payment lifecycle (order creation, signature
//! verification, status transitions) and `LeadService` handles lead capture.
//! Both hand confirmation emails to the `Dispatcher`, whose outcome never
//! changes the result of the operation that triggered it.

pub mod dispatcher;
pub mod engine;
pub mod leads;
pub mod notifications;
pub mod signature;
