//! Adapters for the domain ports: storage backends, the payment gateway,
//! SMTP delivery and invoice document renderers.

pub mod documents;
pub mod email;
pub mod in_memory;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
