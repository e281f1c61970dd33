//! Domain entities and the ports through which the application layer reaches
//! storage, the payment gateway, email delivery and document rendering.

pub mod document;
pub mod lead;
pub mod payment;
pub mod ports;
