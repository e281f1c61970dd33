use serde::{Deserialize, Serialize};

/// Values interpolated into the sample invoice template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTemplateVars {
    pub invoice_number: String,
    pub business_name: String,
    pub business_gstin: String,
    pub client_name: String,
    pub client_address_line1: String,
    pub client_address_line2: String,
    pub invoice_date: String,
    pub due_date: String,
    pub item_description: String,
    /// Display amount, e.g. `INR 999`.
    pub amount_display: String,
    /// Absolute URL of the UPI QR image.
    pub qr_url: String,
}

impl InvoiceTemplateVars {
    /// The sample invoice attached to resource emails and printed by the CLI.
    pub fn sample(app_origin: &str) -> Self {
        Self {
            invoice_number: "INV-2024-001".to_string(),
            business_name: "Sharma Design Studio".to_string(),
            business_gstin: "27ABCDE1234F1Z5".to_string(),
            client_name: "Acme Retail Pvt Ltd".to_string(),
            client_address_line1: "12 MG Road".to_string(),
            client_address_line2: "Pune, Maharashtra 411001".to_string(),
            invoice_date: "01 Jan 2024".to_string(),
            due_date: "15 Jan 2024".to_string(),
            item_description: "Brand identity design".to_string(),
            amount_display: "INR 999".to_string(),
            qr_url: format!("{}/upi-qr.png", app_origin.trim_end_matches('/')),
        }
    }
}

/// Output of a document renderer, ready to attach to an email.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
