use crate::domain::document::{InvoiceTemplateVars, RenderedDocument};
use crate::domain::ports::DocumentRenderer;
use crate::error::{LaunchpadError, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::io::Write;

/// Writes invoice rows as CSV.
///
/// Wraps `csv::Writer`; the header row is derived from the serde field names
/// of the first record written.
pub struct InvoiceCsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

#[derive(Serialize)]
struct InvoiceRow<'a> {
    #[serde(rename = "Invoice Number")]
    invoice_number: &'a str,
    #[serde(rename = "Invoice Date")]
    invoice_date: &'a str,
    #[serde(rename = "Due Date")]
    due_date: &'a str,
    #[serde(rename = "Business Name")]
    business_name: &'a str,
    #[serde(rename = "GSTIN")]
    business_gstin: &'a str,
    #[serde(rename = "Client Name")]
    client_name: &'a str,
    #[serde(rename = "Client Address")]
    client_address: String,
    #[serde(rename = "Description")]
    item_description: &'a str,
    #[serde(rename = "Amount")]
    amount: &'a str,
}

impl<W: Write> InvoiceCsvWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_invoice(&mut self, vars: &InvoiceTemplateVars) -> Result<()> {
        self.writer.serialize(InvoiceRow {
            invoice_number: &vars.invoice_number,
            invoice_date: &vars.invoice_date,
            due_date: &vars.due_date,
            business_name: &vars.business_name,
            business_gstin: &vars.business_gstin,
            client_name: &vars.client_name,
            client_address: format!(
                "{}, {}",
                vars.client_address_line1, vars.client_address_line2
            ),
            item_description: &vars.item_description,
            amount: &vars.amount_display,
        })?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| LaunchpadError::IoError(e.into_error()))
    }
}

pub struct CsvInvoiceRenderer;

impl DocumentRenderer for CsvInvoiceRenderer {
    fn render(&self, vars: &InvoiceTemplateVars) -> Result<RenderedDocument> {
        let mut writer = InvoiceCsvWriter::new(Vec::new());
        writer.write_invoice(vars)?;
        Ok(RenderedDocument {
            filename: "invoice.csv".to_string(),
            content_type: "text/csv".to_string(),
            bytes: writer.into_inner()?,
        })
    }
}

/// Printable single-page GST invoice.
pub struct HtmlInvoiceRenderer;

const INVOICE_CSS: &str = r#"
body { font-family: Arial, sans-serif; color: #1f2937; margin: 40px; }
h1 { font-size: 24px; margin: 0 0 4px; }
table { width: 100%; border-collapse: collapse; margin-top: 24px; }
th, td { border: 1px solid #e5e7eb; padding: 8px; text-align: left; }
.meta { color: #6b7280; font-size: 14px; }
.total { font-weight: bold; text-align: right; }
"#;

impl HtmlInvoiceRenderer {
    fn page(vars: &InvoiceTemplateVars) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { "Invoice " (vars.invoice_number) }
                    style { (PreEscaped(INVOICE_CSS)) }
                }
                body {
                    h1 { (vars.business_name) }
                    div.meta { "GSTIN: " (vars.business_gstin) }
                    h2 { "Tax Invoice " (vars.invoice_number) }
                    div.meta { "Invoice date: " (vars.invoice_date) " · Due: " (vars.due_date) }
                    h3 { "Bill to" }
                    div { (vars.client_name) }
                    div { (vars.client_address_line1) }
                    div { (vars.client_address_line2) }
                    table {
                        tr { th { "Description" } th { "Amount" } }
                        tr { td { (vars.item_description) } td { (vars.amount_display) } }
                        tr { td.total { "Total" } td { (vars.amount_display) } }
                    }
                    p { "Scan to pay via UPI:" }
                    img src=(vars.qr_url) alt="UPI QR code" width="160" height="160";
                }
            }
        }
    }
}

impl DocumentRenderer for HtmlInvoiceRenderer {
    fn render(&self, vars: &InvoiceTemplateVars) -> Result<RenderedDocument> {
        Ok(RenderedDocument {
            filename: "invoice.html".to_string(),
            content_type: "text/html".to_string(),
            bytes: Self::page(vars).into_string().into_bytes(),
        })
    }
}
