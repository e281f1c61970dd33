//! Transactional email content. Each notification renders to a subject, a
//! branded HTML body and a plaintext alternative.

use crate::domain::document::RenderedDocument;
use crate::domain::lead::EmailAddress;
use crate::domain::payment::{AmountMinor, MerchantTransactionId};
use crate::domain::ports::OutboundEmail;
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, html};
use rust_decimal::Decimal;

/// Product and contact details shown in every email.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub product_name: String,
    pub app_origin: String,
    pub reply_to: String,
    pub checkout_url: String,
    pub contact_link: String,
    pub contact_display: String,
    pub unsubscribe_email: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            product_name: "InvoiceBolt".to_string(),
            app_origin: "https://invoicebolt.example".to_string(),
            reply_to: "support@invoicebolt.example".to_string(),
            checkout_url: "https://invoicebolt.example/?startPayment=1#pricing".to_string(),
            contact_link: "https://wa.me/918830981744".to_string(),
            contact_display: "+91 88309 81744".to_string(),
            unsubscribe_email: "unsubscribe@invoicebolt.example".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PaymentConfirmed {
        to: Option<EmailAddress>,
        first_name: Option<String>,
        order_id: MerchantTransactionId,
        amount: AmountMinor,
        payment_method: String,
        paid_at: DateTime<Utc>,
    },
    Reserved {
        to: EmailAddress,
        first_name: Option<String>,
    },
    TemplateResource {
        to: EmailAddress,
        first_name: Option<String>,
    },
}

impl Notification {
    pub fn recipient(&self) -> Option<&EmailAddress> {
        match self {
            Self::PaymentConfirmed { to, .. } => to.as_ref(),
            Self::Reserved { to, .. } | Self::TemplateResource { to, .. } => Some(to),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PaymentConfirmed { .. } => "payment_confirmed",
            Self::Reserved { .. } => "reserved",
            Self::TemplateResource { .. } => "template_resource",
        }
    }

    pub fn wants_attachments(&self) -> bool {
        matches!(self, Self::TemplateResource { .. })
    }
}

/// Formats minor units as a rupee string: `₹999` or `₹9.50`.
pub fn format_inr(amount: AmountMinor) -> String {
    let major = amount.to_major();
    if major.fract() == Decimal::ZERO {
        format!("₹{}", major.normalize())
    } else {
        format!("₹{:.2}", major)
    }
}

const MUTED: &str = "color:#6b7280";
const HEADING: &str = "margin:16px 0 8px;font-size:22px";

fn first_name_or_default(first_name: &Option<String>) -> String {
    first_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("there")
        .to_string()
}

/// Wraps `body` in the branded email layout. `preheader` is the hidden
/// inbox preview line.
fn shell(branding: &Branding, title: &str, preheader: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width";
                title { (title) }
            }
            body style="margin:0;background:#f6f7fb;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;color:#111827" {
                span style="display:none!important;visibility:hidden;opacity:0;color:transparent;height:0;width:0;overflow:hidden" {
                    (preheader)
                }
                table role="presentation" cellspacing="0" cellpadding="0" border="0" style="max-width:600px;margin:0 auto;background:#fff" {
                    tr {
                        td style="padding:24px" {
                            div { span style="font-weight:700" { (branding.product_name) } }
                            (body)
                            div style="height:1px;background:#e5e7eb;margin:24px 0" {}
                            p style="font-size:12px;color:#6b7280" {
                                "© " (branding.product_name) " · "
                                a href=(branding.app_origin) style="color:#4f46e5" { (branding.app_origin) }
                                br;
                                "Not tax advice · 7-day refund policy · Unsubscribe: " (branding.unsubscribe_email)
                            }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

fn button(href: &str, label: &str, color: &str) -> Markup {
    let style = format!(
        "display:inline-block;background:{};color:#ffffff;text-decoration:none;padding:12px 18px;border-radius:10px;font-weight:600",
        color
    );
    html! {
        p style="margin:12px 0 8px" {
            a href=(href) style=(style) { (label) }
        }
    }
}

fn detail_row(label: &str, value: &str) -> Markup {
    html! {
        tr {
            td style="padding:8px 0;border-bottom:1px solid #e5e7eb" { (label) }
            td style="text-align:right;border-bottom:1px solid #e5e7eb" { (value) }
        }
    }
}

/// Builds the outbound message for `notification`. Returns `None` when the
/// notification has no recipient.
pub fn compose(
    branding: &Branding,
    notification: &Notification,
    attachments: Vec<RenderedDocument>,
) -> Option<OutboundEmail> {
    let to = notification.recipient()?.clone();
    let (subject, html, text) = match notification {
        Notification::PaymentConfirmed {
            first_name,
            order_id,
            amount,
            payment_method,
            paid_at,
            ..
        } => {
            let name = first_name_or_default(first_name);
            let amount = format_inr(*amount);
            let paid_at = paid_at.format("%d %b %Y, %H:%M UTC").to_string();
            let subject = "Payment confirmed - your spot is reserved".to_string();
            let body = html! {
                h1 style=(HEADING) { "Thanks, " (name) "! Your payment is confirmed" }
                p style=(MUTED) {
                    "We've reserved your lifetime access. When the app is live, we'll email setup instructions and your dashboard link."
                }
                table role="presentation" style="width:100%;border-collapse:collapse" {
                    (detail_row("Order", order_id.as_str()))
                    (detail_row("Amount", &amount))
                    (detail_row("Method", payment_method))
                    (detail_row("Paid at", &paid_at))
                }
                (button(&branding.contact_link, "Chat on WhatsApp", "#22c55e"))
                p style=(MUTED) {
                    "Or reply to this email · " (branding.reply_to) " · WhatsApp: " (branding.contact_display)
                }
            };
            let html = shell(
                branding,
                &subject,
                &format!("Thanks {name} - your payment is confirmed."),
                body,
            );
            let text = format!(
                "Thanks {name}! Your payment is confirmed. Order {order} Amount {amount} Method {payment_method} Paid at {paid_at}. \
                 We'll share access details when the app is live. WhatsApp: {display} {link}",
                order = order_id,
                display = branding.contact_display,
                link = branding.contact_link,
            );
            (subject, html, text)
        }
        Notification::Reserved { first_name, .. } => {
            let name = first_name_or_default(first_name);
            let subject = "You're on the list - we'll notify you when it's live".to_string();
            let body = html! {
                h1 style=(HEADING) { "Thanks, " (name) "! Your spot is reserved" }
                p style=(MUTED) {
                    "We'll email you as soon as " (branding.product_name) " is live with your setup guide and early-access details."
                }
                p style=(MUTED) { "If you intended to pay now, you can complete checkout anytime:" }
                (button(&branding.checkout_url, "Go to Checkout", "#4f46e5"))
                (button(&branding.contact_link, "Chat on WhatsApp", "#22c55e"))
                p style=(MUTED) {
                    "Questions? Reply to this email or write to " (branding.reply_to) ". WhatsApp: " (branding.contact_display) "."
                }
            };
            let html = shell(
                branding,
                &subject,
                &format!("Thanks {name} - your spot is reserved."),
                body,
            );
            let text = format!(
                "Thanks {name}! Your spot is reserved. We'll notify you when {product} is live. Checkout: {checkout}. WhatsApp: {display} {link}",
                product = branding.product_name,
                checkout = branding.checkout_url,
                display = branding.contact_display,
                link = branding.contact_link,
            );
            (subject, html, text)
        }
        Notification::TemplateResource { first_name, .. } => {
            let name = first_name_or_default(first_name);
            let subject = format!("Your free GST invoice template from {}", branding.product_name);
            let body = html! {
                h1 style=(HEADING) { "Here's your invoice template, " (name) }
                p style=(MUTED) {
                    "The attached HTML and CSV files match the invoice layout " (branding.product_name)
                    " generates. Open the HTML in a browser to print or save as PDF."
                }
                p style=(MUTED) { "Want invoices sent and chased for you?" }
                (button(&branding.checkout_url, "Reserve lifetime access", "#4f46e5"))
                p style=(MUTED) {
                    "Questions? Reply to this email or write to " (branding.reply_to) "."
                }
            };
            let html = shell(
                branding,
                &subject,
                &format!("Thanks {name} - your invoice template is attached."),
                body,
            );
            let text = format!(
                "Thanks {name}! Your invoice template is attached as HTML and CSV. Reserve lifetime access: {checkout}",
                checkout = branding.checkout_url,
            );
            (subject, html, text)
        }
    };

    Some(OutboundEmail {
        to,
        subject,
        html,
        text,
        attachments,
    })
}
