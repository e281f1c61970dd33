use crate::domain::ports::{EmailTransport, OutboundEmail};
use crate::error::{LaunchpadError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

/// Port that selects implicit TLS instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Transport used when no SMTP credentials are configured.
///
/// Reports itself as unconfigured so the dispatcher skips composing mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmailTransport;

#[async_trait]
impl EmailTransport for NoEmailTransport {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send(&self, email: OutboundEmail) -> Result<()> {
        debug!(to = %email.to, subject = %email.subject, "email transport disabled, dropping message");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `InvoiceBolt <hello@invoicebolt.in>`.
    pub from: String,
    pub reply_to: Option<String>,
    pub timeout: Duration,
}

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    reply_to: Option<Mailbox>,
}

impl SmtpTransport {
    pub fn new(settings: SmtpSettings) -> Result<Self> {
        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| LaunchpadError::ConfigurationError(format!("SMTP relay: {}", e)))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .timeout(Some(settings.timeout))
            .build();

        let from = parse_mailbox(&settings.from)?;
        let reply_to = settings
            .reply_to
            .as_deref()
            .map(parse_mailbox)
            .transpose()?;

        Ok(Self {
            transport,
            from,
            reply_to,
        })
    }

    fn build_message(&self, email: OutboundEmail) -> Result<Message> {
        let to = parse_mailbox(email.to.as_str())?;
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }

        let alternative = MultiPart::alternative_plain_html(email.text, email.html);
        let body = if email.attachments.is_empty() {
            alternative
        } else {
            let mut mixed = MultiPart::mixed().multipart(alternative);
            for document in email.attachments {
                let content_type = ContentType::parse(&document.content_type).map_err(|e| {
                    LaunchpadError::EmailError(format!(
                        "invalid content type {}: {}",
                        document.content_type, e
                    ))
                })?;
                mixed = mixed
                    .singlepart(Attachment::new(document.filename).body(document.bytes, content_type));
            }
            mixed
        };

        builder
            .multipart(body)
            .map_err(|e| LaunchpadError::EmailError(e.to_string()))
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, email: OutboundEmail) -> Result<()> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| LaunchpadError::EmailError(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(value: &str) -> Result<Mailbox> {
    value
        .parse()
        .map_err(|e| LaunchpadError::ConfigurationError(format!("invalid mailbox {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::RenderedDocument;
    use crate::domain::lead::EmailAddress;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from: "InvoiceBolt <hello@invoicebolt.example>".to_string(),
            reply_to: Some("support@invoicebolt.example".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    fn outbound(attachments: Vec<RenderedDocument>) -> OutboundEmail {
        OutboundEmail {
            to: EmailAddress::parse("buyer@example.com").unwrap(),
            subject: "Payment confirmed".to_string(),
            html: "<p>Thanks</p>".to_string(),
            text: "Thanks".to_string(),
            attachments,
        }
    }

    #[tokio::test]
    async fn test_no_email_transport_is_unconfigured() {
        let transport = NoEmailTransport;
        assert!(!transport.is_configured());
        assert!(transport.send(outbound(Vec::new())).await.is_ok());
    }

    #[test]
    fn test_invalid_sender_is_configuration_error() {
        let mut settings = settings();
        settings.from = "not a mailbox".to_string();
        assert!(matches!(
            SmtpTransport::new(settings),
            Err(LaunchpadError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_message_carries_headers_and_alternatives() {
        let transport = SmtpTransport::new(settings()).unwrap();
        let message = transport.build_message(outbound(Vec::new())).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Payment confirmed"));
        assert!(raw.contains("To: buyer@example.com"));
        assert!(raw.contains("Reply-To: support@invoicebolt.example"));
        assert!(raw.contains("multipart/alternative"));
        assert!(!raw.contains("multipart/mixed"));
    }

    #[test]
    fn test_message_attaches_documents() {
        let transport = SmtpTransport::new(settings()).unwrap();
        let message = transport
            .build_message(outbound(vec![RenderedDocument {
                filename: "invoice.csv".to_string(),
                content_type: "text/csv".to_string(),
                bytes: b"Invoice Number\nINV-2024-001\n".to_vec(),
            }]))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("invoice.csv"));
    }
}
