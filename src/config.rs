use crate::application::engine::PricingConfig;
use crate::application::notifications::Branding;
use crate::domain::payment::AmountMinor;
use crate::error::Result;
use crate::infrastructure::email::SmtpSettings;
use crate::infrastructure::razorpay::DEFAULT_API_BASE;
use clap::{ArgAction, Args};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration, read from flags or the environment.
///
/// Every value has a default; with nothing set the service runs with
/// payments and email disabled.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Address the HTTP server listens on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind_addr: SocketAddr,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[arg(long, env = "RAZORPAY_KEY_ID")]
    pub razorpay_key_id: Option<String>,

    #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
    pub razorpay_key_secret: Option<String>,

    #[arg(long, env = "RAZORPAY_API_BASE", default_value = DEFAULT_API_BASE)]
    pub razorpay_api_base: String,

    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = 10)]
    pub gateway_timeout_secs: u64,

    /// Price in rupees. Converted to paise before it reaches the gateway.
    #[arg(long, env = "PRICE_INR", default_value = "999")]
    pub price_inr: Decimal,

    #[arg(long, env = "PRODUCT_DESCRIPTION", default_value = "InvoiceBolt Lifetime Access")]
    pub product_description: String,

    #[arg(long, env = "CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Reject correctly signed callbacks whose transaction id has no record.
    #[arg(long, env = "VERIFY_REQUIRE_RECORD", default_value_t = true, action = ArgAction::Set)]
    pub verify_require_record: bool,

    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    #[arg(long, env = "SMTP_TIMEOUT_SECS", default_value_t = 15)]
    pub smtp_timeout_secs: u64,

    #[arg(long, env = "FROM_EMAIL", default_value = "InvoiceBolt <no-reply@invoicebolt.example>")]
    pub from_email: String,

    /// Defaults to the sender address.
    #[arg(long, env = "REPLY_TO")]
    pub reply_to: Option<String>,

    #[arg(long, env = "PRODUCT_NAME", default_value = "InvoiceBolt")]
    pub product_name: String,

    #[arg(long, env = "APP_ORIGIN", default_value = "https://invoicebolt.example")]
    pub app_origin: String,

    /// Defaults to the pricing section of `APP_ORIGIN`.
    #[arg(long, env = "CHECKOUT_URL")]
    pub checkout_url: Option<String>,

    #[arg(long, env = "WHATSAPP_LINK", default_value = "https://wa.me/918830981744")]
    pub whatsapp_link: String,

    #[arg(long, env = "WHATSAPP_DISPLAY", default_value = "+91 88309 81744")]
    pub whatsapp_display: String,

    #[arg(long, env = "UNSUBSCRIBE_EMAIL", default_value = "unsubscribe@invoicebolt.example")]
    pub unsubscribe_email: String,
}

impl Settings {
    pub fn pricing(&self) -> Result<PricingConfig> {
        Ok(PricingConfig {
            price: AmountMinor::from_major(self.price_inr)?,
            description: self.product_description.clone(),
            currency: self.currency.clone(),
        })
    }

    /// Key id and secret, when both are present and non-empty.
    pub fn gateway_credentials(&self) -> Option<(String, String)> {
        let key_id = non_empty(&self.razorpay_key_id)?;
        let secret = non_empty(&self.razorpay_key_secret)?;
        Some((key_id, secret))
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    /// SMTP settings when host, port, user and password are all set.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: non_empty(&self.smtp_host)?,
            port: self.smtp_port?,
            username: non_empty(&self.smtp_user)?,
            password: non_empty(&self.smtp_pass)?,
            from: self.from_email.clone(),
            reply_to: Some(self.reply_to_address()),
            timeout: Duration::from_secs(self.smtp_timeout_secs),
        })
    }

    pub fn branding(&self) -> Branding {
        let app_origin = self.app_origin.trim_end_matches('/').to_string();
        Branding {
            product_name: self.product_name.clone(),
            checkout_url: non_empty(&self.checkout_url)
                .unwrap_or_else(|| format!("{}/?startPayment=1#pricing", app_origin)),
            app_origin,
            reply_to: self.reply_to_address(),
            contact_link: self.whatsapp_link.clone(),
            contact_display: self.whatsapp_display.clone(),
            unsubscribe_email: self.unsubscribe_email.clone(),
        }
    }

    fn reply_to_address(&self) -> String {
        non_empty(&self.reply_to).unwrap_or_else(|| self.from_email.clone())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
