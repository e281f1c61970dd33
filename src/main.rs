use clap::{Parser, Subcommand, ValueEnum};
use launchpad::application::dispatcher::Dispatcher;
use launchpad::application::engine::PaymentEngine;
use launchpad::application::leads::LeadService;
use launchpad::config::Settings;
use launchpad::domain::document::InvoiceTemplateVars;
use launchpad::domain::ports::{
    DocumentRenderer, SharedDocumentRenderer, SharedEmailTransport, SharedLeadStore,
    SharedPaymentStore,
};
use launchpad::infrastructure::documents::{CsvInvoiceRenderer, HtmlInvoiceRenderer};
use launchpad::infrastructure::email::{NoEmailTransport, SmtpTransport};
use launchpad::infrastructure::in_memory::{InMemoryLeadStore, InMemoryPaymentStore};
use launchpad::infrastructure::razorpay::RazorpayGateway;
use launchpad::interfaces::http::{AppState, router};
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve(Settings),
    /// Print the sample GST invoice template to stdout.
    RenderInvoice {
        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
        #[arg(long, env = "APP_ORIGIN", default_value = "https://invoicebolt.example")]
        app_origin: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(settings) => serve(settings).await,
        Command::RenderInvoice { format, app_origin } => render_invoice(format, &app_origin),
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let (payments, leads) = open_stores(&settings)?;

    let transport: SharedEmailTransport = match settings.smtp() {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "SMTP transport configured");
            Arc::new(SmtpTransport::new(smtp).into_diagnostic()?)
        }
        None => {
            info!("SMTP not configured, emails disabled");
            Arc::new(NoEmailTransport)
        }
    };
    let renderers = vec![
        Arc::new(HtmlInvoiceRenderer) as SharedDocumentRenderer,
        Arc::new(CsvInvoiceRenderer) as SharedDocumentRenderer,
    ];
    let dispatcher = Arc::new(Dispatcher::new(transport, settings.branding(), renderers));

    let mut engine = PaymentEngine::new(
        payments,
        dispatcher.clone(),
        settings.pricing().into_diagnostic()?,
    )
    .require_local_record(settings.verify_require_record)
    .with_signing_secret(
        settings
            .razorpay_key_secret
            .as_deref()
            .unwrap_or_default()
            .trim(),
    );
    match settings.gateway_credentials() {
        Some((key_id, secret)) => {
            let gateway = RazorpayGateway::new(
                key_id,
                secret,
                settings.razorpay_api_base.clone(),
                settings.gateway_timeout(),
            )
            .into_diagnostic()?;
            engine = engine.with_gateway(Arc::new(gateway));
        }
        None => warn!("Razorpay keys not configured, order creation is disabled"),
    }

    let app = router(AppState {
        engine: Arc::new(engine),
        leads: Arc::new(LeadService::new(leads, dispatcher)),
    });

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .into_diagnostic()?;
    info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;
    Ok(())
}

fn open_stores(settings: &Settings) -> Result<(SharedPaymentStore, SharedLeadStore)> {
    match &settings.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = launchpad::infrastructure::rocksdb::RocksDBStore::open(path)
                .into_diagnostic()?;
            info!(path = %path.display(), "using RocksDB storage");
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "built without storage-rocksdb, ignoring DB_PATH and using in-memory storage"
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

fn in_memory_stores() -> (SharedPaymentStore, SharedLeadStore) {
    (
        Arc::new(InMemoryPaymentStore::new()),
        Arc::new(InMemoryLeadStore::new()),
    )
}

fn render_invoice(format: Format, app_origin: &str) -> Result<()> {
    let vars = InvoiceTemplateVars::sample(app_origin);
    let document = match format {
        Format::Html => HtmlInvoiceRenderer.render(&vars),
        Format::Csv => CsvInvoiceRenderer.render(&vars),
    }
    .into_diagnostic()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(&document.bytes).into_diagnostic()?;
    out.flush().into_diagnostic()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
