use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use landreg::config::AppConfig;
use landreg::error::AppError;
use landreg::registration::{
    compute_fee, format_zmw, registration_router, FeeInputs, PolicyTable, RegistrationService,
    RegistrationType, SubmissionError, SubmissionGateway, SubmissionPayload, SubmissionReceipt,
};
use landreg::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Land Registration Desk",
    about = "Run the land registration rule engine from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the fee summary for a registration type and monetary inputs
    Quote(QuoteArgs),
    /// List the document requirements for a registration type
    Requirements(RequirementsArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Registration type key (e.g. transfer, mortgage, lease)
    #[arg(long)]
    registration_type: String,
    /// Declared property value
    #[arg(long, default_value_t = 0.0)]
    declared_value: f64,
    /// Amount secured by the mortgage
    #[arg(long, default_value_t = 0.0)]
    secured_amount: f64,
    /// Annual rent under the lease
    #[arg(long, default_value_t = 0.0)]
    annual_rent: f64,
}

#[derive(Args, Debug)]
struct RequirementsArgs {
    /// Registration type key (e.g. transfer, mortgage, lease)
    #[arg(long)]
    registration_type: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Quote(args) => {
            run_quote(args);
            Ok(())
        }
        Command::Requirements(args) => {
            run_requirements(args);
            Ok(())
        }
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let gateway = Arc::new(ReceiptLogGateway::default());
    let service = Arc::new(RegistrationService::new(gateway));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(registration_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, region = %config.registry.region, "land registration desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_quote(args: QuoteArgs) {
    let table = PolicyTable::standard();
    let inputs = FeeInputs {
        declared_value: args.declared_value,
        secured_amount: args.secured_amount,
        annual_rent: args.annual_rent,
    };

    match table.lookup_key(&args.registration_type) {
        Some((registration_type, policy)) => {
            let quote = compute_fee(policy, &inputs);
            println!("{} ({})", policy.description, registration_type.key());
            if let Some(category) = policy.category {
                println!("Category {}: {}", category.label(), policy.fee_basis_label());
            } else {
                println!("Fee basis: {}", policy.fee_basis_label());
            }
            println!("Registration fee: {}", format_zmw(quote.registration_fee));
            println!("Total payable:    {}", format_zmw(quote.total_payable));
        }
        None => {
            println!(
                "Unknown registration type '{}'. Known types:",
                args.registration_type
            );
            for registration_type in RegistrationType::ALL {
                println!("- {}", registration_type.key());
            }
        }
    }
}

fn run_requirements(args: RequirementsArgs) {
    let table = PolicyTable::standard();
    let resolved = landreg::registration::resolve(&table, &args.registration_type);

    if resolved.is_hidden() {
        println!(
            "No requirements: '{}' is not a known registration type.",
            args.registration_type
        );
        return;
    }

    println!("Requirements for {}", args.registration_type);
    for key in &resolved.visible {
        let marker = if resolved.required.contains(key) {
            "required"
        } else {
            "optional"
        };
        println!("- {} ({marker})", key.key());
    }
}

/// Demo submission boundary: acknowledges every payload with a sequential
/// reference and logs it. A production deployment points this trait at the
/// registry backend instead.
#[derive(Default)]
struct ReceiptLogGateway {
    sequence: AtomicU64,
}

impl SubmissionGateway for ReceiptLogGateway {
    fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = format!("LR-{id:06}");
        info!(
            %reference,
            registration_type = payload.registration_type,
            payment_amount = %payload.payment_amount,
            "application accepted"
        );
        Ok(SubmissionReceipt {
            reference,
            message: "Land application submitted successfully!".to_string(),
        })
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
