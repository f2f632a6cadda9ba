use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use aqi_airnow::AirNowClient;
use aqi_config::AppConfig;
use aqi_core::{AlertNotifier, Pipeline, PipelineError, Pollutant};
use aqi_obs::LogFormat;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(name = "aqi")]
#[command(about = "Current air quality by ZIP code, from AirNow")]
struct Args {
    /// Emit JSON log lines instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print current observations
    Lookup {
        /// ZIP code; falls back to [preferences].zip_code
        zip: Option<String>,

        /// Alert when AQI is above this value
        #[arg(long)]
        threshold: Option<i32>,

        /// Show the detail view for one pollutant (e.g. "PM2.5")
        #[arg(long)]
        detail: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve lookups over HTTP
    Serve {
        /// Bind address; falls back to [http].bind
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    aqi_obs::init("aqi", format);

    let cfg = AppConfig::load().context("Failed to load configuration")?;
    let client =
        AirNowClient::from_config(&cfg.airnow()).context("Failed to configure AirNow client")?;
    let pipeline = Pipeline::new(Box::new(client));

    match args.command {
        Command::Lookup {
            zip,
            threshold,
            detail,
            json,
        } => {
            let zip = zip
                .or_else(|| cfg.zip_code())
                .context("No ZIP code given and no default configured")?;
            let threshold = threshold.unwrap_or_else(|| cfg.threshold());
            lookup(&cfg, &pipeline, &zip, threshold, detail.as_deref(), json).await
        }
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| cfg.http_bind());
            serve(&cfg, pipeline, &bind).await
        }
    }
}

async fn lookup(
    cfg: &AppConfig,
    pipeline: &Pipeline,
    zip: &str,
    threshold: i32,
    detail: Option<&str>,
    json: bool,
) -> Result<()> {
    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let result = match pipeline.run_until(zip, threshold, cancel).await {
        Ok(result) => result,
        Err(PipelineError::Fetch(e)) => {
            tracing::error!(error = ?e, "lookup failed");
            return Err(anyhow!("{}", e.user_message()));
        }
        Err(PipelineError::Cancelled) => return Err(anyhow!("Lookup cancelled")),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(name) = detail {
        let pollutant =
            Pollutant::from_name(name).with_context(|| format!("Unknown pollutant {name}"))?;
        match result.by_pollutant.get(pollutant).record() {
            Some(record) => println!("{}", aqi_cli::render_detail(record)),
            None => println!("{}: N/A", pollutant),
        }
    } else {
        println!("{}", aqi_cli::render_report(&result));
    }

    if cfg.notifications_enabled() {
        let notifier = aqi_cli::LogNotifier::new();
        aqi_cli::deliver_alerts(&notifier, &result.alerts).await;
    }

    Ok(())
}

async fn serve(cfg: &AppConfig, pipeline: Pipeline, bind: &str) -> Result<()> {
    let notifier: Option<Arc<dyn AlertNotifier>> = if cfg.notifications_enabled() {
        Some(Arc::new(aqi_cli::LogNotifier::new()))
    } else {
        None
    };
    let (app, state) = aqi_cli::build_app(pipeline, cfg.threshold(), notifier);

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid HTTP bind address {bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind TCP listener")?;

    // Mark ready just before serving
    aqi_cli::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
