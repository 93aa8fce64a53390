// # cloudnsctl - ClouDNS record reconciler CLI
//
// Thin integration layer: all reconciliation logic lives in `cloudns-core`,
// all HTTP in `cloudns-api`. This binary only:
// 1. Reads configuration (environment or `--config` JSON file)
// 2. Initializes logging and the runtime
// 3. Runs one operation and prints its result as JSON on stdout
//
// ## Configuration
//
// - `CLOUDNS_AUTH_ID` / `CLOUDNS_SUB_AUTH_ID`: exactly one must be set
// - `CLOUDNS_PASSWORD`: API password
// - `CLOUDNS_REQUESTS_PER_SECOND`: call ceiling (default 5)
// - `CLOUDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export CLOUDNS_AUTH_ID=1234
// export CLOUDNS_PASSWORD=secret
//
// cloudnsctl create --zone example.com --host www --type A --value 1.2.3.4 --ttl 3600
// cloudnsctl read --zone example.com --id 123456
// cloudnsctl import example.com/123456
// ```

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cloudns_api::CloudnsClient;
use cloudns_core::{Observation, Reconciler, ReconcilerConfig, Record, ZoneApi};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use cli::{Cli, Command};

/// Process exit codes
#[derive(Debug, Clone, Copy)]
enum CtlExitCode {
    /// Operation completed
    Success = 0,
    /// Configuration could not be loaded or is invalid
    ConfigError = 1,
    /// Operation failed or was cancelled
    OperationError = 2,
}

impl From<CtlExitCode> for ExitCode {
    fn from(code: CtlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn load_config(cli: &Cli) -> cloudns_core::Result<ReconcilerConfig> {
    let config = match &cli.config {
        Some(path) => ReconcilerConfig::from_json_file(path)?,
        None => ReconcilerConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return CtlExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CtlExitCode::OperationError.into();
        }
    };

    rt.block_on(async {
        let reconciler = match build_reconciler(&config) {
            Ok(reconciler) => reconciler,
            Err(e) => {
                eprintln!("Configuration error: {:#}", e);
                return CtlExitCode::ConfigError;
            }
        };

        let cancel = reconciler.cancellation_token().clone();
        let watcher = tokio::spawn(cancel_on_signal(cancel));

        let code = match run(&reconciler, cli.command).await {
            Ok(()) => CtlExitCode::Success,
            Err(e) => {
                error!("Operation failed: {:#}", e);
                eprintln!("Error: {:#}", e);
                CtlExitCode::OperationError
            }
        };

        watcher.abort();
        code
    })
    .into()
}

fn build_reconciler(config: &ReconcilerConfig) -> Result<Reconciler> {
    let client = CloudnsClient::from_config(config).context("Failed to create ClouDNS client")?;
    let api: Arc<dyn ZoneApi> = Arc::new(client);
    let reconciler = Reconciler::new(api, config)?;
    info!(?reconciler, "Reconciler ready");
    Ok(reconciler)
}

/// Run one operation and print its outcome
async fn run(reconciler: &Reconciler, command: Command) -> Result<()> {
    match command {
        Command::Create(args) => {
            let created = reconciler.create(&args.to_record()).await?;
            print_record(Some(&created))
        }
        Command::Read(args) => {
            let observed = reconciler.read(&args.zone, &args.id).await?;
            print_observation(&observed)
        }
        Command::Update { id, record } => {
            let desired = record.to_record().with_id(id);
            let observed = reconciler.update(&desired).await?;
            print_observation(&observed)
        }
        Command::Delete(args) => {
            reconciler.delete(&args.zone, &args.id).await?;
            info!(zone = %args.zone, id = %args.id, "Deleted");
            Ok(())
        }
        Command::Import { identifier } => {
            let imported = reconciler.import(&identifier).await?;
            print_record(Some(&imported))
        }
    }
}

fn print_observation(observed: &Observation) -> Result<()> {
    if observed.is_stale() {
        warn!("Record is no longer listed; forget its id");
    }
    print_record(observed.record())
}

/// Print a record as JSON, or `null`
fn print_record(record: Option<&Record>) -> Result<()> {
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
    println!("{}", json);
    Ok(())
}

/// Cancel `token` on the first SIGINT or SIGTERM
async fn cancel_on_signal(token: CancellationToken) {
    match wait_for_signal().await {
        Ok(name) => {
            warn!("Received {}, cancelling", name);
            token.cancel();
        }
        Err(e) => error!("Signal handling unavailable: {}", e),
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
