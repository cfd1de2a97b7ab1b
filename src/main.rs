use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, instrument};

use homework_watchbot::config::{self, Config, ConfigError, Credentials, Settings};
use homework_watchbot::logging;
use homework_watchbot::notifier::TelegramNotifier;
use homework_watchbot::poller::Poller;
use homework_watchbot::practicum::PracticumClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "Relay homework review status changes to a Telegram chat")]
struct Args {
    /// Log file path (defaults to main.log next to the executable)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seconds to wait between polling cycles
    #[arg(long, default_value_t = config::DEFAULT_RETRY_PERIOD_SECS)]
    retry_period: u64,

    /// Homework statuses endpoint
    #[arg(long, default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

/// Startup validation; a missing token aborts the process.
#[instrument(skip_all)]
fn load_config(credentials: Credentials, settings: &Settings) -> Result<Config> {
    let cfg = Config::build(credentials, settings).map_err(|err| {
        if let ConfigError::MissingTokens(missing) = &err {
            error!(critical = true, ?missing, "{err}");
        }
        err
    })?;
    Ok(cfg)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let settings = Settings {
        endpoint: args.endpoint,
        retry_period: Duration::from_secs(args.retry_period),
        log_file: args.log_file.unwrap_or_else(config::default_log_file),
    };
    logging::init(&settings.log_file)
        .with_context(|| format!("failed to open log file {}", settings.log_file.display()))?;

    let cfg = load_config(Credentials::from_env(), &settings)?;

    let api = PracticumClient::new(cfg.endpoint.clone(), cfg.credentials.practicum_token.clone())
        .context("failed to build HTTP client")?;
    let notifier = TelegramNotifier::from_credentials(&cfg.credentials);
    let mut poller = Poller::new(Box::new(api), Box::new(notifier), cfg.retry_period);

    if args.once {
        info!("running a single cycle");
        poller.tick().await?;
        return Ok(());
    }

    poller.run().await?;
    Ok(())
}
