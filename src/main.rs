use anyhow::Context;
use churn_serve::artifacts::{load_artifacts, LoadedArtifacts};
use churn_serve::client::{render_outcome, ChurnClient, DEFAULT_URL};
use churn_serve::config::{ConfigLoader, ConfigOverrides, ServiceConfig};
use churn_serve::error::ChurnError;
use churn_serve::server::{ApiState, ChurnApiServer};
use churn_serve::service::{ChurnPredictor, PredictError};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

/// Customer churn prediction service
#[derive(Parser)]
#[command(name = "churn-serve", version)]
#[command(about = "Validate customer records and score them for churn risk", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides config and RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct ArtifactArgs {
    /// Model artifact (overrides config)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Feature schema artifact (overrides config)
    #[arg(long, global = true)]
    features: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction API (default command)
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        listen: Option<String>,

        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Load the artifacts and report what would be served
    Check,
    /// Score a customer record from a JSON file without starting a server
    Score {
        /// JSON file holding one customer record
        record: PathBuf,

        /// Also print the model-ready feature vector
        #[arg(long)]
        show_features: bool,
    },
    /// Send a customer record to a running server
    Ask {
        /// JSON file holding one customer record
        record: PathBuf,

        /// Base URL of the server
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(e.exit_code());
        }
    };

    let log_level = match cli.verbose {
        0 => config.log_level.as_str(),
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,tower=debug", // -vvv shows everything including dependencies
    };
    let filter = if cli.verbose == 0 && cli.log_level.is_none() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    } else {
        EnvFilter::new(log_level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("churn-serve started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
    trace!(?config, "Resolved configuration");

    let result = match cli.command {
        Some(Commands::Serve { .. }) | None => run_serve(&config).await,
        Some(Commands::Check) => run_check(&config),
        Some(Commands::Score {
            record,
            show_features,
        }) => run_score(&config, &record, show_features),
        Some(Commands::Ask { record, url }) => run_ask(&config, &record, &url).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        match e.downcast_ref::<ChurnError>() {
            Some(churn) => {
                eprintln!("Error: {}", churn.user_message());
                std::process::exit(churn.exit_code());
            }
            None => {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn resolve_config(cli: &Cli) -> churn_serve::error::Result<ServiceConfig> {
    let mut config = ConfigLoader::new().load(cli.config.as_deref())?;
    config.apply_overrides(&cli_overrides(cli));
    config.validate()?;
    Ok(config)
}

fn cli_overrides(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides {
        model_path: cli.artifacts.model.clone(),
        features_path: cli.artifacts.features.clone(),
        log_level: cli.log_level.clone(),
        ..Default::default()
    };
    if let Some(Commands::Serve { listen, no_cors }) = &cli.command {
        overrides.listen_addr = listen.clone();
        overrides.no_cors = *no_cors;
    }
    overrides
}

fn load(config: &ServiceConfig) -> anyhow::Result<LoadedArtifacts> {
    Ok(load_artifacts(&config.model_path, &config.features_path)?)
}

async fn run_serve(config: &ServiceConfig) -> anyhow::Result<()> {
    let artifacts = load(config)?;
    let state = ApiState::from_artifacts(&artifacts)?;
    ChurnApiServer::new(state, config.socket_addr()?, config.cors)
        .start()
        .await
}

fn run_check(config: &ServiceConfig) -> anyhow::Result<()> {
    let metadata = load(config)?.metadata();
    println!("✅ Artifacts are consistent");
    println!("  model:    {} ({})", config.model_path.display(), metadata.model_kind);
    println!("  sha256:   {}", metadata.model_sha256);
    println!(
        "  features: {} ({} columns)",
        config.features_path.display(),
        metadata.n_features
    );
    println!("  sha256:   {}", metadata.features_sha256);
    Ok(())
}

fn read_record(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Record {} is not valid JSON", path.display()))
}

fn run_score(config: &ServiceConfig, record: &Path, show_features: bool) -> anyhow::Result<()> {
    let predictor = ChurnPredictor::from_artifacts(&load(config)?)?;
    let body = read_record(record)?;

    if show_features {
        match predictor.feature_vector(&body) {
            Ok(vector) => {
                for (column, value) in vector {
                    println!("{:<45} {}", column, value);
                }
            }
            Err(PredictError::Rejected(_)) => {}
            Err(PredictError::Internal(e)) => return Err(e.into()),
        }
    }

    match predictor.predict(&body) {
        Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        Err(PredictError::Rejected(errors)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "detail": errors.issues }))?
            );
            std::process::exit(1);
        }
        Err(PredictError::Internal(e)) => return Err(e.into()),
    }
    Ok(())
}

async fn run_ask(config: &ServiceConfig, record: &Path, url: &str) -> anyhow::Result<()> {
    let body = read_record(record)?;
    let client = ChurnClient::new(url, config.request_timeout())?;
    let outcome = client.predict(&body).await?;
    println!("{}", render_outcome(&outcome));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_flag_reaches_config() {
        let cli = Cli::try_parse_from(["churn-serve", "check", "--log-level", "warn"]).unwrap();
        let overrides = cli_overrides(&cli);
        assert_eq!(overrides.log_level.as_deref(), Some("warn"));

        let mut config = ServiceConfig::default();
        config.apply_overrides(&overrides);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_serve_flags_only_apply_to_serve() {
        let cli = Cli::try_parse_from([
            "churn-serve",
            "serve",
            "--listen",
            "127.0.0.1:9000",
            "--no-cors",
        ])
        .unwrap();
        let overrides = cli_overrides(&cli);
        assert_eq!(overrides.listen_addr.as_deref(), Some("127.0.0.1:9000"));
        assert!(overrides.no_cors);
        assert!(overrides.log_level.is_none());

        let cli = Cli::try_parse_from(["churn-serve", "--model", "m.json", "check"]).unwrap();
        let overrides = cli_overrides(&cli);
        assert!(overrides.listen_addr.is_none());
        assert_eq!(overrides.model_path, Some(PathBuf::from("m.json")));
    }
}
