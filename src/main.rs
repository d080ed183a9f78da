use std::io::Read;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use hearken::infrastructure::config::Config;
use hearken::infrastructure::http::{DryRunClient, ReqwestClient};
use hearken::infrastructure::setup;
use hearken::{BotError, HttpClient, Request};

mod handlers;

#[derive(Parser)]
#[command(name = "hearken")]
#[command(about = "Provider-agnostic chatbot dispatcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one webhook payload
    Dispatch {
        /// JSON payload file, "-" for stdin
        payload: Option<String>,

        /// Form field of a form-encoded payload (repeatable)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Log outbound API calls instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dispatch { payload, fields, dry_run } => {
            if let Err(e) = dispatch(&cli.config, payload, fields, dry_run) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("hearken v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(path: &str) -> Config {
    if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn read_request(payload: Option<String>, fields: Vec<String>) -> Result<Request, BotError> {
    if !fields.is_empty() {
        let pairs = fields
            .iter()
            .map(|f| {
                f.split_once('=')
                    .ok_or_else(|| BotError::MalformedPayload(format!("expected KEY=VALUE, got '{}'", f)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Request::from_form(pairs));
    }

    let raw = match payload.as_deref() {
        None | Some("-") => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| BotError::MalformedPayload(e.to_string()))?;
            raw
        }
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| BotError::MalformedPayload(format!("{}: {}", path, e)))?,
    };
    Request::from_json_str(&raw)
}

fn dispatch(config_path: &str, payload: Option<String>, fields: Vec<String>, dry_run: bool) -> Result<(), BotError> {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.bot.name);

    let http: Arc<dyn HttpClient> = if dry_run {
        Arc::new(DryRunClient)
    } else {
        Arc::new(ReqwestClient::new()?)
    };

    let mut dispatcher = setup::dispatcher_from_config(&config, http)?;
    handlers::register(&mut dispatcher)?;

    let request = read_request(payload, fields)?;
    for outcome in dispatcher.handle(&request)? {
        tracing::info!("{:?}", outcome);
    }
    Ok(())
}

fn init_config() {
    let config = Config::default();
    match serde_yaml::to_string(&config) {
        Ok(yaml) => match std::fs::write("config.yaml", yaml) {
            Ok(()) => println!("Created config.yaml"),
            Err(e) => eprintln!("Failed to write config.yaml: {}", e),
        },
        Err(e) => eprintln!("Failed to serialize config: {}", e),
    }
}
