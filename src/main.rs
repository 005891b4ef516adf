use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use voltage_provider::config::Config;
use voltage_provider::provider::diagnostics::Diagnostics;
use voltage_provider::config::ProviderConfig;
use voltage_provider::provider::resource::{CreateRequest, DeleteRequest, ReadRequest, UpdateRequest};
use voltage_provider::provider::state::State;
use voltage_provider::provider::ProviderResource;
use voltage_provider::VoltageProvider;

/// Drive the Voltage provider's resources against local state files
#[derive(Parser, Debug)]
#[command(name = "voltage-provider", version, about, long_about = None)]
struct Args {
    /// Provider block as a JSON file (api_key, endpoint, timeout_secs)
    #[arg(long, global = true)]
    provider: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resource type to operate on
    #[arg(long, global = true, default_value = "voltage_dashboard")]
    resource: String,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store API settings in the config file
    Login {
        /// Voltage API key
        #[arg(long)]
        api_key: Option<String>,
        /// API endpoint override
        #[arg(long)]
        endpoint: Option<String>,
        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Print the provider and resource schemas
    Schema,
    /// Validate a resource configuration without calling the API
    Validate {
        /// Resource configuration JSON file
        file: PathBuf,
    },
    /// Create the resource and print its new state
    Create {
        /// Planned values as a JSON file
        #[arg(long, conflicts_with_all = ["node_id", "dashboard_type"])]
        plan: Option<PathBuf>,
        /// Node the dashboard attaches to
        #[arg(long)]
        node_id: Option<String>,
        /// Dashboard application (thunderhub or lnbits)
        #[arg(long = "type")]
        dashboard_type: Option<String>,
    },
    /// Refresh a state file from the API
    Read {
        /// State JSON file
        state: PathBuf,
    },
    /// Attempt an in-place update
    Update {
        /// State JSON file
        state: PathBuf,
        /// Planned values as a JSON file
        plan: PathBuf,
    },
    /// Destroy the resource recorded in a state file
    Delete {
        /// State JSON file
        state: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("voltage-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("voltage").join("voltage-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".voltage").join("voltage-provider.log");
    }
    PathBuf::from("voltage-provider.log")
}

fn read_json(path: &Path) -> Result<State> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))?;
    Ok(State::from_value(value))
}

/// Print the resulting document and diagnostics; `false` when an error was reported
fn report(state: Option<&State>, diagnostics: &Diagnostics) -> Result<bool> {
    for diagnostic in diagnostics {
        eprintln!("{}\n", diagnostic);
    }
    if let Some(state) = state {
        println!("{}", serde_json::to_string_pretty(state.as_value())?);
    }
    Ok(!diagnostics.has_error())
}

fn configured_resource(provider: &VoltageProvider, args: &Args) -> Result<Option<ProviderResource>> {
    let mut resource = provider
        .resource(&args.resource)
        .with_context(|| format!("Unknown resource type: {}", args.resource))?;

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let block = match &args.provider {
        Some(path) => read_json(path)?,
        None => State::null(),
    };

    match provider.configure(&block, &config) {
        Ok(client) => {
            resource.configure(Some(client));
            Ok(Some(resource))
        }
        Err(diags) => {
            report(None, &diags)?;
            Ok(None)
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let provider = VoltageProvider::default();

    match &args.command {
        Command::Login {
            api_key,
            endpoint,
            timeout_secs,
        } => {
            let mut config = match &args.config {
                Some(path) => Config::load_from(path),
                None => Config::load(),
            };
            config.merge(&ProviderConfig {
                api_key: api_key.clone(),
                endpoint: endpoint.clone(),
                timeout_secs: *timeout_secs,
            });
            match &args.config {
                Some(path) => config.save_to(path)?,
                None => config.save()?,
            }
            tracing::info!("Saved Voltage settings");
            eprintln!("Settings saved.");
            Ok(true)
        }
        Command::Schema => {
            let resource = provider
                .resource(&args.resource)
                .with_context(|| format!("Unknown resource type: {}", args.resource))?;
            let schemas = json!({
                "provider_version": provider.version(),
                "provider": provider.schema(),
                "resources": { args.resource.clone(): resource.schema() },
            });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
            Ok(true)
        }
        Command::Validate { file } => {
            let resource = provider
                .resource(&args.resource)
                .with_context(|| format!("Unknown resource type: {}", args.resource))?;
            let diags = resource.validate_config(&read_json(file)?);
            report(None, &diags)
        }
        Command::Create {
            plan,
            node_id,
            dashboard_type,
        } => {
            let plan = match plan {
                Some(path) => read_json(path)?,
                None => State::from_value(json!({
                    "node_id": node_id,
                    "type": dashboard_type,
                })),
            };
            let Some(resource) = configured_resource(&provider, &args)? else {
                return Ok(false);
            };
            let resp = resource.create(CreateRequest { plan }).await;
            report(Some(&resp.state), &resp.diagnostics)
        }
        Command::Read { state } => {
            let state = read_json(state)?;
            let Some(resource) = configured_resource(&provider, &args)? else {
                return Ok(false);
            };
            let resp = resource.read(ReadRequest { state }).await;
            report(Some(&resp.state), &resp.diagnostics)
        }
        Command::Update { state, plan } => {
            let state = read_json(state)?;
            let plan = read_json(plan)?;
            let resource = provider
                .resource(&args.resource)
                .with_context(|| format!("Unknown resource type: {}", args.resource))?;

            let replace = resource.schema().replacement_paths(&state, &plan);
            if !replace.is_empty() {
                eprintln!(
                    "Changing {} forces replacement: delete and create the resource instead.\n",
                    replace.join(", ")
                );
            }

            let resp = resource.update(UpdateRequest { plan, state }).await;
            report(Some(&resp.state), &resp.diagnostics)
        }
        Command::Delete { state } => {
            let state = read_json(state)?;
            let Some(resource) = configured_resource(&provider, &args)? else {
                return Ok(false);
            };
            let resp = resource.delete(DeleteRequest { state }).await;
            report(Some(&resp.state), &resp.diagnostics)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    if !run(args).await? {
        std::process::exit(1);
    }

    Ok(())
}
