use anyhow::{Context, Result};
use appstore_provider::appstore::AppStoreClient;
use appstore_provider::config::{Config, TransportKind};
use appstore_provider::resource::{
    get_all_resource_keys, get_resource, AppletConfig, AppletResource, AttributeError,
    ReadOutcome, WriteOutcome,
};
use appstore_provider::VERSION;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use url::Url;

/// Manage app-store applet listings
#[derive(Parser, Debug)]
#[command(name = "appstore-provider", version = VERSION, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// AWS profile used to resolve credentials
    #[arg(long, global = true)]
    profile: Option<String>,

    /// AWS region
    #[arg(long, global = true)]
    region: Option<String>,

    /// How to reach the app-store service
    #[arg(long, value_enum, global = true)]
    transport: Option<TransportKind>,

    /// GraphQL endpoint used by the http transport
    #[arg(long, global = true)]
    graphql_endpoint: Option<Url>,

    /// Lambda API endpoint override
    #[arg(long, global = true)]
    lambda_endpoint: Option<Url>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an applet from a definition file and print its state
    /// (only `{"id": ...}` if the new listing could not be read back)
    Create {
        /// YAML or JSON definition (`-` for stdin)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the current state of an applet (`null` if it was removed)
    Read {
        #[arg(long)]
        id: String,
    },
    /// Replace every field of an applet and print its state
    Update {
        #[arg(long)]
        id: String,
        /// YAML or JSON definition (`-` for stdin)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete an applet
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Adopt an existing applet by id and print its state
    Import {
        #[arg(long)]
        id: String,
    },
    /// Print resource schemas, keyed by resource type
    Schema {
        /// Only print this resource type
        #[arg(long)]
        resource: Option<String>,
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

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let (non_blocking, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("appstore-provider {} started with log level: {:?}", VERSION, level);

    Ok(Some(guard))
}

/// Resolve the effective configuration (CLI > env > file > defaults).
/// An explicit `--config` file must exist and parse.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::load_from(path)
                .with_context(|| format!("Failed to load config {:?}", path))?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => Config::load(),
    };

    if let Some(profile) = &args.profile {
        config.profile = Some(profile.clone());
    }
    if let Some(region) = &args.region {
        config.region = Some(region.clone());
    }
    if let Some(transport) = args.transport {
        config.transport = transport;
    }
    if let Some(endpoint) = &args.graphql_endpoint {
        config.graphql_endpoint = Some(endpoint.clone());
    }
    if let Some(endpoint) = &args.lambda_endpoint {
        config.lambda_endpoint = Some(endpoint.clone());
    }
    Ok(config)
}

/// Read a YAML or JSON resource definition
fn read_definition(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read definition from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read definition {:?}", path))?
    };

    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse definition {:?}", path))
}

fn load_applet_config(path: &Path) -> Result<AppletConfig> {
    let definition = read_definition(path)?;
    Ok(AppletConfig::from_definition(&definition)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Schemas of one or every registered resource type
fn schema_document(resource: Option<&str>) -> Result<Value> {
    let keys = match resource {
        Some(key) => vec![key],
        None => get_all_resource_keys(),
    };

    let mut document = Map::new();
    for key in keys {
        let schema =
            get_resource(key).ok_or_else(|| AttributeError::UnknownResource(key.to_string()))?;
        document.insert(key.to_string(), serde_json::to_value(schema)?);
    }
    Ok(Value::Object(document))
}

/// What to print after a write, plus the read-back failure if there was one
fn write_report(outcome: WriteOutcome) -> Result<(Value, Option<anyhow::Error>)> {
    match outcome {
        WriteOutcome::Applied(state) => Ok((serde_json::to_value(&state)?, None)),
        WriteOutcome::Unconfirmed { id, reason } => {
            let failure = anyhow::Error::new(reason)
                .context(format!("Applet {} was written but could not be read back", id));
            Ok((json!({ "id": id }), Some(failure)))
        }
    }
}

/// Print the committed state (or at least its id) before reporting any failure
fn finish_write(outcome: WriteOutcome) -> Result<()> {
    let (output, failure) = write_report(outcome)?;
    print_json(&output)?;
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn connect(args: &Args) -> Result<AppletResource> {
    let config = resolve_config(args)?;
    tracing::info!(
        "Using account: {}, user: {}, function: {}",
        config.account,
        config.user,
        config.function_name
    );
    let client = AppStoreClient::connect(&config)
        .await
        .context("Failed to initialize app store client")?;
    Ok(AppletResource::new(client))
}

#[derive(Serialize)]
struct DeleteReport<'a> {
    id: &'a str,
    outcome: appstore_provider::resource::DeleteOutcome,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    match &args.command {
        Command::Schema { resource } => print_json(&schema_document(resource.as_deref())?),
        Command::Create { file } => {
            // Definitions are checked before any network call.
            let config = load_applet_config(file)?;
            let resource = connect(&args).await?;
            let outcome = resource.create(&config).await.context("Failed to create applet")?;
            finish_write(outcome)
        }
        Command::Read { id } => {
            let resource = connect(&args).await?;
            match resource.read(id).await.context("Failed to read applet")? {
                ReadOutcome::Present(state) => print_json(&state),
                ReadOutcome::Removed => {
                    eprintln!("Applet {} no longer exists", id);
                    print_json(&Value::Null)
                }
            }
        }
        Command::Update { id, file } => {
            let config = load_applet_config(file)?;
            let resource = connect(&args).await?;
            let outcome = resource
                .update(id, &config)
                .await
                .context("Failed to update applet")?;
            finish_write(outcome)
        }
        Command::Delete { id } => {
            let resource = connect(&args).await?;
            let outcome = resource.delete(id).await.context("Failed to delete applet")?;
            print_json(&DeleteReport { id, outcome })
        }
        Command::Import { id } => {
            let resource = connect(&args).await?;
            let state = resource.import(id).await.context("Failed to import applet")?;
            print_json(&state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_provider::appstore::AppStoreError;

    #[test]
    fn test_cli_parses_update() {
        let args = Args::try_parse_from([
            "appstore-provider",
            "update",
            "--id",
            "abc-123",
            "--file",
            "demo.yaml",
            "--transport",
            "http",
            "--graphql-endpoint",
            "https://api.example.com/graphql",
        ])
        .unwrap();

        assert!(matches!(args.command, Command::Update { ref id, .. } if id == "abc-123"));

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.transport, TransportKind::Http);
        assert_eq!(
            config.graphql_endpoint.as_ref().map(Url::as_str),
            Some("https://api.example.com/graphql")
        );
        assert_eq!(config.lambda_endpoint, None);
    }

    #[test]
    fn test_explicit_config_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"account": "customer-acct", "user": "ops",}"#).unwrap();

        let config_arg = path.to_str().unwrap();
        let args =
            Args::try_parse_from(["appstore-provider", "--config", config_arg, "read", "--id", "abc-123"])
                .unwrap();
        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config"));

        let missing = dir.path().join("missing.json");
        let args = Args::try_parse_from([
            "appstore-provider",
            "--config",
            missing.to_str().unwrap(),
            "read",
            "--id",
            "abc-123",
        ])
        .unwrap();
        assert!(resolve_config(&args).is_err());

        std::fs::write(&path, r#"{"account": "customer-acct", "user": "ops"}"#).unwrap();
        let args =
            Args::try_parse_from(["appstore-provider", "--config", config_arg, "read", "--id", "abc-123"])
                .unwrap();
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.user, "ops");
    }

    #[test]
    fn test_unconfirmed_write_still_reports_id() {
        let (output, failure) = write_report(WriteOutcome::Unconfirmed {
            id: "abc-123".to_string(),
            reason: AppStoreError::Invocation("connection reset".to_string()),
        })
        .unwrap();

        assert_eq!(output, json!({ "id": "abc-123" }));
        let failure = failure.unwrap();
        assert!(failure.to_string().contains("abc-123"));
        assert!(format!("{:#}", failure).contains("connection reset"));
    }

    #[test]
    fn test_schema_document_lists_registered_resources() {
        let document = schema_document(None).unwrap();
        assert_eq!(document["applet"]["id_field"], "id");
        assert_eq!(document, schema_document(Some("applet")).unwrap());
        assert!(schema_document(Some("dataset")).is_err());
    }

    #[test]
    fn test_cli_requires_id_for_delete() {
        assert!(Args::try_parse_from(["appstore-provider", "delete"]).is_err());
    }

    #[test]
    fn test_yaml_definition_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.yaml");
        std::fs::write(
            &path,
            "name: Demo\ndescription: A demo app\nauthor_display: Acme\nimage: https://img/demo.png\nurl: https://demo.acme.com\n",
        )
        .unwrap();

        let config = load_applet_config(&path).unwrap();
        assert_eq!(config.name, "Demo");
        assert_eq!(config.url, "https://demo.acme.com");

        std::fs::write(&path, "name: Demo\n").unwrap();
        let err = load_applet_config(&path).unwrap_err();
        assert!(err.to_string().contains("missing required attribute"));
    }
}
