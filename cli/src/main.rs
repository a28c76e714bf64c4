use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use intake_ledger_core::{
    Credential, FieldValues, LATEST_VERSION, RecordSchema, RecordSummary, SchemaCatalog,
    Submission, check_evolution, matches_query, validate_schema,
};
use intake_ledger_server::state::AppState;
use intake_ledger_sheets::SheetsSource;
use intake_ledger_store::{
    ENV_ACCESS_TOKEN, ENV_API_KEY, IntakeConfig, MemorySource, RecordStore, credential_from_env,
};
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for command results.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "intake")]
#[command(about = "Browse, submit and serve customer intake records kept in a spreadsheet")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, default_value = "intake.yml")]
    config: PathBuf,
    /// Output format.
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every record in row order.
    List(ListArgs),
    /// Show one record by positional id.
    Get(GetArgs),
    /// Validate and append one record.
    Submit(SubmitArgs),
    /// Inspect and check record schemas.
    Schema(SchemaArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only show records whose name, phone suffix or date match.
    #[arg(long)]
    search: Option<String>,
    /// Show id, name, phone suffix and date only.
    #[arg(long)]
    summary: bool,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Record id (1 is the first row after the header).
    #[arg(allow_negative_numbers = true)]
    id: i64,
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// Field value as KEY=VALUE; repeat for each field.
    #[arg(long = "field", value_name = "KEY=VALUE", required = true)]
    fields: Vec<String>,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    #[command(subcommand)]
    operation: SchemaOperation,
}

#[derive(Debug, Subcommand)]
enum SchemaOperation {
    /// Print a built-in schema (the newest when no version is given).
    Show(SchemaShowArgs),
    /// Validate a schema file (YAML or JSON).
    Validate(SchemaValidateArgs),
    /// Check that NEW only adds columns on top of OLD.
    CheckEvolution(CheckEvolutionArgs),
}

#[derive(Debug, Args)]
struct SchemaShowArgs {
    /// Built-in version tag (v1, v2, v3).
    #[arg(long)]
    version: Option<String>,
    /// List the built-in version tags instead.
    #[arg(long, conflicts_with = "version")]
    list: bool,
}

#[derive(Debug, Args)]
struct SchemaValidateArgs {
    /// Schema file to validate.
    file: PathBuf,
}

#[derive(Debug, Args)]
struct CheckEvolutionArgs {
    /// Previous schema: a built-in version tag or a schema file.
    old: String,
    /// Proposed schema: a built-in version tag or a schema file.
    new: String,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Serve an in-process table instead of the configured spreadsheet.
    #[arg(long)]
    memory: bool,
    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Command::List(args) => run_list(&cli.config, cli.format, args),
        Command::Get(args) => run_get(&cli.config, cli.format, args),
        Command::Submit(args) => run_submit(&cli.config, args),
        Command::Schema(args) => run_schema(cli.format, args),
        Command::Serve(args) => run_serve(&cli.config, args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_list(config_path: &Path, format: OutputFormat, args: ListArgs) -> Result<(), String> {
    let config = load_config(config_path)?;
    let credential = require_credential()?;
    let store = sheets_store(&config)?;

    let records = runtime()?
        .block_on(store.list_records(&credential))
        .map_err(|err| err.to_string())?;

    let query = args.search.unwrap_or_default();
    let records: Vec<_> = records
        .into_iter()
        .filter(|record| matches_query(record, &query))
        .collect();

    if args.summary {
        let summaries: Vec<RecordSummary> =
            records.iter().map(RecordSummary::from_record).collect();
        return emit(&summaries, format);
    }
    emit(&records, format)
}

fn run_get(config_path: &Path, format: OutputFormat, args: GetArgs) -> Result<(), String> {
    let config = load_config(config_path)?;
    let credential = require_credential()?;
    let store = sheets_store(&config)?;

    let record = runtime()?
        .block_on(store.get_record(&credential, args.id))
        .map_err(|err| err.to_string())?;
    emit(&record, format)
}

fn run_submit(config_path: &Path, args: SubmitArgs) -> Result<(), String> {
    let raw = parse_field_args(&args.fields)?;
    let config = load_config(config_path)?;
    let credential = require_credential()?;
    let store = sheets_store(&config)?;

    let today = Local::now().date_naive();
    let submission = Submission::prepare(store.schema(), raw, today).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        format!("invalid submission: {}", messages.join("; "))
    })?;

    runtime()?
        .block_on(store.append_record(&credential, submission.fields()))
        .map_err(|err| err.to_string())?;

    println!("Submitted record for '{}'.", submission.get("name").unwrap_or("(unnamed)"));
    Ok(())
}

fn run_schema(format: OutputFormat, args: SchemaArgs) -> Result<(), String> {
    match args.operation {
        SchemaOperation::Show(args) => run_schema_show(format, args),
        SchemaOperation::Validate(args) => run_schema_validate(args),
        SchemaOperation::CheckEvolution(args) => run_check_evolution(args),
    }
}

fn run_schema_show(format: OutputFormat, args: SchemaShowArgs) -> Result<(), String> {
    let catalog = SchemaCatalog::builtin();
    if args.list {
        return emit(&catalog.versions(), format);
    }

    let version = args.version.as_deref().unwrap_or(LATEST_VERSION);
    let schema = catalog.get(version).ok_or_else(|| {
        format!(
            "Unknown schema version '{version}' (available: {})",
            catalog.versions().join(", ")
        )
    })?;
    emit(schema, format)
}

fn run_schema_validate(args: SchemaValidateArgs) -> Result<(), String> {
    let schema = load_schema_file(&args.file)?;
    let errors = validate_schema(&schema);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  {error}");
        }
        return Err(format!(
            "{} validation error(s) in '{}'",
            errors.len(),
            args.file.display()
        ));
    }

    println!(
        "Schema '{}' is valid: {} field(s) over columns {}.",
        schema.version,
        schema.fields.len(),
        schema.column_range(None)
    );
    Ok(())
}

fn run_check_evolution(args: CheckEvolutionArgs) -> Result<(), String> {
    let old = resolve_schema_arg(&args.old)?;
    let new = resolve_schema_arg(&args.new)?;

    let issues = check_evolution(&old, &new);
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("  {issue}");
        }
        return Err(format!(
            "'{}' -> '{}' is not additive: {} issue(s)",
            old.version,
            new.version,
            issues.len()
        ));
    }

    println!("'{}' -> '{}' is additive.", old.version, new.version);
    Ok(())
}

fn run_serve(config_path: &Path, args: ServeArgs) -> Result<(), String> {
    let runtime = runtime()?;

    if args.memory {
        let schema = match IntakeConfig::load(config_path) {
            Ok(config) => config.resolve_schema().map_err(|err| err.to_string())?,
            Err(err) => {
                debug!("No config at '{}' ({err}), using built-in schema", config_path.display());
                SchemaCatalog::builtin()
                    .latest()
                    .cloned()
                    .ok_or("built-in schema catalog is empty")?
            }
        };
        let port = args.port.unwrap_or(intake_ledger_store::ServerConfig::default().port);
        info!("Serving in-memory table with schema {}", schema.version);

        let source = MemorySource::with_header(schema.header_row());
        let store = RecordStore::new(source, schema, None);
        let credential = credential_from_env().or(Some(Credential::ApiKey("local".to_string())));
        let state = Arc::new(AppState::new(store, credential));
        return runtime
            .block_on(intake_ledger_server::serve(state, "127.0.0.1", port))
            .map_err(|err| err.to_string());
    }

    let mut config = load_config(config_path)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    runtime
        .block_on(intake_ledger_server::start_server(&config, credential_from_env()))
        .map_err(|err| err.to_string())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to start async runtime: {err}"))
}

fn load_config(path: &Path) -> Result<IntakeConfig, String> {
    let mut config = IntakeConfig::load(path)
        .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?;
    config
        .apply_env_overrides()
        .map_err(|err| err.to_string())?;
    debug!("Loaded config from '{}'", path.display());
    Ok(config)
}

fn require_credential() -> Result<Credential, String> {
    credential_from_env()
        .ok_or_else(|| format!("No credential: set {ENV_ACCESS_TOKEN} or {ENV_API_KEY}"))
}

fn sheets_store(config: &IntakeConfig) -> Result<RecordStore<SheetsSource>, String> {
    config.spreadsheet_id().map_err(|err| err.to_string())?;
    let schema = config.resolve_schema().map_err(|err| err.to_string())?;
    let source = SheetsSource::from_config(&config.source).map_err(|err| err.to_string())?;
    Ok(RecordStore::new(
        source,
        schema,
        config.source.sheet.as_deref(),
    ))
}

fn parse_field_args(raw: &[String]) -> Result<FieldValues, String> {
    let mut fields = FieldValues::new();
    for arg in raw {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Invalid --field '{arg}': expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Invalid --field '{arg}': key is empty"));
        }
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

/// A built-in version tag, or else a path to a schema file.
fn resolve_schema_arg(arg: &str) -> Result<RecordSchema, String> {
    if let Some(schema) = SchemaCatalog::builtin().get(arg) {
        return Ok(schema.clone());
    }
    load_schema_file(Path::new(arg))
}

fn load_schema_file(path: &Path) -> Result<RecordSchema, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    // YAML is a superset of JSON, so one parser covers both
    serde_yaml::from_str(&raw).map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
}

fn emit<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<(), String> {
    let raw = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))?
        }
    };
    println!("{}", raw.trim_end());
    Ok(())
}
