mod config;
mod error;
mod output;
mod pipeline;
mod redact;
mod registry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keyaudit_core::{CheckKind, SuppressionList, Verbosity};
use keyaudit_introspect::{InspectOptions, connect, connect_or_unavailable};
use uuid::Uuid;

use config::{DEFAULT_MODELS_ROOT, load_config};
use error::CliError;
use output::Console;
use pipeline::{AuditSettings, InspectorSource, Pipeline, load_catalog};
use redact::redact_connection;
use registry::{RunContext, init_logging, start_run, write_json, write_reports};

#[derive(Parser, Debug)]
#[command(
    name = "keyaudit",
    version,
    about = "Audit model relationships against database constraints and indexes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check declared relationships for foreign key constraints and indexes.
    Audit(AuditArgs),
    /// Dump foreign keys and indexes to a JSON catalog snapshot.
    Catalog(CatalogArgs),
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Database connection string (flag form). Falls back to DATABASE_URL.
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "conn_pos")]
    conn: Option<String>,
    /// Database connection string (positional form).
    #[arg(value_name = "CONNECTION_STRING")]
    conn_pos: Option<String>,
}

impl ConnectionArgs {
    fn resolve(self) -> Option<String> {
        self.conn
            .or(self.conn_pos)
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|conn| !conn.trim().is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CheckArg {
    Constraint,
    Index,
    All,
}

impl CheckArg {
    fn kinds(self) -> Vec<CheckKind> {
        match self {
            CheckArg::Constraint => vec![CheckKind::Constraint],
            CheckArg::Index => vec![CheckKind::Index],
            CheckArg::All => CheckKind::ALL.to_vec(),
        }
    }
}

#[derive(Args, Debug)]
struct AuditArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Root directory of the model manifests [default: app/Models].
    #[arg(long)]
    models_root: Option<PathBuf>,
    /// Only scan this subdirectory of the models root.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Which property to check.
    #[arg(long, value_enum, default_value_t = CheckArg::All)]
    check: CheckArg,
    /// Print PASS lines too.
    #[arg(long, default_value_t = false)]
    show_all: bool,
    /// Print skipped files, skipped members and failed schema queries.
    #[arg(long, default_value_t = false)]
    show_others: bool,
    /// Config file [default: keyaudit.toml when present].
    #[arg(long)]
    config: Option<PathBuf>,
    /// Acknowledged relationship, as "member: table.column".
    #[arg(long, value_name = "ENTRY")]
    suppress: Vec<String>,
    /// Schema name(s) to search.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Answer checks from a catalog snapshot instead of a live database.
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Output directory for run artifacts.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Exit with status 1 when any unsuppressed FAIL is reported.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Where to write the catalog JSON.
    #[arg(long)]
    out: PathBuf,
    /// Schema name(s) to include.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
}

enum Outcome {
    Clean,
    Failures,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Audit(args) => run_audit(args).await,
        Command::Catalog(args) => run_catalog(args).await.map(|()| Outcome::Clean),
    };

    match outcome {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Failures) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

async fn run_audit(args: AuditArgs) -> Result<Outcome, CliError> {
    let AuditArgs {
        connection,
        models_root,
        dir,
        check,
        show_all,
        show_others,
        config,
        suppress,
        schema,
        catalog,
        run_dir,
        strict,
    } = args;

    let file_config = load_config(config.as_deref())?;
    let model_root = models_root
        .or(file_config.models_root)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_ROOT));
    let schemas = if schema.is_empty() {
        file_config.schemas
    } else {
        schema
    };

    let mut suppression = SuppressionList::from_entries(&file_config.suppress.entries);
    suppression.extend(&suppress);

    // Checked after discovery, so a missing model root is reported first.
    let conn = match catalog {
        Some(_) => None,
        None => connection.resolve(),
    };

    let default_filter = if show_others { "debug" } else { "warn" };
    let run_paths = match run_dir {
        Some(run_dir) => {
            let ctx = RunContext {
                run_id: Uuid::new_v4().to_string(),
                started_at: chrono::Utc::now(),
                run_dir,
                models_root: model_root.clone(),
                dir: dir.clone(),
                checks: check.kinds(),
                strict,
                suppressions: suppression.iter().map(str::to_string).collect(),
                connection: conn.as_deref().map(redact_connection),
                catalog: catalog.clone(),
            };
            let paths = start_run(&ctx)?;
            init_logging(Some(&paths.logs_path), default_filter)?;
            tracing::info!(event = "run_started", run_id = %ctx.run_id, root = %paths.root.display());
            Some(paths)
        }
        None => {
            init_logging(None, default_filter)?;
            None
        }
    };

    let settings = AuditSettings {
        model_root,
        dir,
        checks: check.kinds(),
        suppression,
        verbosity: Verbosity {
            show_all,
            show_others,
        },
    };

    let mut console = Console::stdio();
    let mut pipeline = Pipeline::new(settings, &mut console);
    let Some(collected) = pipeline.collect()? else {
        return Ok(Outcome::Clean);
    };

    let source = match (&catalog, conn) {
        (Some(path), _) => InspectorSource::Snapshot(load_catalog(path)?),
        (None, Some(conn)) => {
            let options = InspectOptions {
                schemas: (!schemas.is_empty()).then_some(schemas),
                ..InspectOptions::default()
            };
            InspectorSource::Live(connect_or_unavailable(&conn, &options).await)
        }
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "connection string or --catalog is required".to_string(),
            ));
        }
    };

    let reports = pipeline.check(source.inspector(), collected).await?;
    tracing::info!(
        event = "run_finished",
        stage = %pipeline.stage(),
        engine = source.inspector().engine()
    );

    if let Some(paths) = &run_paths {
        write_reports(paths, &reports)?;
        tracing::info!(event = "report_written", path = %paths.report_path.display());
    }

    if strict && reports.iter().any(|report| report.has_failures()) {
        return Ok(Outcome::Failures);
    }
    Ok(Outcome::Clean)
}

async fn run_catalog(args: CatalogArgs) -> Result<(), CliError> {
    let CatalogArgs {
        connection,
        out,
        schema,
    } = args;

    init_logging(None, "warn")?;

    let conn = connection
        .resolve()
        .ok_or_else(|| CliError::InvalidConfig("connection string is required".to_string()))?;
    let options = InspectOptions {
        schemas: (!schema.is_empty()).then_some(schema),
        ..InspectOptions::default()
    };

    let inspector = connect(&conn, &options).await?;
    let snapshot = inspector.snapshot().await?;
    write_json(&out, &snapshot)?;

    tracing::info!(
        event = "catalog_written",
        path = %out.display(),
        foreign_keys = snapshot.foreign_keys.len(),
        indexes = snapshot.indexes.len()
    );
    eprintln!(
        "wrote {} foreign keys and {} indexes to {}",
        snapshot.foreign_keys.len(),
        snapshot.indexes.len(),
        out.display()
    );
    Ok(())
}
