//! trainboard CLI: serve the training playground and inspect submissions.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use trainboard_core::models::leaderboard;
use trainboard_core::{DocumentId, DocumentStore, FileDocumentStore};
use trainboard_server::{serve, ServerConfig};

#[derive(Parser)]
#[command(
    name = "tb",
    about = "trainboard: configure, train and compare toy models",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI and submission store
    Serve {
        /// YAML config file; flags below override it
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Directory holding the model_db collection
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,
        /// Training backend the UI posts to
        #[arg(long, conflicts_with = "simulate")]
        training_endpoint: Option<String>,
        /// Simulate training in the browser instead of calling a backend
        #[arg(long)]
        simulate: bool,
        /// Also write daily-rotated logs into this directory
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
    /// List submissions, newest first
    Leaderboard {
        /// Directory holding the model_db collection
        #[arg(long, default_value = "./trainboard-data")]
        data_dir: PathBuf,
        /// Print raw documents as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every field of one submission
    Inspect {
        /// Document id (milliseconds since epoch)
        id: String,
        /// Directory holding the model_db collection
        #[arg(long, default_value = "./trainboard-data")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Commands::Serve { log_dir, .. } => log_dir.clone(),
        _ => None,
    };
    let _guard = init_tracing(log_dir.as_deref());

    match cli.command {
        Commands::Serve {
            config,
            data_dir,
            host,
            port,
            training_endpoint,
            simulate,
            log_dir: _,
        } => {
            let mut cfg = match config {
                Some(path) => ServerConfig::from_yaml_file(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(dir) = data_dir {
                cfg.data_dir = dir;
            }
            if let Some(host) = host {
                cfg.host = host;
            }
            if let Some(port) = port {
                cfg.port = port;
            }
            if training_endpoint.is_some() {
                cfg.training_endpoint = training_endpoint;
            }
            if simulate {
                cfg.training_endpoint = None;
            }
            cmd_serve(cfg).await?;
        }
        Commands::Leaderboard { data_dir, json } => {
            cmd_leaderboard(&data_dir, json)?;
        }
        Commands::Inspect { id, data_dir } => {
            cmd_inspect(&data_dir, id)?;
        }
    }

    Ok(())
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "trainboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .init();
            None
        }
    }
}

// ─── Command implementations ──────────────────────────────────────────────────

async fn cmd_serve(config: ServerConfig) -> Result<()> {
    println!("🏁 Trainboard");
    println!("   Data:     {}", config.data_dir.display());
    println!("   URL:      http://{}:{}", config.host, config.port);
    match &config.training_endpoint {
        Some(endpoint) => println!("   Training: {}", endpoint),
        None => println!("   Training: simulated in the browser"),
    }
    println!();

    serve(config).await?;
    Ok(())
}

fn cmd_leaderboard(data_dir: &Path, json: bool) -> Result<()> {
    let store = FileDocumentStore::open(data_dir)?;
    let docs = store.all_docs()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&docs)?);
        return Ok(());
    }

    if docs.is_empty() {
        println!("No submissions in '{}'", store.dir().display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Submitted", "Name", "Dataset", "Model", "Metric", "Value"]);

    for row in leaderboard(&docs) {
        let submitted = row
            .submitted_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| row.id.clone());
        table.add_row([
            submitted.as_str(),
            or_dash(&row.name),
            or_dash(&row.dataset),
            or_dash(&row.model_type),
            row.metric_name.as_str(),
            or_dash(&row.metric),
        ]);
    }

    println!("Submissions in: {}", store.dir().display());
    println!("{}", table);
    Ok(())
}

fn cmd_inspect(data_dir: &Path, id: String) -> Result<()> {
    let store = FileDocumentStore::open(data_dir)?;
    let id = DocumentId::from(id);
    let Some(doc) = store.get(&id)? else {
        anyhow::bail!("Submission not found: {}", id);
    };

    println!("Submission: {}", doc.id);
    if let Some(t) = doc.id.timestamp() {
        println!("Submitted:  {}", t.format("%Y-%m-%d %H:%M:%S%.3f UTC"));
    }
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Field", "Value"]);
    for (key, value) in doc.record.iter() {
        table.add_row([key.as_str(), &value.to_string()]);
    }
    println!("{}", table);
    Ok(())
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
