use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{info, warn};
use std::{io::Read, path::PathBuf, process::ExitCode, sync::Arc};

use catalogd::{
    marshal, params, repo,
    server::{self, endpoints::actions::ActionContext, errors::ServerError},
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "catalogd")]
#[command(about = "Business catalog over a multi-table record store")]
#[command(version)]
struct Cli {
    /// Use a volatile in-memory store instead of Postgres
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// List businesses
    List {
        /// Only businesses of this owner
        #[arg(long)]
        owner: Option<String>,
        /// Free-text search over names, places and amenities
        #[arg(long)]
        text: Option<String>,
        /// JSON filter, e.g. '{"price_tier": {"$leq": 2}}'
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one business
    Get { id: String },
    /// Create a business from a JSON payload file (`-` reads stdin)
    Create { payload: PathBuf },
    /// Update a business from a JSON payload file (`-` reads stdin)
    Update { payload: PathBuf },
    /// Run a raw action with an optional JSON payload file
    Action {
        name: String,
        payload: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("no database configured, set {} or use --memory", params::ENV_DATABASE_URL)]
    MissingDatabaseUrl,
    #[error("{0}")]
    Repository(#[from] repo::Error),
    #[error("{}", .0.message())]
    Server(#[from] ServerError),
    #[error("{0}")]
    Marshal(#[from] marshal::Error),
    #[error("invalid json :: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to read payload :: {0}")]
    Io(#[from] std::io::Error),
}

fn read_payload(path: &PathBuf) -> Result<Vec<u8>, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read(path)?)
}

async fn pg_store() -> Result<repo::PgRecordStore, CliError> {
    let config = params::configurables();
    let url = config
        .database_url
        .as_deref()
        .ok_or(CliError::MissingDatabaseUrl)?;
    Ok(repo::PgRecordStore::try_new(url, config.db_max_connections).await?)
}

async fn record_store(memory: bool) -> Result<repo::RecordStoreRef, CliError> {
    if memory {
        warn!("using the in-memory store, nothing will be persisted");
        return Ok(Arc::new(repo::MemoryRecordStore::new()));
    }
    Ok(Arc::new(pg_store().await?))
}

fn list_body(
    owner: Option<String>,
    text: Option<String>,
    filter: Option<String>,
) -> Result<Vec<u8>, CliError> {
    let mut filter: serde_json::Value = match filter {
        Some(raw) => serde_json::from_str(&raw)?,
        None => serde_json::json!({}),
    };
    if let Some(text) = text
        && let Some(fields) = filter.as_object_mut()
    {
        fields.insert("text".to_owned(), text.into());
    }
    Ok(serde_json::to_vec(&serde_json::json!({
        "owner": owner,
        "filter": filter,
    }))?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let (name, body) = match cli.command {
        Command::Migrate => {
            if cli.memory {
                println!("{}", "in-memory store, nothing to migrate".yellow());
                return Ok(());
            }
            pg_store().await?.migrate().await?;
            println!("{}", "migrations applied".green().bold());
            return Ok(());
        }
        Command::List {
            owner,
            text,
            filter,
        } => ("business_list".to_owned(), list_body(owner, text, filter)?),
        Command::Get { id } => (
            "business_get".to_owned(),
            serde_json::to_vec(&serde_json::json!({ "id": id }))?,
        ),
        Command::Create { payload } => ("business_create".to_owned(), read_payload(&payload)?),
        Command::Update { payload } => ("business_update".to_owned(), read_payload(&payload)?),
        Command::Action { name, payload } => {
            let body = match payload {
                Some(path) => read_payload(&path)?,
                None => Vec::new(),
            };
            (name, body)
        }
    };

    let ctx = ActionContext::new(record_store(cli.memory).await?);
    let action = marshal::ActionRequest::try_new(&name, &body)?;
    info!("running action `{}`", name);

    let response = server::endpoints::do_action(&ctx, action).await?;
    println!("{}", response.to_json()?);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
