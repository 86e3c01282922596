// IdeaForge server entry point

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ideaforge_lib::config;
use ideaforge_lib::llm::{HttpBackend, LlmClient};
use ideaforge_lib::server::{self, AppState};
use ideaforge_lib::shutdown;
use ideaforge_lib::storage::{transfer, Database};

/// IdeaForge - staged pipeline for turning raw startup ideas into validated product plans
#[derive(Parser, Debug)]
#[command(name = "ideaforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server (the default when no subcommand is given)
    Serve(ServeArgs),

    /// Copy one project's rows from one database file into another
    CopyProject(CopyProjectArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to bind the server to
    #[arg(long, env = "IDEAFORGE_PORT", default_value = "4571")]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Path to the SQLite database (defaults to ~/.ideaforge/ideaforge.db)
    #[arg(long, env = "IDEAFORGE_DB")]
    db: Option<PathBuf>,

    /// Allowed CORS origin (repeat the flag for several; all origins when omitted)
    #[arg(long = "cors-origin")]
    cors_origin: Vec<String>,

    /// Model identifier sent to the chat completion endpoint
    #[arg(long, env = "IDEAFORGE_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "IDEAFORGE_BASE_URL", default_value = "https://api.openai.com")]
    base_url: String,

    /// API key (falls back to ~/.ideaforge/secrets.toml when omitted)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug)]
struct CopyProjectArgs {
    /// Source database file
    #[arg(long)]
    from: PathBuf,

    /// Target database file (created when missing)
    #[arg(long)]
    to: PathBuf,

    /// ID of the project to copy
    #[arg(long)]
    project: String,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli.command {
        Some(Command::CopyProject(args)) => run_copy_project(args),
        Some(Command::Serve(args)) => run_serve_mode(args),
        None => run_serve_mode(cli.serve),
    }
}

fn run_serve_mode(args: ServeArgs) {
    // A missing API key is fatal here, before any request is taken
    let api_key = match config::resolve_api_key(args.api_key.as_deref()) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let db_path = args.db.clone().unwrap_or_else(config::default_db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!(
                    "Error: Failed to create directory '{}': {}",
                    parent.display(),
                    e
                );
                std::process::exit(1);
            }
        }
    }

    let db = match open_database(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!(
                "Error: Failed to open database '{}': {}",
                db_path.display(),
                e
            );
            std::process::exit(1);
        }
    };
    log::info!("Using database: {}", db_path.display());

    let backend = match HttpBackend::new(&args.base_url, &api_key, &args.model) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let llm = LlmClient::new(Arc::new(backend));

    let cors_origins = if args.cors_origin.is_empty() {
        None
    } else {
        Some(args.cors_origin.clone())
    };

    // Create the tokio runtime
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        // Initialize shutdown state
        let shutdown_state = shutdown::ShutdownState::new();
        if let Err(e) = shutdown::register_signal_handlers(shutdown_state.clone()) {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        let state = AppState::new(db, llm, shutdown_state.clone());

        if let Err(e) = server::run_server(args.port, &args.bind, state, cors_origins).await {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }

        shutdown_state.mark_cleanup_complete();
    });
}

fn run_copy_project(args: CopyProjectArgs) {
    match copy_between(&args) {
        Ok(summary) => {
            println!(
                "Copied project '{}' ({} rows total)",
                args.project,
                summary.total()
            );
            println!("  projects:          {}", summary.projects);
            println!("  stages:            {}", summary.stages);
            println!("  reports:           {}", summary.reports);
            println!("  iterations:        {}", summary.iterations);
            println!("  refinement states: {}", summary.refinement_states);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn copy_between(args: &CopyProjectArgs) -> Result<transfer::CopySummary, String> {
    if !args.from.exists() {
        return Err(format!(
            "Source database '{}' does not exist",
            args.from.display()
        ));
    }

    let source = open_database(&args.from).map_err(|e| {
        format!(
            "Failed to open source database '{}': {}",
            args.from.display(),
            e
        )
    })?;
    let target = open_database(&args.to).map_err(|e| {
        format!(
            "Failed to open target database '{}': {}",
            args.to.display(),
            e
        )
    })?;

    transfer::copy_project(&source, &target, &args.project).map_err(|e| e.to_string())
}

fn open_database(path: &Path) -> rusqlite::Result<Database> {
    let db = Database::new(path)?;
    db.init()?;
    Ok(db)
}
