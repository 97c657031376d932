mod doctor_commands;
mod error;
mod orchestrator;
mod serve;
mod session_host;

use std::{fs::OpenOptions, path::PathBuf, process::ExitCode, sync::Mutex};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    nvp_protocol::ResponseFrame,
    serde_json::{Value, json},
    tracing::debug,
    tracing_subscriber::{
        EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
    },
};

use crate::{
    error::CommandError,
    orchestrator::{Orchestrator, Request},
    session_host::StdioSessionHost,
};

#[derive(Parser)]
#[command(name = "nvp", version, about = "nvp: per-directory projects for text editors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Append logs to this file instead of writing them to stderr.
    #[arg(long, global = true, env = "NVP_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Print outcomes as JSON response frames.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Tool configuration file (skips the search in ./ and the user config dir).
    #[arg(long, global = true, env = "NVP_CONFIG")]
    config: Option<PathBuf>,

    /// Project root or descriptor to use instead of searching upward from the
    /// working directory.
    #[arg(long, global = true, env = "NVP_PROJECT")]
    project: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project in ROOT and open it.
    New {
        root: PathBuf,
        /// Project name. Derived from Cargo.toml, package.json, or the
        /// directory name when omitted.
        #[arg(long)]
        name: Option<String>,
    },
    /// Open a project and print its root.
    Open { path: Option<PathBuf> },
    /// Print the project root.
    Root,
    /// Track a path (defaults to the host's current file).
    AddPath {
        path: Option<PathBuf>,
        #[arg(long, env = "NVP_CURRENT_FILE")]
        current_file: Option<PathBuf>,
    },
    /// Stop tracking a path (defaults to the host's current file).
    RemovePath {
        path: Option<PathBuf>,
        #[arg(long, env = "NVP_CURRENT_FILE")]
        current_file: Option<PathBuf>,
    },
    /// List tracked paths.
    ListPaths,
    /// Regenerate the tags file in the project root.
    GenerateTags,
    /// Search the project with the configured search tool.
    Search {
        query: String,
        /// Search below this path instead of the whole root. Relative paths
        /// resolve against the root.
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Run a version-control command inside the project root.
    Vcs {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Store a session snapshot read from FILE or stdin.
    SaveSession {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write the stored session snapshot to FILE or stdout.
    RestoreSession {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Complete a partially typed file or directory name.
    Complete {
        #[arg(default_value = "")]
        partial: String,
    },
    /// Check that the configured tools are installed.
    Doctor,
    /// Answer JSON-lines requests on stdin until it closes.
    Serve,
}

/// How a payload is shown without `--json`.
#[derive(Clone, Copy)]
enum Plain {
    /// One string field on its own line.
    Field(&'static str),
    /// An array field, one entry per line.
    List(&'static str),
    /// A text field written verbatim.
    Text(&'static str),
    Silent,
}

impl Plain {
    fn for_command(command: &Commands) -> Self {
        match command {
            Commands::New { .. } | Commands::Open { .. } | Commands::Root => Self::Field("root"),
            Commands::ListPaths => Self::List("paths"),
            Commands::Complete { .. } => Self::List("candidates"),
            Commands::GenerateTags => Self::Field("output"),
            Commands::Search { .. } => Self::Text("output"),
            Commands::Vcs { .. } => Self::Text("stdout"),
            _ => Self::Silent,
        }
    }

    fn print(self, payload: &Value) {
        match self {
            Self::Field(key) => {
                if let Some(value) = payload[key].as_str() {
                    println!("{value}");
                }
            },
            Self::List(key) => {
                for item in payload[key].as_array().into_iter().flatten() {
                    if let Some(item) = item.as_str() {
                        println!("{item}");
                    }
                }
            },
            Self::Text(key) => {
                if let Some(value) = payload[key].as_str() {
                    print!("{value}");
                }
            },
            Self::Silent => {},
        }
    }
}

fn init_telemetry(cli: &Cli) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // stdout carries command outcomes, so logs never go there.
    let (writer, ansi) = match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        },
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(writer),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init();
    }
    Ok(())
}

/// Open the project named by `--project`, or the nearest one upward, then
/// run `request` against it.
async fn in_project(
    orchestrator: &mut Orchestrator,
    project: Option<PathBuf>,
    request: Request,
) -> Result<Value, CommandError> {
    orchestrator
        .execute(Request::OpenProject { path: project })
        .await?;
    orchestrator.execute(request).await
}

async fn save_session(
    orchestrator: &mut Orchestrator,
    project: Option<PathBuf>,
    file: Option<PathBuf>,
) -> Result<Value, CommandError> {
    orchestrator
        .execute(Request::OpenProject { path: project })
        .await?;
    let session = orchestrator.session()?;
    session.save_from(&StdioSessionHost::new(file))?;
    Ok(json!({ "path": session.path().display().to_string() }))
}

async fn restore_session(
    orchestrator: &mut Orchestrator,
    project: Option<PathBuf>,
    file: Option<PathBuf>,
) -> Result<Value, CommandError> {
    orchestrator
        .execute(Request::OpenProject { path: project })
        .await?;
    let found = orchestrator
        .session()?
        .restore_into(&StdioSessionHost::new(file))?;
    Ok(json!({ "found": found }))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_telemetry(&cli)?;

    debug!(version = env!("CARGO_PKG_VERSION"), "nvp starting");

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let config = match &cli.config {
        Some(path) => nvp_config::load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => nvp_config::discover_and_load(),
    };
    let mut orchestrator = Orchestrator::new(config, cwd);

    let plain = Plain::for_command(&cli.command);
    let project = cli.project;
    let orch = &mut orchestrator;
    let result = match cli.command {
        Commands::Doctor => {
            let healthy = doctor_commands::handle_doctor(orch.config(), orch.cwd());
            return Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        },
        Commands::Serve => {
            serve::run(orch).await?;
            return Ok(ExitCode::SUCCESS);
        },
        Commands::New { root, name } => orch.execute(Request::NewProject { root, name }).await,
        Commands::Open { path } => {
            orch.execute(Request::OpenProject {
                path: path.or(project),
            })
            .await
        },
        Commands::Complete { partial } => orch.execute(Request::Complete { partial }).await,
        Commands::Root => in_project(orch, project, Request::GetRoot).await,
        Commands::AddPath { path, current_file } => {
            in_project(orch, project, Request::AddPath { path, current_file }).await
        },
        Commands::RemovePath { path, current_file } => {
            in_project(orch, project, Request::RemovePath { path, current_file }).await
        },
        Commands::ListPaths => in_project(orch, project, Request::ListPaths).await,
        Commands::GenerateTags => in_project(orch, project, Request::GenerateTags).await,
        Commands::Search { query, from } => {
            in_project(orch, project, Request::Search { query, from }).await
        },
        Commands::Vcs { args } => in_project(orch, project, Request::Vcs { args }).await,
        Commands::SaveSession { file } => save_session(orch, project, file).await,
        // A raw snapshot on stdout would corrupt the JSON frame, so embed it.
        Commands::RestoreSession { file: None } if cli.json => {
            in_project(orch, project, Request::RestoreSession).await
        },
        Commands::RestoreSession { file } => restore_session(orch, project, file).await,
    };

    match result {
        Ok(payload) => {
            if cli.json {
                println!("{}", serde_json::to_string(&ResponseFrame::ok("", payload))?);
            } else {
                plain.print(&payload);
            }
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => {
            if cli.json {
                println!("{}", serde_json::to_string(&ResponseFrame::err("", e.to_shape()))?);
            } else {
                eprintln!("error[{}]: {e}", e.code());
            }
            Ok(ExitCode::FAILURE)
        },
    }
}
