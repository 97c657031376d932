//! Maps host requests onto registry, tracker, session, and tool operations.
//!
//! One-shot subcommands and the `serve` loop both go through
//! [`Orchestrator::execute`], so a request behaves the same whichever way it
//! arrives. Every failure leaves as a [`CommandError`] with a stable code.

use std::path::{Path, PathBuf};

use {
    base64::{Engine, engine::general_purpose::STANDARD as BASE64},
    nvp_config::NvpConfig,
    nvp_projects::{ProjectDescriptor, Registry, complete::complete_path, paths::absolutize_from},
    nvp_protocol::{PROTOCOL_VERSION, RequestFrame, ResponseFrame, methods},
    nvp_sessions::SessionManager,
    serde::{Deserialize, de::DeserializeOwned},
    serde_json::{Value, json},
    tracing::{debug, warn},
};

use crate::error::CommandError;

/// A decoded host request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    NewProject {
        root: PathBuf,
        name: Option<String>,
    },
    OpenProject {
        path: Option<PathBuf>,
    },
    GetRoot,
    AddPath {
        path: Option<PathBuf>,
        current_file: Option<PathBuf>,
    },
    RemovePath {
        path: Option<PathBuf>,
        current_file: Option<PathBuf>,
    },
    ListPaths,
    GenerateTags,
    Search {
        query: String,
        from: Option<PathBuf>,
    },
    Vcs {
        args: Vec<String>,
    },
    SaveSession {
        data: Vec<u8>,
    },
    RestoreSession,
    Complete {
        partial: String,
    },
    Version,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NewProjectParams {
    root: PathBuf,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OpenProjectParams {
    path: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathParams {
    path: Option<PathBuf>,
    current_file: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchParams {
    query: String,
    from: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VcsParams {
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SaveSessionParams {
    /// Base64 encoded snapshot.
    data: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CompleteParams {
    #[serde(default)]
    partial: String,
}

fn params<T: DeserializeOwned>(params: Option<&Value>) -> Result<T, CommandError> {
    let value = match params {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value.clone(),
    };
    serde_json::from_value(value).map_err(|e| CommandError::invalid(format!("invalid params: {e}")))
}

impl Request {
    pub fn from_frame(frame: &RequestFrame) -> Result<Self, CommandError> {
        let raw = frame.params.as_ref();
        let request = match frame.method.as_str() {
            methods::NEW_PROJECT => {
                let p: NewProjectParams = params(raw)?;
                Self::NewProject {
                    root: p.root,
                    name: p.name,
                }
            },
            methods::OPEN_PROJECT => {
                let p: OpenProjectParams = params(raw)?;
                Self::OpenProject { path: p.path }
            },
            methods::GET_ROOT => Self::GetRoot,
            methods::ADD_PATH => {
                let p: PathParams = params(raw)?;
                Self::AddPath {
                    path: p.path,
                    current_file: p.current_file,
                }
            },
            methods::REMOVE_PATH => {
                let p: PathParams = params(raw)?;
                Self::RemovePath {
                    path: p.path,
                    current_file: p.current_file,
                }
            },
            methods::LIST_PATHS => Self::ListPaths,
            methods::GENERATE_TAGS => Self::GenerateTags,
            methods::SEARCH => {
                let p: SearchParams = params(raw)?;
                Self::Search {
                    query: p.query,
                    from: p.from,
                }
            },
            methods::VCS => {
                let p: VcsParams = params(raw)?;
                Self::Vcs { args: p.args }
            },
            methods::SAVE_SESSION => {
                let p: SaveSessionParams = params(raw)?;
                let data = BASE64
                    .decode(p.data.as_bytes())
                    .map_err(|e| CommandError::invalid(format!("session data is not base64: {e}")))?;
                Self::SaveSession { data }
            },
            methods::RESTORE_SESSION => Self::RestoreSession,
            methods::COMPLETE => {
                let p: CompleteParams = params(raw)?;
                Self::Complete { partial: p.partial }
            },
            methods::VERSION => Self::Version,
            other => return Err(CommandError::invalid(format!("unknown method: {other}"))),
        };
        Ok(request)
    }
}

/// Process-wide command state: the registry holding the one active project,
/// plus the loaded tool configuration.
pub struct Orchestrator {
    registry: Registry,
    config: NvpConfig,
    /// Base for relative completions.
    cwd: PathBuf,
}

impl Orchestrator {
    pub fn new(config: NvpConfig, cwd: PathBuf) -> Self {
        Self {
            registry: Registry::new(),
            config,
            cwd,
        }
    }

    pub fn config(&self) -> &NvpConfig {
        &self.config
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Snapshot storage of the active project.
    pub fn session(&self) -> Result<SessionManager, CommandError> {
        Ok(SessionManager::new(self.registry.root()?))
    }

    /// Decode and run one protocol frame.
    pub async fn handle(&mut self, frame: RequestFrame) -> ResponseFrame {
        let result = match Request::from_frame(&frame) {
            Ok(request) => self.execute(request).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(payload) => ResponseFrame::ok(frame.id, payload),
            Err(e) => {
                warn!(method = %frame.method, code = e.code(), error = %e, "request failed");
                ResponseFrame::err(frame.id, e.to_shape())
            },
        }
    }

    pub async fn execute(&mut self, request: Request) -> Result<Value, CommandError> {
        debug!(request = ?request, "executing request");
        match request {
            Request::NewProject { root, name } => {
                let created = self.registry.create(name.as_deref().unwrap_or(""), &root)?;
                let descriptor = self.registry.open(Some(&created.root))?;
                Ok(open_payload(descriptor, &self.config))
            },
            Request::OpenProject { path } => {
                let descriptor = self.registry.open(path.as_deref())?;
                Ok(open_payload(descriptor, &self.config))
            },
            Request::GetRoot => Ok(json!({ "root": display(self.registry.root()?) })),
            Request::AddPath { path, current_file } => {
                let path = pick_path(path, current_file)?;
                let added = self.registry.tracker().add(&path)?;
                Ok(json!({ "path": display(&path), "added": added }))
            },
            Request::RemovePath { path, current_file } => {
                let path = pick_path(path, current_file)?;
                let removed = self.registry.tracker().remove(&path)?;
                Ok(json!({ "path": display(&path), "removed": removed }))
            },
            Request::ListPaths => {
                let paths: Vec<String> = self
                    .registry
                    .tracker()
                    .list()?
                    .iter()
                    .map(|p| display(p))
                    .collect();
                Ok(json!({ "paths": paths }))
            },
            Request::GenerateTags => {
                let root = self.registry.root()?;
                let report = nvp_tools::generate_tags(&self.config.tools.tags, root).await?;
                Ok(json!({ "files": report.files, "output": display(&report.output) }))
            },
            Request::Search { query, from } => {
                let descriptor = self.registry.require_active()?;
                let target = match from {
                    Some(from) => absolutize_from(&from, &descriptor.root),
                    None => descriptor.root.clone(),
                };
                let outcome = nvp_tools::search(
                    &self.config.tools.search,
                    &descriptor.search_options,
                    &query,
                    &target,
                )
                .await?;
                Ok(json!({ "matched": outcome.matched, "output": outcome.output }))
            },
            Request::Vcs { args } => {
                let root = self.registry.root()?;
                let output = nvp_tools::run_vcs(&self.config.tools.vcs, root, &args).await?;
                Ok(json!({
                    "code": output.code,
                    "stdout": output.stdout,
                    "stderr": output.stderr,
                }))
            },
            Request::SaveSession { data } => {
                let session = self.session()?;
                session.save(&data)?;
                Ok(json!({ "path": display(session.path()), "bytes": data.len() }))
            },
            Request::RestoreSession => match self.session()?.restore()? {
                Some(blob) => Ok(json!({ "found": true, "data": BASE64.encode(blob) })),
                None => Ok(json!({ "found": false })),
            },
            Request::Complete { partial } => {
                Ok(json!({ "candidates": complete_path(&partial, &self.cwd) }))
            },
            Request::Version => Ok(json!({
                "protocol": PROTOCOL_VERSION,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        }
    }
}

fn open_payload(descriptor: &ProjectDescriptor, config: &NvpConfig) -> Value {
    let has_session = SessionManager::new(&descriptor.root).exists();
    json!({
        "name": descriptor.name,
        "root": display(&descriptor.root),
        "schema_version": descriptor.schema_version,
        "open_browsers": descriptor.open_browsers,
        "has_session": has_session,
        "restore_session": config.session.restore_on_open && has_session,
    })
}

/// An explicit path wins over the host's current file.
fn pick_path(path: Option<PathBuf>, current_file: Option<PathBuf>) -> Result<PathBuf, CommandError> {
    path.or(current_file)
        .ok_or_else(|| CommandError::invalid("no path given and no current file"))
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
