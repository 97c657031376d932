use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    codec,
    detect::derive_name,
    error::{Error, Result},
    locator::locate,
    paths::{absolutize, absolutize_from},
    types::{CURRENT_SCHEMA_VERSION, DESCRIPTOR_FILE_NAME, ProjectDescriptor, descriptor_path_in},
};

/// Owner of the single active project of this process.
///
/// Every operation that needs an open project goes through
/// [`Registry::require_active`], so a missing project surfaces as
/// [`Error::NoActiveProject`] everywhere.
#[derive(Debug, Default)]
pub struct Registry {
    active: Option<ProjectDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a new descriptor with default options into `root_dir`.
    ///
    /// Does not make the project active; callers follow up with
    /// [`Registry::open`] on the same directory. An empty `name` is replaced
    /// by one derived from the directory.
    pub fn create(&self, name: &str, root_dir: &Path) -> Result<ProjectDescriptor> {
        let root = absolutize(root_dir)?;
        if !root.is_dir() {
            debug!(path = %root.display(), kind = "directory_not_found", "cannot create project");
            return Err(Error::DirectoryNotFound { path: root });
        }

        let name = match name.trim() {
            "" => derive_name(&root),
            trimmed => trimmed.to_string(),
        };
        let descriptor = ProjectDescriptor::new(name, root);
        let bytes = codec::encode(&descriptor)?;

        let path = descriptor.descriptor_path();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), kind = "already_exists", "project already exists");
                return Err(Error::AlreadyExists {
                    path: descriptor.root,
                });
            },
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = file.write_all(&bytes).and_then(|()| file.sync_all()) {
            // A half-written descriptor would block a retry with AlreadyExists.
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %cleanup, "failed to remove partial descriptor");
            }
            return Err(e.into());
        }

        info!(name = %descriptor.name, root = %descriptor.root.display(), "created project");
        Ok(descriptor)
    }

    /// Load a project and make it the active one.
    ///
    /// `path` is the project root, or the descriptor file itself. Without a
    /// path the descriptor is searched upward from the working directory.
    pub fn open(&mut self, path: Option<&Path>) -> Result<&ProjectDescriptor> {
        let root = match path {
            Some(path) => resolve_explicit_root(&absolutize(path)?),
            None => locate(&std::env::current_dir()?)?,
        };
        self.open_root(root)
    }

    /// Like [`Registry::open`] without a path, searching upward from `start`.
    pub fn discover(&mut self, start: &Path) -> Result<&ProjectDescriptor> {
        let root = locate(start)?;
        self.open_root(root)
    }

    fn open_root(&mut self, root: PathBuf) -> Result<&ProjectDescriptor> {
        let descriptor_path = descriptor_path_in(&root);
        let bytes = match fs::read(&descriptor_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %root.display(), kind = "not_found", "no descriptor at path");
                return Err(Error::NotFound { start: root });
            },
            Err(e) => return Err(e.into()),
        };

        let mut descriptor = codec::decode(&bytes).inspect_err(|e| {
            warn!(path = %descriptor_path.display(), kind = %e.kind(), error = %e, "unreadable descriptor");
        })?;
        descriptor.paths = normalize_tracked(&descriptor.paths, &root);
        descriptor.root = root;

        info!(
            name = %descriptor.name,
            root = %descriptor.root.display(),
            paths = descriptor.paths.len(),
            "opened project"
        );
        Ok(self.active.insert(descriptor))
    }

    /// Rewrite the active descriptor file in full.
    ///
    /// Older descriptors are written at the current schema version. A newer
    /// version is never lowered, and keys this version does not know are
    /// written back unchanged.
    pub fn persist(&mut self) -> Result<()> {
        let descriptor = self.require_active_mut()?;
        if descriptor.is_legacy() {
            info!(from = %descriptor.schema_version, to = CURRENT_SCHEMA_VERSION, "upgrading descriptor");
            descriptor.schema_version = CURRENT_SCHEMA_VERSION.to_string();
        }
        let bytes = codec::encode(descriptor)?;
        let path = descriptor.descriptor_path();
        nvp_common::write_atomic(&path, &bytes).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to persist descriptor");
        })?;
        Ok(())
    }

    pub fn active(&self) -> Option<&ProjectDescriptor> {
        self.active.as_ref()
    }

    /// The active project, or [`Error::NoActiveProject`].
    pub fn require_active(&self) -> Result<&ProjectDescriptor> {
        self.active.as_ref().ok_or_else(no_active_project)
    }

    pub(crate) fn require_active_mut(&mut self) -> Result<&mut ProjectDescriptor> {
        self.active.as_mut().ok_or_else(no_active_project)
    }

    /// Root directory of the active project.
    pub fn root(&self) -> Result<&Path> {
        Ok(self.require_active()?.root.as_path())
    }
}

fn no_active_project() -> Error {
    debug!(kind = "no_active_project", "operation requires an open project");
    Error::NoActiveProject
}

/// Accept either a project directory or the descriptor file inside it.
fn resolve_explicit_root(path: &Path) -> PathBuf {
    let is_descriptor = path.file_name().is_some_and(|n| n == DESCRIPTOR_FILE_NAME);
    match path.parent() {
        Some(parent) if is_descriptor && path.is_file() => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Resolve relative entries against `root` and drop duplicates this exposes.
fn normalize_tracked(paths: &[PathBuf], root: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(|p| absolutize_from(p, root))
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
