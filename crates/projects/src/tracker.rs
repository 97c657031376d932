use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{error::Result, paths::absolutize, registry::Registry};

/// Maintains the tracked-path set of the active project.
///
/// Every change is written to disk before returning. When the write fails
/// the in-memory set is rolled back so it keeps matching the file.
pub struct PathTracker<'a> {
    registry: &'a mut Registry,
}

impl<'a> PathTracker<'a> {
    pub fn new(registry: &'a mut Registry) -> Self {
        Self { registry }
    }

    /// Track `path`. Returns `false` if it was already tracked, in which case
    /// nothing is written.
    pub fn add(&mut self, path: &Path) -> Result<bool> {
        let path = absolutize(path)?;
        let descriptor = self.registry.require_active_mut()?;
        if descriptor.paths.contains(&path) {
            debug!(path = %path.display(), "path already tracked");
            return Ok(false);
        }
        descriptor.paths.push(path.clone());

        if let Err(e) = self.registry.persist() {
            if let Ok(descriptor) = self.registry.require_active_mut() {
                descriptor.paths.pop();
            }
            return Err(e);
        }
        info!(path = %path.display(), "tracked path");
        Ok(true)
    }

    /// Stop tracking `path`. Returns whether it was tracked.
    ///
    /// The descriptor is rewritten even when nothing was removed.
    pub fn remove(&mut self, path: &Path) -> Result<bool> {
        let path = absolutize(path)?;
        let descriptor = self.registry.require_active_mut()?;
        let index = descriptor.paths.iter().position(|p| *p == path);
        let removed = index.map(|index| (index, descriptor.paths.remove(index)));

        if let Err(e) = self.registry.persist() {
            if let (Some((index, entry)), Ok(descriptor)) =
                (removed, self.registry.require_active_mut())
            {
                descriptor.paths.insert(index, entry);
            }
            return Err(e);
        }
        if removed.is_some() {
            info!(path = %path.display(), "untracked path");
        } else {
            debug!(path = %path.display(), "path was not tracked");
        }
        Ok(removed.is_some())
    }

    /// Tracked paths in insertion order.
    pub fn list(&self) -> Result<&[PathBuf]> {
        Ok(&self.registry.require_active()?.paths)
    }
}

impl Registry {
    pub fn tracker(&mut self) -> PathTracker<'_> {
        PathTracker::new(self)
    }
}
