//! YAML encoding of [`ProjectDescriptor`].
//!
//! Fields are written in declaration order so descriptors diff cleanly.
//! Unknown keys are carried through a read/write cycle after the known ones,
//! so files written by newer versions survive being touched by this one.

use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    types::ProjectDescriptor,
};

/// Keys older versions used to record the root; the root is always derived
/// from the descriptor's location instead.
const STALE_ROOT_KEYS: [&str; 2] = ["root", ":root"];

/// Serialize a descriptor. The in-memory `root` is not part of the output.
pub fn encode(descriptor: &ProjectDescriptor) -> Result<Vec<u8>> {
    serde_yaml::to_string(descriptor)
        .map(String::into_bytes)
        .map_err(|e| Error::format(e.to_string()))
}

/// Parse a descriptor, filling defaults for missing fields.
///
/// The returned descriptor has an empty `root`; the caller knows where the
/// bytes came from and sets it. Duplicate `paths` entries are collapsed,
/// keeping the first occurrence.
pub fn decode(bytes: &[u8]) -> Result<ProjectDescriptor> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::format(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(Error::format("descriptor is empty"));
    }
    let mut descriptor: ProjectDescriptor =
        serde_yaml::from_str(text).map_err(|e| Error::format(e.to_string()))?;

    for key in STALE_ROOT_KEYS {
        descriptor.extra.remove(key);
    }

    let mut seen = HashSet::new();
    descriptor.paths.retain(|p| seen.insert(p.clone()));
    Ok(descriptor)
}
