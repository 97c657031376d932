use std::path::{Path, PathBuf};

use {
    nvp_config::ToolCommand,
    serde::Serialize,
    tracing::{info, warn},
    walkdir::WalkDir,
};

use crate::{
    error::{Error, Result},
    exec::Invocation,
};

/// Tag index written into the project root.
pub const TAGS_FILE_NAME: &str = "tags";

#[derive(Debug, Clone, Serialize)]
pub struct TagsReport {
    pub files: usize,
    pub output: PathBuf,
}

/// Every regular file under `root`, in walk order.
///
/// Symlinks are not followed, so the walk stays inside the project. The tag
/// file itself is left out so regenerating does not index the old index.
/// Entries that cannot be read below the root are logged and skipped; only
/// an unreadable root fails.
pub fn project_files(root: &Path) -> Result<Vec<PathBuf>> {
    let tags_file = root.join(TAGS_FILE_NAME);
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(Error::Walk {
                    root: root.to_path_buf(),
                    source,
                });
            },
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                continue;
            },
        };
        if entry.file_type().is_file() && entry.path() != tags_file {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Regenerate `<root>/tags` by feeding the project's file list to the tag
/// tool (`ctags -f <root>/tags -L -`).
pub async fn generate_tags(tool: &ToolCommand, root: &Path) -> Result<TagsReport> {
    let files = project_files(root)?;
    let output = root.join(TAGS_FILE_NAME);

    let mut list = Vec::new();
    for file in &files {
        list.extend_from_slice(file.as_os_str().as_encoded_bytes());
        list.push(b'\n');
    }

    Invocation::from_tool(tool)
        .arg("-f")
        .arg(&output)
        .arg("-L")
        .arg("-")
        .current_dir(root)
        .checked_output(Some(list))
        .await?;

    info!(root = %root.display(), files = files.len(), "generated tags");
    Ok(TagsReport {
        files: files.len(),
        output,
    })
}
