use std::path::Path;

use {nvp_config::ToolCommand, tracing::info};

use crate::{
    error::Result,
    exec::{Invocation, ToolOutput},
};

/// Version-control shortcut: `<vcs> -C <root> <args...>`.
pub fn vcs_invocation(tool: &ToolCommand, root: &Path, args: &[String]) -> Invocation {
    Invocation::from_tool(tool)
        .arg("-C")
        .arg(root)
        .args(args)
}

/// Run a VCS subcommand inside the project root and capture its output.
pub async fn run_vcs(tool: &ToolCommand, root: &Path, args: &[String]) -> Result<ToolOutput> {
    let output = vcs_invocation(tool, root, args)
        .checked_output(None)
        .await?;
    info!(root = %root.display(), args = ?args, "vcs command finished");
    Ok(output)
}
