use std::path::Path;

use {nvp_config::ToolCommand, serde::Serialize, tracing::info};

use crate::{
    error::{Error, Result},
    exec::Invocation,
};

/// Result of a search run. Exit status 1 means "no matches" for grep-style
/// tools and is not treated as a failure.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub matched: bool,
    pub output: String,
}

/// Build the search invocation: configured args, then the project's
/// `search_options` split into shell words, then the query and the target.
pub fn search_invocation(
    tool: &ToolCommand,
    search_options: &str,
    query: &str,
    target: &Path,
) -> Result<Invocation> {
    let options = shlex::split(search_options).ok_or_else(|| Error::InvalidOptions {
        options: search_options.to_string(),
    })?;
    Ok(Invocation::from_tool(tool)
        .args(options)
        // Keeps a query such as `-v` from being read as an option.
        .arg("--")
        .arg(query)
        .arg(target))
}

pub async fn search(
    tool: &ToolCommand,
    search_options: &str,
    query: &str,
    target: &Path,
) -> Result<SearchOutcome> {
    let invocation = search_invocation(tool, search_options, query, target)?;
    let output = invocation.output(None).await?;
    match output.code {
        0 | 1 => {
            let matched = output.code == 0;
            info!(query = %query, target = %target.display(), matched, "search finished");
            Ok(SearchOutcome {
                matched,
                output: output.stdout,
            })
        },
        code => Err(Error::command_failed(
            invocation.program(),
            code,
            output.stderr.trim(),
        )),
    }
}
