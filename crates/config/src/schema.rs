/// Config schema types (external tools, session behaviour).
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NvpConfig {
    pub tools: ToolsConfig,
    pub session: SessionConfig,
}

/// Programs invoked on behalf of the active project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Tag indexer, fed a file list on stdin.
    pub tags: ToolCommand,
    /// Full-text search tool, given the project's `search_options`.
    pub search: ToolCommand,
    /// Version-control executable used by the `vcs` pass-through.
    pub vcs: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tags: ToolCommand::new("ctags"),
            search: ToolCommand::new("ack"),
            vcs: ToolCommand::new("git"),
        }
    }
}

/// An executable plus extra arguments placed before the generated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Ask the host to restore the saved session right after opening.
    pub restore_on_open: bool,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = NvpConfig::default();
        assert_eq!(cfg.tools.tags.program, "ctags");
        assert_eq!(cfg.tools.search.program, "ack");
        assert_eq!(cfg.tools.vcs.program, "git");
        assert!(!cfg.session.restore_on_open);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: NvpConfig = toml::from_str(
            r#"
            [tools.search]
            program = "rg"
            args = ["--hidden"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.tools.search.program, "rg");
        assert_eq!(cfg.tools.search.args, vec!["--hidden".to_string()]);
        assert_eq!(cfg.tools.tags.program, "ctags");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let res: Result<NvpConfig, _> = toml::from_str("[tools]\nbrowser = \"nnn\"\n");
        assert!(res.is_err());
    }
}
