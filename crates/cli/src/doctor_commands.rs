//! `nvp doctor`: environment check for the tools nvp drives.
//!
//! Prints a structured report with `[ok]`, `[warn]`, `[fail]`, `[skip]`, or
//! `[info]` status indicators per item.

use std::path::Path;

use {
    nvp_config::{NvpConfig, ToolCommand},
    nvp_projects::{DESCRIPTOR_FILE_NAME, Error as ProjectError},
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Skip,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Skip => DIM,
            Self::Info => CYAN,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

// ── Printing ────────────────────────────────────────────────────────────────

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Returns `true` when no check failed.
pub fn handle_doctor(config: &NvpConfig, cwd: &Path) -> bool {
    eprintln!("{BOLD}nvp doctor{RESET}");
    eprintln!("{BOLD}=========={RESET}\n");

    let sections = vec![
        check_config(),
        check_tools(config),
        check_project(cwd),
    ];

    let (errors, warnings) = print_report(&sections);
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    errors == 0
}

// ── Checks ──────────────────────────────────────────────────────────────────

fn check_config() -> Section {
    let mut section = Section::new("Config");
    match nvp_config::config_dir() {
        Some(dir) => section.push(Status::Info, format!("user config dir: {}", dir.display())),
        None => section.push(Status::Skip, "no home directory, user config not searched"),
    }
    section
}

fn check_tools(config: &NvpConfig) -> Section {
    let mut section = Section::new("Tools");
    for (name, tool) in [
        ("tags", &config.tools.tags),
        ("search", &config.tools.search),
        ("vcs", &config.tools.vcs),
    ] {
        check_tool(&mut section, name, tool);
    }
    section
}

fn check_tool(section: &mut Section, name: &str, tool: &ToolCommand) {
    let cmd = &tool.program;
    if Path::new(cmd).is_absolute() {
        if Path::new(cmd).exists() {
            section.push(Status::Ok, format!("{name}: command \"{cmd}\" found"));
        } else {
            section.push(Status::Fail, format!("{name}: command \"{cmd}\" not found"));
        }
    } else {
        match which::which(cmd) {
            Ok(path) => {
                section.push(
                    Status::Ok,
                    format!("{name}: command \"{cmd}\" found at {}", path.display()),
                );
            },
            Err(_) => {
                section.push(
                    Status::Fail,
                    format!("{name}: command \"{cmd}\" not found in PATH"),
                );
            },
        }
    }
}

fn check_project(cwd: &Path) -> Section {
    let mut section = Section::new("Project");
    match nvp_projects::locate(cwd) {
        Ok(root) => section.push(Status::Ok, format!("project root: {}", root.display())),
        Err(ProjectError::NotFound { .. }) => section.push(
            Status::Info,
            format!("no {DESCRIPTOR_FILE_NAME} above {}", cwd.display()),
        ),
        Err(e) => section.push(Status::Warn, format!("project lookup failed: {e}")),
    }
    section
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels() {
        assert_eq!(Status::Ok.label(), "ok");
        assert_eq!(Status::Warn.label(), "warn");
        assert_eq!(Status::Fail.label(), "fail");
        assert_eq!(Status::Skip.label(), "skip");
        assert_eq!(Status::Info.label(), "info");
    }

    #[test]
    fn print_report_counts_errors_and_warnings() {
        let mut section = Section::new("test");
        section.push(Status::Ok, "fine");
        section.push(Status::Warn, "caution");
        section.push(Status::Fail, "broken");
        section.push(Status::Info, "note");

        let (errors, warnings) = print_report(&[section]);
        assert_eq!(errors, 1);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn missing_tool_fails() {
        let mut config = NvpConfig::default();
        config.tools.tags = ToolCommand::new("nvp-no-such-ctags");
        config.tools.vcs = ToolCommand::new("/nonexistent/git");
        let section = check_tools(&config);
        assert_eq!(section.items[0].status, Status::Fail);
        assert_eq!(section.items[2].status, Status::Fail);
    }

    #[test]
    fn project_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(check_project(&nested).items[0].status, Status::Info);

        std::fs::write(dir.path().join(DESCRIPTOR_FILE_NAME), "name: x\n").unwrap();
        let section = check_project(&nested);
        assert_eq!(section.items[0].status, Status::Ok);
        assert!(section.items[0].message.contains(&dir.path().display().to_string()));
    }
}
