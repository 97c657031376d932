use std::{fs, path::Path};

/// Return file and directory completions for a partially typed path.
///
/// Candidates keep the form the user typed: a relative partial yields
/// relative candidates, resolved against `base`. Directories end with `/`
/// so the host can keep completing into them. Hidden entries only appear
/// once the typed name starts with a dot.
pub fn complete_path(partial: &str, base: &Path) -> Vec<String> {
    let (typed_dir, prefix) = match partial.rfind(['/', std::path::MAIN_SEPARATOR]) {
        Some(idx) => partial.split_at(idx + 1),
        None => ("", partial),
    };

    let search_dir = if typed_dir.is_empty() {
        base.to_path_buf()
    } else {
        base.join(typed_dir)
    };

    let Ok(entries) = fs::read_dir(&search_dir) else {
        return Vec::new();
    };

    let show_hidden = prefix.starts_with('.');
    let mut results: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if !name.starts_with(prefix) || (name.starts_with('.') && !show_hidden) {
                return None;
            }
            let suffix = if e.path().is_dir() { "/" } else { "" };
            Some(format!("{typed_dir}{name}{suffix}"))
        })
        .collect();

    results.sort();
    results
}
