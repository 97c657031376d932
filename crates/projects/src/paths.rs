use std::{
    io,
    path::{Path, PathBuf},
};

use path_clean::PathClean;

/// Absolute, lexically normalised form of `path`.
///
/// Relative paths are resolved against `base`. `.` and `..` components are
/// folded without touching the filesystem, so the path does not have to
/// exist and symlinks are left as written.
pub fn absolutize_from(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        base.join(path).clean()
    }
}

/// [`absolutize_from`] against the process working directory.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.clean());
    }
    Ok(absolutize_from(path, &std::env::current_dir()?))
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("/tmp/proj/src/a.txt", "/tmp/proj/src/a.txt")]
    #[case("/tmp/proj/./src/../src/a.txt", "/tmp/proj/src/a.txt")]
    #[case("/tmp/proj/", "/tmp/proj")]
    #[case("src/a.txt", "/base/src/a.txt")]
    #[case("../other", "/other")]
    #[case(".", "/base")]
    fn absolutize_from_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            absolutize_from(Path::new(input), Path::new("/base")),
            PathBuf::from(expected)
        );
    }

    #[test]
    fn absolutize_relative_is_absolute() {
        let abs = absolutize(Path::new("some/file.rs")).unwrap_or_default();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("some/file.rs"));
    }
}
