use std::fs;
use std::path::{Path, PathBuf};

use form_compiler::normalize_lines;
use snafu::prelude::*;

use crate::form::{FormResult, OpeningFileSnafu};

/// Reads the survey document as a list of trimmed, non-empty lines.
pub fn read_lines(path: &str) -> FormResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    Ok(normalize_lines(&contents))
}

pub fn resolve_path(root: &Path, path: &str) -> String {
    let p: PathBuf = [root, Path::new(path)].iter().collect();
    p.as_path().display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths() {
        assert_eq!(resolve_path(Path::new("data"), "survey.txt"), "data/survey.txt");
        assert_eq!(resolve_path(Path::new(""), "survey.txt"), "survey.txt");
        assert_eq!(resolve_path(Path::new("data"), "/tmp/survey.txt"), "/tmp/survey.txt");
    }
}
