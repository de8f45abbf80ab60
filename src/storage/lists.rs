//! Domain list files

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::NameSet;

/// Reads every list file into one combined name set
pub fn read_names(paths: &[PathBuf]) -> Result<NameSet> {
    let mut names = NameSet::new();

    for path in paths {
        let file = File::open(path)
            .with_context(|| format!("Failed to open list file: {}", path.display()))?;
        names
            .read_from(path, BufReader::new(file))
            .with_context(|| format!("Failed to read list file: {}", path.display()))?;
        tracing::debug!(file = %path.display(), total = names.len(), "read list file");
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn combines_files() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.lst");
        let second = dir.path().join("second.lst");
        fs::write(&first, "terraform.io cloudflare.com\n# hashicorp.com\n").unwrap();
        fs::write(&second, "cloudflare.com bad..name\nexample.org\n").unwrap();

        let names = read_names(&[first, second.clone()]).unwrap();

        let parsed: Vec<&str> = names.parsed_names().map(|n| n.as_str()).collect();
        assert_eq!(parsed, ["cloudflare.com", "example.org", "terraform.io"]);
        assert_eq!(names.unparsed_names().len(), 1);
        assert_eq!(names.unparsed_names()[&second], ["bad..name"]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere.lst");

        let err = read_names(&[missing]).unwrap_err();
        assert!(err.to_string().contains("nowhere.lst"));
    }

    #[test]
    fn no_files_no_names() {
        let names = read_names(&[]).unwrap();
        assert!(names.is_empty());
        assert!(!names.has_unparsed());
    }
}
