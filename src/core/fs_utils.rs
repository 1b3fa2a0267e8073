//! File system utility helpers (BOM-aware readers, atomic writes)
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read a text file as UTF-8, stripping UTF-8 BOM if present.
///
/// Editors on Windows like to prepend a BOM to JSON and TOML files, which
/// `serde_json` rejects.
pub fn read_text_file(path: &Path) -> io::Result<String> {
    let mut content = fs::read_to_string(path)?;
    if content.starts_with('\u{FEFF}') {
        content = content.trim_start_matches('\u{FEFF}').to_string();
    }
    Ok(content)
}

/// Replace `path` with `content` via a sibling temp file and a rename.
///
/// Readers in this process never observe a half-written file.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_sibling(path);
    fs::write(&tmp, content)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "data".into());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bom_is_stripped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, "\u{FEFF}[]").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "[]");
    }

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("log.json");

        write_atomic(&path, "[1]").unwrap();
        write_atomic(&path, "[2]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[2]");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
