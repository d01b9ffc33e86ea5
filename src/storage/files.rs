//! File capability used for loading and saving recordings

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read and write whole text files
///
/// Supplied by the host so the store never decides where files live.
pub trait FileAccess {
    fn read_all(&self, path: &Path) -> io::Result<String>;
    fn write_all(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// Filesystem-backed [`FileAccess`]
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a failed save leaves any existing file intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl LocalFiles {
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl FileAccess for LocalFiles {
    fn read_all(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_all(&self, path: &Path, text: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = Self::temp_path(path);
        let result = (|| {
            let mut file = fs::File::create(&temp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp, path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("capture.txt");

        LocalFiles.write_all(&path, "Time\t1\n").unwrap();
        assert_eq!(LocalFiles.read_all(&path).unwrap(), "Time\t1\n");
        assert!(!LocalFiles::temp_path(&path).exists());
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.txt");

        LocalFiles.write_all(&path, "first").unwrap();
        LocalFiles.write_all(&path, "second").unwrap();
        assert_eq!(LocalFiles.read_all(&path).unwrap(), "second");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = LocalFiles.read_all(&dir.path().join("absent.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
