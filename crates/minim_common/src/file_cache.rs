use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Source texts keyed by canonical path, so that diagnostics can quote the code they point at.
#[derive(Clone, Debug, Default)]
pub struct FileCache {
    files: BTreeMap<PathBuf, String>,
}

impl FileCache {
    pub fn new() -> Self {
        FileCache {
            files: BTreeMap::new(),
        }
    }

    pub fn read(&mut self, path: impl AsRef<Path>) -> io::Result<&str> {
        let canonical = path.as_ref().canonicalize()?;
        if !self.files.contains_key(&canonical) {
            let content = fs::read_to_string(&canonical)?;
            self.files.insert(canonical.clone(), content);
        }
        Ok(&self.files[&canonical])
    }

    /// Looks up a file previously loaded with `read`.
    pub fn read_cached(&self, path: impl AsRef<Path>) -> io::Result<&str> {
        let canonical = path.as_ref().canonicalize()?;
        self.files
            .get(&canonical)
            .map(String::as_str)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} was never loaded", canonical.display()),
                )
            })
    }
}
