use crate::config::Config;
use crate::error::{ScanError, ScanResult};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A discovered Java source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path to the file
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Whether a path names a Java source file
    pub fn is_java(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("java")
    }

    /// File name without the `.java` extension
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Read the file contents; invalid UTF-8 sequences become U+FFFD
    pub fn read_contents(&self) -> ScanResult<String> {
        let bytes = std::fs::read(&self.path).map_err(|e| ScanError::io(&self.path, e))?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                debug!("Replacing invalid UTF-8 in {}", self.path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        })
    }
}

/// A source file together with its contents
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub file: SourceFile,
    pub contents: String,
}

/// File finder for discovering Java sources under a root
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all Java files under `root`, sorted by path
    pub fn find_files(&self, root: &Path) -> ScanResult<Vec<SourceFile>> {
        if !root.exists() {
            return Err(ScanError::MissingRoot(root.to_path_buf()));
        }

        debug!("Scanning for files in: {}", root.display());

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .parents(true)
            .follow_links(false)
            .build();

        let mut files: Vec<SourceFile> = walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();
                if !SourceFile::is_java(path) {
                    return None;
                }
                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }
                Some(SourceFile::new(path.to_path_buf()))
            })
            .collect();

        files.sort();
        debug!("Found {} Java files", files.len());
        Ok(files)
    }
}
