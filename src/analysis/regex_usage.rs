//! Textual class-usage heuristic.
//!
//! A candidate class is used when any other file matches one of the
//! reference shapes in [`REFERENCE_PATTERNS`] instantiated with its name.

use super::{ExclusionPolicy, Reference};
use crate::discovery::{LoadedFile, SourceFile};
use crate::error::{ScanError, ScanResult};
use crate::model::Location;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Placeholder replaced by the escaped class name
const NAME: &str = "%s";

/// Reference shapes, one regex template per row
pub const REFERENCE_PATTERNS: &[(&str, &str)] = &[
    ("import", r"import\s+.*\.%s\s*;"),
    ("extends", r"extends\s+%s[\s{]"),
    ("implements", r"implements\s+.*%s[\s,{]"),
    ("annotation", r"@%s[\s(]"),
    ("generic", r"<\s*%s\s*>"),
    ("wildcard extends", r"<\s*\?\s+extends\s+%s\s*>"),
    ("wildcard super", r"<\s*\?\s+super\s+%s\s*>"),
    ("variable", r"%s\s+\w+\s*[;=]"),
    ("array", r"%s\[\]"),
    ("instantiation", r"new\s+%s\s*\("),
    ("throws", r"throws\s+.*%s"),
    ("catch", r"catch\s*\(\s*%s"),
    ("return type", r"public\s+.*%s\s+\w+\s*\("),
    ("first parameter", r"\(\s*%s\s+\w+"),
    ("next parameter", r",\s*%s\s+\w+"),
    ("static field", r"static\s+.*%s\s+\w+"),
    ("class literal", r"%s\.class"),
    ("static access", r"%s\."),
    ("instanceof", r"instanceof\s+%s"),
];

/// Compile every reference pattern for one class name
pub fn reference_patterns(class_name: &str) -> ScanResult<Vec<Regex>> {
    let escaped = regex::escape(class_name);
    REFERENCE_PATTERNS
        .iter()
        .map(|(_, template)| {
            Regex::new(&template.replace(NAME, &escaped)).map_err(|source| ScanError::Pattern {
                name: class_name.to_string(),
                source,
            })
        })
        .collect()
}

fn declaration_regex() -> &'static Option<Regex> {
    static DECLARATION: OnceLock<Option<Regex>> = OnceLock::new();
    DECLARATION.get_or_init(|| Regex::new(r"(?m)(?:^|\s)(?:class|interface|enum)\s+(\w+)").ok())
}

fn package_regex() -> &'static Option<Regex> {
    static PACKAGE: OnceLock<Option<Regex>> = OnceLock::new();
    PACKAGE.get_or_init(|| Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").ok())
}

/// Name of the first declared class, interface or enum, else the file stem
pub fn extract_class_name(file: &SourceFile, contents: &str) -> String {
    declaration_regex()
        .as_ref()
        .and_then(|re| re.captures(contents))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| file.stem().map(str::to_string))
        .unwrap_or_default()
}

/// Package declaration plus class name, else the path below `root` joined with `.`
pub fn qualified_name(root: &Path, file: &SourceFile, contents: &str, class_name: &str) -> String {
    let package = package_regex()
        .as_ref()
        .and_then(|re| re.captures(contents))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    if let Some(package) = package {
        return format!("{}.{}", package, class_name);
    }

    let relative = file.path.strip_prefix(root).unwrap_or(&file.path);
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.push(class_name.to_string());
    segments.join(".")
}

/// One regex-mode candidate
#[derive(Debug, Clone)]
pub struct RegexCandidate {
    /// Index into the universe
    pub file: usize,
    pub class_name: String,
    pub qualified_name: String,
}

/// Regex engine over the loaded files of one source tree
pub struct RegexUsageEngine {
    root: PathBuf,
    universe: Vec<LoadedFile>,
}

impl RegexUsageEngine {
    pub fn new(root: impl Into<PathBuf>, universe: Vec<LoadedFile>) -> Self {
        Self {
            root: root.into(),
            universe,
        }
    }

    /// Read all files in parallel; unreadable files are left out
    pub fn load(files: &[SourceFile]) -> Vec<LoadedFile> {
        let loaded: Vec<LoadedFile> = files
            .par_iter()
            .filter_map(|file| match file.read_contents() {
                Ok(contents) => Some(LoadedFile {
                    file: file.clone(),
                    contents,
                }),
                Err(e) => {
                    warn!("Skipping {}: {}", file.path.display(), e);
                    None
                }
            })
            .collect();

        debug!("Loaded {} of {} files", loaded.len(), files.len());
        loaded
    }

    pub fn universe(&self) -> &[LoadedFile] {
        &self.universe
    }

    /// Files not excluded by name, with their extracted class names
    pub fn candidates(&self, policy: &ExclusionPolicy) -> Vec<RegexCandidate> {
        self.universe
            .iter()
            .enumerate()
            .filter(|(_, loaded)| !policy.is_excluded_file(&loaded.file.path))
            .map(|(index, loaded)| {
                let class_name = extract_class_name(&loaded.file, &loaded.contents);
                let qualified_name =
                    qualified_name(&self.root, &loaded.file, &loaded.contents, &class_name);
                RegexCandidate {
                    file: index,
                    class_name,
                    qualified_name,
                }
            })
            .collect()
    }

    /// Whether any other file references the candidate
    pub fn is_used(&self, candidate: &RegexCandidate) -> ScanResult<bool> {
        let patterns = reference_patterns(&candidate.class_name)?;
        let own_path = &self.universe[candidate.file].file.path;

        Ok(self
            .universe
            .iter()
            .filter(|other| &other.file.path != own_path)
            .any(|other| patterns.iter().any(|re| re.is_match(&other.contents))))
    }

    /// The candidate as an unused-class finding, or `None` when it is used
    pub fn check(&self, candidate: &RegexCandidate) -> ScanResult<Option<Reference>> {
        if self.is_used(candidate)? {
            return Ok(None);
        }
        let path = self.universe[candidate.file].file.path.clone();
        Ok(Some(
            Reference::new(candidate.qualified_name.clone()).with_location(Location::new(path, 1, 1)),
        ))
    }
}
