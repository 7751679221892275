use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a bigclean scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path patterns skipped during file discovery
    pub exclude: Vec<String>,

    /// Worker pool and progress settings
    pub scan: ScanConfig,

    /// Entries appended to the built-in exclusion tables
    pub exclusions: ExclusionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads for the regex scan (defaults to available parallelism)
    pub threads: Option<usize>,

    /// Worker threads for AST class and method scans, capped by `threads`
    pub ast_threads: usize,

    /// Candidates per task in regex mode
    pub regex_batch_size: usize,

    /// Candidates (or call sites, in method mode) per task in AST mode
    pub ast_batch_size: usize,

    /// Log progress every N completed tasks
    pub progress_interval: usize,

    /// Give up waiting for outstanding tasks after this many seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Extra file-name suffixes (without `.java`) that are never regex candidates
    pub file_suffixes: Vec<String>,

    /// Extra framework-bean annotations that remove a type from class candidates
    pub bean_annotations: Vec<String>,

    /// Extra declaring-type annotations that suppress unused-method findings
    pub type_annotations: Vec<String>,

    /// Extra lifecycle-callback annotations on methods
    pub lifecycle_annotations: Vec<String>,

    /// Extra container lifecycle hook method names
    pub lifecycle_methods: Vec<String>,

    /// Extra container-style method names skipped during call resolution
    pub container_methods: Vec<String>,

    /// Extra type-name markers that re-enable resolution of container-style calls
    pub infrastructure_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: vec![
                "**/target/**".to_string(),
                "**/build/**".to_string(),
                "**/.git/**".to_string(),
                "**/.idea/**".to_string(),
                "**/generated/**".to_string(),
            ],
            scan: ScanConfig::default(),
            exclusions: ExclusionConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: None,
            ast_threads: 2,
            regex_batch_size: 1,
            ast_batch_size: 20,
            progress_interval: 10,
            timeout_secs: 600,
        }
    }
}

impl ScanConfig {
    /// Worker count for the regex scan
    pub fn worker_threads(&self) -> usize {
        self.threads
            .filter(|&n| n > 0)
            .unwrap_or_else(available_parallelism)
    }

    /// Worker count for AST class and method scans, never above the general pool size
    pub fn ast_worker_threads(&self) -> usize {
        self.ast_threads.max(1).min(self.worker_threads())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".bigclean.yml",
            ".bigclean.yaml",
            ".bigclean.toml",
            "bigclean.yml",
            "bigclean.yaml",
            "bigclean.toml",
        ];

        for name in &default_names {
            let path: PathBuf = project_root.join(name);
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check if a path matches one of the exclusion patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Simple glob matching for patterns like "*Test" or "**/build/**"
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.starts_with('*') && !pattern.contains('/') {
        return text.ends_with(&pattern[1..]);
    }

    if pattern.ends_with('*') && !pattern.contains('/') {
        return text.starts_with(&pattern[..pattern.len() - 1]);
    }

    if pattern.contains("**") {
        // "**/name/**" must match a whole directory segment
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern
                .trim_start_matches("**/")
                .trim_end_matches("/**")
                .trim_matches('/');
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern) || text.starts_with(&dir_pattern[1..]);
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }
            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }
            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }
            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    text == pattern
}
