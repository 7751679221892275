// Parallel model builder using rayon

use super::{binder, JavaModel};
use crate::discovery::SourceFile;
use crate::error::ScanResult;
use crate::parser::{CompilationUnit, JavaParser, Parser};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// How forgiving a model build is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep files whose syntax tree contains errors
    pub keep_error_trees: bool,

    /// Keep the first of several declarations with the same qualified name
    /// instead of failing the build
    pub allow_duplicates: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            keep_error_trees: false,
            allow_duplicates: false,
        }
    }

    pub fn tolerant() -> Self {
        Self {
            keep_error_trees: true,
            allow_duplicates: true,
        }
    }
}

/// Builds a bound [`JavaModel`] from source files
pub struct ModelBuilder {
    options: ParseOptions,
}

impl ModelBuilder {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Build strictly, retrying once with tolerant options when the strict
    /// build fails in a way a tolerant parse can get past
    pub fn build_with_retry(files: &[SourceFile]) -> ScanResult<JavaModel> {
        match Self::new(ParseOptions::strict()).build(files) {
            Ok(model) => Ok(model),
            Err(e) if e.is_retryable() => {
                warn!("Strict model build failed ({}), retrying tolerant", e);
                Self::new(ParseOptions::tolerant()).build(files)
            }
            Err(e) => Err(e),
        }
    }

    /// Parse all files in parallel, then assemble and bind the model.
    ///
    /// Unreadable or unparsable files are left out of the model.
    pub fn build(&self, files: &[SourceFile]) -> ScanResult<JavaModel> {
        info!("Parsing {} files in parallel...", files.len());

        let results: Vec<Option<CompilationUnit>> =
            files.par_iter().map(|file| self.parse_file(file)).collect();

        let mut model = JavaModel::new();
        let mut skipped = 0usize;

        // Files are sorted, so ids and first-wins choices are deterministic
        for unit in results {
            match unit {
                Some(unit) => {
                    model.add_unit(unit, self.options.allow_duplicates)?;
                }
                None => skipped += 1,
            }
        }

        info!(
            "Parsed {} types, {} methods, {} call sites ({} files skipped)",
            model.types().len(),
            model.methods().len(),
            model.calls().len(),
            skipped
        );

        let bound = binder::bind_calls(&mut model);
        debug!("Bound {} of {} call sites", bound, model.calls().len());

        Ok(model)
    }

    fn parse_file(&self, file: &SourceFile) -> Option<CompilationUnit> {
        let contents = match file.read_contents() {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Skipping {}: {}", file.path.display(), e);
                return None;
            }
        };

        let unit = match JavaParser::new().parse(&file.path, &contents) {
            Ok(unit) => unit,
            Err(e) => {
                debug!("Parse error (continuing): {}", e);
                return None;
            }
        };

        if unit.has_errors() && !self.options.keep_error_trees {
            debug!(
                "Dropping {} ({} syntax errors)",
                file.path.display(),
                unit.syntax_errors
            );
            return None;
        }

        Some(unit)
    }
}
