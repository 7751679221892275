mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::{MethodReference, Reference, ScanReport};
use crate::model::Location;
use clap::ValueEnum;
use miette::Result;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// A reportable finding
pub trait Finding: Serialize + Display {
    /// Plural noun for headers, e.g. "classes"
    const KIND: &'static str;

    fn location(&self) -> Option<&Location>;
}

impl Finding for Reference {
    const KIND: &'static str = "classes";

    fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

impl Finding for MethodReference {
    const KIND: &'static str = "methods";

    fn location(&self) -> Option<&Location> {
        self.reference.location.as_ref()
    }
}

/// Reporter for writing scan results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    pub fn report<T: Finding>(&self, report: &ScanReport<T>) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(report),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(report),
        }
    }
}
