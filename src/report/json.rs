use super::Finding;
use crate::analysis::ScanReport;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report<T: Finding>(&self, report: &ScanReport<T>) -> Result<()> {
        let json = Self::render(report)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    pub fn render<T: Finding>(report: &ScanReport<T>) -> Result<String> {
        let document = JsonReport {
            version: "1.0",
            kind: T::KIND,
            total: report.len(),
            report,
        };
        serde_json::to_string_pretty(&document).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport<'a, T: Serialize> {
    version: &'static str,
    kind: &'static str,
    total: usize,
    report: &'a ScanReport<T>,
}
