use super::Finding;
use crate::analysis::ScanReport;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Group findings under their source file
    group_by_file: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            group_by_file: true,
        }
    }

    pub fn with_grouping(mut self, group: bool) -> Self {
        self.group_by_file = group;
        self
    }

    pub fn report<T: Finding>(&self, report: &ScanReport<T>) -> Result<()> {
        print!("{}", self.render(report));
        Ok(())
    }

    /// Render the report as it would be printed
    pub fn render<T: Finding>(&self, report: &ScanReport<T>) -> String {
        let mut out = String::new();

        match report {
            ScanReport::NoIssues => {
                let _ = writeln!(out, "{}", format!("No unused {} found!", T::KIND).green().bold());
            }
            ScanReport::Failed { message } => {
                let _ = writeln!(out, "{} {}", "Scan failed:".red().bold(), message);
            }
            ScanReport::Findings(findings) => {
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "{}",
                    format!("Found {} unused {}:", findings.len(), T::KIND)
                        .yellow()
                        .bold()
                );
                let _ = writeln!(out);

                if self.group_by_file {
                    self.render_grouped(&mut out, findings);
                } else {
                    for item in findings {
                        self.render_item(&mut out, item);
                    }
                    let _ = writeln!(out);
                }

                let _ = writeln!(out, "{}", "─".repeat(60).dimmed());
                let _ = writeln!(out, "Summary: {} unused {}", findings.len(), T::KIND);
            }
        }

        out
    }

    /// Groups keep the report's order within each file; files are sorted
    fn render_grouped<T: Finding>(&self, out: &mut String, findings: &[T]) {
        let mut by_file: BTreeMap<Option<PathBuf>, Vec<&T>> = BTreeMap::new();
        for item in findings {
            by_file
                .entry(item.location().map(|l| l.file.clone()))
                .or_default()
                .push(item);
        }

        for (file, items) in by_file {
            let header = file
                .map(|f| f.display().to_string())
                .unwrap_or_else(|| "<unknown file>".to_string());
            let _ = writeln!(out, "{}", header.cyan().bold());

            for item in items {
                self.render_item(out, item);
            }
            let _ = writeln!(out);
        }
    }

    fn render_item<T: Finding>(&self, out: &mut String, item: &T) {
        let line = item
            .location()
            .map(|l| l.line.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  {} {}", format!("{:>5}", line).dimmed(), item);
    }
}
