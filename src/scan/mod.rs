//! Scan entry points.
//!
//! Both operations always return a [`ScanReport`]: errors and panics raised
//! anywhere below are logged and turned into [`ScanReport::Failed`].

mod orchestrator;

pub use crate::analysis::ScanReport;
pub use orchestrator::{BatchReport, Orchestrator, Progress, ProgressCallback};

use crate::analysis::{
    ClassUsageResolver, ExclusionPolicy, MethodReference, MethodUsageResolver, Ranker, Reference,
    RegexUsageEngine, UsedSet,
};
use crate::config::Config;
use crate::discovery::FileFinder;
use crate::error::ScanResult;
use crate::model::{CallId, ModelBuilder};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Engine used for the unused-class scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Textual reference patterns over every file
    #[default]
    Regex,
    /// Type references from the parsed model
    Ast,
}

/// Runs scans over one source root with a fixed configuration
pub struct Scanner {
    config: Config,
    policy: ExclusionPolicy,
    progress: Option<ProgressCallback>,
}

impl Scanner {
    pub fn new(config: Config) -> Self {
        let policy = ExclusionPolicy::from_config(&config.exclusions);
        Self {
            config,
            policy,
            progress: None,
        }
    }

    /// Report task completions to `callback` as well as the log
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classes no other code refers to, sorted by qualified name
    pub fn scan_unused_classes(&self, root: &Path, mode: ScanMode) -> ScanReport<Reference> {
        guarded("class scan", || match mode {
            ScanMode::Regex => self.regex_classes(root),
            ScanMode::Ast => self.ast_classes(root),
        })
    }

    /// Methods no call site resolves to, longest first
    pub fn scan_unused_methods(&self, root: &Path) -> ScanReport<MethodReference> {
        guarded("method scan", || self.unused_methods(root))
    }

    /// Worker count for a scan; the method scan takes the AST pool
    fn pool_size(&self, mode: ScanMode) -> usize {
        match mode {
            ScanMode::Regex => self.config.scan.worker_threads(),
            ScanMode::Ast => self.config.scan.ast_worker_threads(),
        }
    }

    fn orchestrator(&self, threads: usize) -> Orchestrator {
        Orchestrator::new(threads, self.config.scan.timeout())
            .with_progress_interval(self.config.scan.progress_interval)
            .with_progress(self.progress.clone())
    }

    fn regex_classes(&self, root: &Path) -> ScanResult<Vec<Reference>> {
        let start = Instant::now();
        let files = FileFinder::new(&self.config).find_files(root)?;
        let engine = Arc::new(RegexUsageEngine::new(root, RegexUsageEngine::load(&files)));
        let candidates = engine.candidates(&self.policy);
        info!(
            "Regex scan: {} candidates across {} files",
            candidates.len(),
            engine.universe().len()
        );

        let worker = Arc::clone(&engine);
        let report = self
            .orchestrator(self.pool_size(ScanMode::Regex))
            .run("regex", candidates, self.config.scan.regex_batch_size, move |batch| {
                let mut unused = Vec::new();
                for candidate in &batch {
                    if let Some(reference) = worker.check(candidate)? {
                        unused.push(reference);
                    }
                }
                Ok(unused)
            })?;

        let mut findings = report.results;
        sort_references(&mut findings);
        info!(
            "Regex scan found {} unused classes in {:.2?}",
            findings.len(),
            start.elapsed()
        );
        Ok(findings)
    }

    fn ast_classes(&self, root: &Path) -> ScanResult<Vec<Reference>> {
        let start = Instant::now();
        let files = FileFinder::new(&self.config).find_files(root)?;
        let model = Arc::new(ModelBuilder::build_with_retry(&files)?);
        let resolver = Arc::new(ClassUsageResolver::new(model, self.policy.clone()));
        let candidates = resolver.candidates();
        info!("AST class scan: {} candidates", candidates.len());

        let worker = Arc::clone(&resolver);
        let report = self
            .orchestrator(self.pool_size(ScanMode::Ast))
            .run("ast-classes", candidates, self.config.scan.ast_batch_size, move |batch| {
                Ok(worker.unused_in(&batch))
            })?;

        let mut findings = report.results;
        sort_references(&mut findings);
        info!(
            "AST class scan found {} unused classes in {:.2?}",
            findings.len(),
            start.elapsed()
        );
        Ok(findings)
    }

    fn unused_methods(&self, root: &Path) -> ScanResult<Vec<MethodReference>> {
        let start = Instant::now();
        let files = FileFinder::new(&self.config).find_files(root)?;
        let model = Arc::new(ModelBuilder::build_with_retry(&files)?);
        let resolver = Arc::new(MethodUsageResolver::new(Arc::clone(&model), self.policy.clone()));
        let used = Arc::new(UsedSet::new());

        let calls: Vec<CallId> = (0..model.calls().len()).collect();
        info!(
            "Method scan: {} methods, {} call sites",
            model.methods().len(),
            calls.len()
        );

        let worker = Arc::clone(&resolver);
        let sink = Arc::clone(&used);
        let report = self
            .orchestrator(self.pool_size(ScanMode::Ast))
            .run("ast-methods", calls, self.config.scan.ast_batch_size, move |batch| {
                sink.extend(worker.resolve_batch(&batch));
                Ok(Vec::<()>::new())
            })?;

        if report.timed_out {
            warn!("Method scan timed out; unused methods are ranked against a partial used set");
        }

        let findings = Ranker::new(&self.policy).rank(&model, &used.snapshot());
        info!(
            "Method scan found {} unused methods ({} used) in {:.2?}",
            findings.len(),
            used.len(),
            start.elapsed()
        );
        Ok(findings)
    }
}

/// Run one scan, converting errors and panics into a failed report
fn guarded<T>(label: &str, scan: impl FnOnce() -> ScanResult<Vec<T>>) -> ScanReport<T> {
    match panic::catch_unwind(AssertUnwindSafe(scan)) {
        Ok(Ok(findings)) => ScanReport::from_findings(findings),
        Ok(Err(e)) => {
            error!("{} failed: {}", label, e);
            ScanReport::failed(e.to_string())
        }
        Err(payload) => {
            let message = orchestrator::panic_message(payload.as_ref());
            error!("{} panicked: {}", label, message);
            ScanReport::failed(message)
        }
    }
}

fn sort_references(references: &mut [Reference]) {
    references.sort_by(|a, b| {
        a.original_class
            .cmp(&b.original_class)
            .then_with(|| location_key(a).cmp(&location_key(b)))
    });
}

fn location_key(reference: &Reference) -> Option<(&Path, usize)> {
    reference
        .location
        .as_ref()
        .map(|l| (l.file.as_path(), l.line))
}

/// Unused classes under `root` with the default configuration
pub fn scan_unused_classes(root: &Path, mode: ScanMode) -> ScanReport<Reference> {
    Scanner::new(Config::default()).scan_unused_classes(root, mode)
}

/// Unused methods under `root` with the default configuration
pub fn scan_unused_methods(root: &Path) -> ScanReport<MethodReference> {
    Scanner::new(Config::default()).scan_unused_methods(root)
}
