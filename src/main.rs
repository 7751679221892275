use bigclean::scan::Progress;
use bigclean::{Config, ReportFormat, Reporter, ScanMode, Scanner};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use miette::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// bigclean - find unused classes and methods in Java source trees
#[derive(Parser, Debug)]
#[command(name = "bigclean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory of the Java sources
    #[arg(default_value = ".")]
    path: PathBuf,

    /// What to look for
    #[arg(short, long, value_enum, default_value = "classes")]
    scan: ScanTarget,

    /// Engine for the class scan (the method scan always uses the AST)
    #[arg(short, long, value_enum, default_value = "regex")]
    mode: ScanMode,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: ReportFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads (defaults to available parallelism)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Seconds to wait for outstanding work before giving up
    #[arg(long)]
    timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only errors and the report
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ScanTarget {
    #[default]
    Classes,
    Methods,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("bigclean v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    let progress = (!cli.quiet).then(progress_bar);
    let mut scanner = Scanner::new(config);
    if let Some(pb) = &progress {
        let pb = pb.clone();
        scanner = scanner.with_progress(Arc::new(move |p: Progress| {
            pb.set_length(p.total as u64);
            pb.set_position(p.completed as u64);
            pb.set_message(p.label);
        }));
    }

    let reporter = Reporter::new(cli.format, cli.output.clone());

    let failed = match cli.scan {
        ScanTarget::Classes => {
            let report = scanner.scan_unused_classes(&cli.path, cli.mode);
            finish(progress.as_ref());
            reporter.report(&report)?;
            report.is_failed()
        }
        ScanTarget::Methods => {
            let report = scanner.scan_unused_methods(&cli.path);
            finish(progress.as_ref());
            reporter.report(&report)?;
            report.is_failed()
        }
    };

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // CLI flags win over the file
    if let Some(threads) = cli.threads {
        config.scan.threads = Some(threads);
    }
    if let Some(timeout) = cli.timeout {
        config.scan.timeout_secs = timeout;
    }

    Ok(config)
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

fn finish(progress: Option<&ProgressBar>) {
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
}
