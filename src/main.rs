use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rewrite_sweep::config::{resolve, SweepConfig};
use rewrite_sweep::driver::{DriverOptions, FileDriver, FileResult};
use rewrite_sweep::store::FsStore;
use rewrite_sweep::transform::TransformKind;
use rewrite_sweep::walker::{FailurePolicy, FileEnumerator, RunSummary, TreeWalker};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rewrite-sweep")]
#[command(about = "Idempotent, span-local rewriting of Rust sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Rewrite rule to apply
    #[arg(value_enum)]
    transform: TransformKind,

    /// File or directory to rewrite (defaults to the configured root)
    path: Option<PathBuf>,

    /// Config file (defaults to rewrite-sweep.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dry run - report what would change without writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Keep going after a file fails; report failures at the end
    #[arg(short, long)]
    keep_going: bool,

    /// Write rewrites even if they stop a Rust file from parsing
    #[arg(long)]
    no_validate: bool,

    /// Print a machine-readable report instead of per-file lines
    #[arg(long)]
    json: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = env::current_dir().context("Failed to read current directory")?;
    let config = resolve(cli.config.as_deref(), &cwd)?;
    let transform = cli
        .transform
        .build(&config)
        .with_context(|| format!("Invalid {} settings", cli.transform))?;

    let options = DriverOptions {
        dry_run: cli.dry_run,
        validate: !cli.no_validate,
        keep_changes: cli.diff,
    };
    let driver = FileDriver::new(transform, FsStore, options);

    let target = cli.path.clone().unwrap_or_else(|| config.walk.root.clone());
    if target.is_file() {
        cmd_file(&cli, &driver, &target)
    } else {
        cmd_tree(&cli, &config, driver, &target)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "rewrite_sweep=warn",
        1 => "rewrite_sweep=info",
        _ => "rewrite_sweep=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_file(cli: &Cli, driver: &FileDriver, path: &Path) -> Result<()> {
    let result = driver.process(path)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        report_file(&result, cli.dry_run);
    }
    Ok(())
}

fn cmd_tree(cli: &Cli, config: &SweepConfig, driver: FileDriver, root: &Path) -> Result<()> {
    let policy = if cli.keep_going || config.walk.keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };
    let walker = TreeWalker::new(driver, FileEnumerator::from_settings(&config.walk), policy);

    let summary = walker
        .run_with(root, |result| {
            if !cli.json {
                report_file(result, cli.dry_run);
            }
        })
        .with_context(|| format!("Run over {} stopped", root.display()))?;

    if cli.json {
        print_json(cli, &summary)?;
    } else {
        let verb = if cli.dry_run { "Would update" } else { "Updated" };
        println!("{} {} file(s)", verb, summary.modified_count());
    }

    if !summary.is_clean() {
        for failure in &summary.failures {
            eprintln!(
                "{} {}: {}",
                "✗".red(),
                failure.path.display(),
                failure.message
            );
        }
        eprintln!(
            "{}",
            format!("{} file(s) failed", summary.failures.len()).red()
        );
        std::process::exit(1);
    }

    Ok(())
}

fn report_file(result: &FileResult, dry_run: bool) {
    if !result.modified {
        return;
    }

    let label = if dry_run { "Would update:" } else { "Updated:" };
    println!("{} {}", label.green(), result.path.display());

    if let Some(change) = &result.change {
        display_diff(&result.path, &change.before, &change.after);
    }
}

fn print_json(cli: &Cli, summary: &RunSummary) -> Result<()> {
    let report = serde_json::json!({
        "transform": cli.transform.to_string(),
        "dry_run": cli.dry_run,
        "modified": summary.modified_count(),
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
