use clap::{ArgAction, Parser, Subcommand};
use flowpatch::prelude::*;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Edit and validate exported workflow graph documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON patch file to a workflow, all-or-nothing
    Apply {
        /// Path to the workflow JSON file
        workflow: PathBuf,
        /// Path to the patch JSON file
        #[arg(short, long)]
        patch: PathBuf,
        /// Write the result here instead of overwriting the workflow
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Apply the patch but do not write anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a workflow's connection graph
    Validate {
        /// Path to the workflow JSON file
        workflow: PathBuf,
        /// Path to a rule set JSON file (routers, expected edges, side channels, field checks)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
    /// Print node, connection source and edge counts
    Stats {
        /// Path to the workflow JSON file
        workflow: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Command::Apply {
            workflow,
            patch,
            output,
            dry_run,
        } => run_apply(workflow, patch, output, dry_run),
        Command::Validate { workflow, rules } => run_validate(workflow, rules),
        Command::Stats { workflow } => run_stats(workflow),
    };
    process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_apply(workflow: PathBuf, patch_path: PathBuf, output: Option<PathBuf>, dry_run: bool) -> i32 {
    let start = Instant::now();

    let doc = load_graph(&workflow).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let patch = Patch::from_file(&patch_path).unwrap_or_else(|e| exit_with_error(&e.to_string()));

    println!(
        "Applying {} operation(s) from '{}' to '{}'...",
        patch.len(),
        patch_path.display(),
        workflow.display()
    );
    let patched = patch
        .apply(&doc)
        .unwrap_or_else(|e| exit_with_error(&format!("{}. No changes were written.", e)));

    let stats = GraphStats::from_document(&patched);
    println!("{}", ReportFormatter::format_stats(&stats));

    if dry_run {
        println!("\nDry run: nothing written.");
        return 0;
    }

    let target = output.unwrap_or(workflow);
    save_graph(&patched, &target).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("\nWrote '{}' in {:?}", target.display(), start.elapsed());
    0
}

fn run_validate(workflow: PathBuf, rules_path: Option<PathBuf>) -> i32 {
    let doc = load_graph(&workflow).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let rules = match rules_path {
        Some(path) => {
            ValidationRules::from_file(&path).unwrap_or_else(|e| exit_with_error(&e.to_string()))
        }
        None => ValidationRules::default(),
    };

    println!("Validating '{}'...\n", workflow.display());
    let violations = validate(&doc, &rules);
    let stats = GraphStats::from_document(&doc);
    println!("{}", ReportFormatter::format_report(&stats, &violations));

    if has_errors(&violations) { 1 } else { 0 }
}

fn run_stats(workflow: PathBuf) -> i32 {
    let doc = load_graph(&workflow).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("{}", ReportFormatter::format_stats(&GraphStats::from_document(&doc)));
    0
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    process::exit(2);
}
