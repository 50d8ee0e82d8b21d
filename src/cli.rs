//! Driver (C11): argument parsing, wiring the components together,
//! selecting the reporter, setting the process exit code.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::aggregate::aggregate;
use crate::config;
use crate::git::GitScope;
use crate::logger;
use crate::model::{CheckContext, E2eMode, ReportFormat, RunOptions, Scope};
use crate::paths;
use crate::report;
use crate::scheduler::run_pipeline;
use crate::workspace;

#[derive(Parser)]
#[command(name = "hex-validate", version, about = "Runs architecture checks against a repository")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true)]
    scope: Option<ScopeArg>,
    #[arg(long, global = true, default_value = "off")]
    e2e: E2eArg,
    #[arg(long, global = true, default_value = "summary")]
    report: ReportArg,
    #[arg(long = "max-workers", global = true)]
    max_workers: Option<usize>,
    /// Print only the summary counts.
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Repeatable; raises log verbosity and includes per-check durations.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true)]
    silent: bool,
    /// Treat a `warn` finding as a stage failure, regardless of each
    /// stage's configured `failOnWarn` policy.
    #[arg(long = "fail-on-warn", global = true)]
    fail_on_warn: bool,
    /// Restrict the run to these files/directories (comma separated).
    #[arg(long, global = true, value_delimiter = ',')]
    paths: Option<Vec<PathBuf>>,
    /// Run as if invoked from this directory.
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,
    /// Enable tracing spans and diagnostics.
    #[arg(long, global = true)]
    trace: bool,
    /// Emit traces as JSON Lines on stdout (requires --trace).
    #[arg(long, global = true, requires = "trace")]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline against staged files.
    Fast,
    /// Run the pipeline against the full tree.
    Full,
    /// Run the pipeline in CI mode against the full tree.
    Ci,
    /// Scaffolding for a new configuration. Out of scope for the core engine.
    Init,
    /// Operate on the on-disk file hash cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Deletes the per-tool cache documents under `<repo>/.cache`.
    Clear,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ScopeArg {
    Staged,
    Changed,
    Full,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Staged => Scope::Staged,
            ScopeArg::Changed => Scope::Changed,
            ScopeArg::Full => Scope::Full,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum E2eArg {
    Auto,
    Always,
    Off,
}

impl From<E2eArg> for E2eMode {
    fn from(value: E2eArg) -> Self {
        match value {
            E2eArg::Auto => E2eMode::Auto,
            E2eArg::Always => E2eMode::Always,
            E2eArg::Off => E2eMode::Off,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ReportArg {
    Summary,
    Json,
    Junit,
}

impl From<ReportArg> for ReportFormat {
    fn from(value: ReportArg) -> Self {
        match value {
            ReportArg::Summary => ReportFormat::Summary,
            ReportArg::Json => ReportFormat::Json,
            ReportArg::Junit => ReportFormat::Junit,
        }
    }
}

/// Parses arguments, wires the engine together, and returns the process
/// exit code. Tracing is initialized before anything else, matching the
/// teacher's "trace first" discipline.
pub async fn run() -> i32 {
    let args = Cli::parse();

    let trace_enabled = args.trace || std::env::var("HEX_TRACE").is_ok();
    let json_output = args.json || std::env::var("HEX_JSON").is_ok();
    let level = logger::level_for_verbosity(args.verbose, args.quiet, args.silent);
    logger::init_tracing(level, trace_enabled && json_output);

    match &args.command {
        Command::Init => {
            eprintln!("`init` is out of scope for the core engine");
            1
        }
        Command::Cache { action: CacheAction::Clear } => run_cache_clear(args.cwd.as_deref()),
        Command::Fast | Command::Full | Command::Ci => run_pipeline_command(&args).await,
    }
}

/// Resolves the file list for `Scope::Full`: git-tracked files when `root`
/// is inside a repository with something tracked, otherwise a plain
/// directory walk (so a fresh or non-git tree still gets scanned).
fn resolve_full_tree(root: &Path, git: &GitScope) -> Vec<String> {
    let tracked = git.all_tracked_files();
    if !tracked.is_empty() {
        return tracked;
    }
    paths::resolve_paths(root, std::slice::from_ref(&PathBuf::from(".")))
        .into_iter()
        .filter_map(|p| p.strip_prefix(root).ok().map(|p| p.to_string_lossy().into_owned()))
        .collect()
}

fn run_cache_clear(cwd: Option<&Path>) -> i32 {
    let start = cwd.map(Path::to_path_buf).unwrap_or_else(|| std::env::current_dir().unwrap());
    let root = workspace::find_workspace_root(&start);
    let dir = workspace::cache_dir(&root);
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => {
            println!("cleared {}", dir.display());
            0
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
        Err(err) => {
            eprintln!("failed to clear cache: {err}");
            1
        }
    }
}

async fn run_pipeline_command(args: &Cli) -> i32 {
    let ci = matches!(args.command, Command::Ci) || *crate::env::CI_ENV;
    let default_scope = match args.command {
        Command::Fast => Scope::Staged,
        _ => Scope::Full,
    };

    let options = RunOptions {
        scope: args.scope.map(Scope::from).unwrap_or(default_scope),
        ci,
        max_workers: args.max_workers.unwrap_or_else(crate::model::default_max_workers),
        report: args.report.into(),
        quiet: args.quiet,
        verbose: args.verbose > 0,
        paths: args.paths.clone(),
        cwd: args.cwd.clone(),
        e2e: args.e2e.into(),
        fail_on_warn: args.fail_on_warn,
    };

    let start_dir = options.cwd.clone().unwrap_or_else(|| std::env::current_dir().unwrap());
    let root = workspace::find_workspace_root(&start_dir);
    let git = GitScope::open(&root);

    let target_files = options.paths.as_ref().map(|paths| {
        paths::resolve_paths(&root, paths)
            .into_iter()
            .filter_map(|p| p.strip_prefix(&root).ok().map(|p| p.to_string_lossy().into_owned()))
            .collect()
    });
    let all_files = if matches!(options.scope, Scope::Full) {
        resolve_full_tree(&root, &git)
    } else {
        Vec::new()
    };

    let mut pipeline = config::default_pipeline();
    if options.fail_on_warn {
        for stage in &mut pipeline.stages {
            stage.fail_on_warn = true;
        }
    }
    let context = Arc::new(CheckContext {
        cwd: root.clone(),
        ci: options.ci,
        scope: options.scope,
        staged_files: git.staged_files(),
        changed_files: git.changed_files(),
        all_files,
        target_files,
        environment: std::env::vars().collect(),
        config: pipeline.clone(),
    });

    let registry = config::builtin_registry();
    let outcome = run_pipeline(&pipeline, context, &registry, options.max_workers).await;

    let aggregated = aggregate(&outcome.results);
    let rendered = report::render(options.report, &aggregated, options.verbose, options.quiet);
    match options.report {
        ReportFormat::Summary => print!("{rendered}"),
        ReportFormat::Json | ReportFormat::Junit => println!("{rendered}"),
    }

    if outcome.ok { 0 } else { 1 }
}
