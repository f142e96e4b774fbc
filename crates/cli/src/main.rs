use anyhow::{Context, Result};
use archmap_protocol::{ScanData, SystemsReport, CONFIG_FILE_NAME};
use archmap_scanner::{FileScanner, PathFilter};
use archmap_systems::{
    load_scan_data, read_scan_data, resolve_config_path, Annotator, ClusterPolicy,
    SystemIdentifier,
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use prompt::ConsoleAnnotator;
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

mod prompt;
mod report;

const STDIN_MARKER: &str = "-";

#[derive(Parser)]
#[command(name = "archmap")]
#[command(about = "Identify the logical systems of a codebase and document them", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a project and emit per-file scan data as JSON
    Scan(ScanArgs),

    /// Group scan data into systems and infer their dependencies
    Identify(IdentifyArgs),

    /// Render markdown docs and mermaid diagrams from identified systems
    Docs(DocsArgs),

    /// Scan, identify and render docs in one run
    Map(MapArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// Only record files under this path prefix (repeatable)
    #[arg(long = "include", value_name = "PATH")]
    include: Vec<String>,

    /// Skip files under this path prefix (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    exclude: Vec<String>,

    /// Glob or substring the relative path must match
    #[arg(long)]
    pattern: Option<String>,
}

#[derive(Args)]
struct EngineArgs {
    /// Prompt for descriptions, consumers and business rules
    #[arg(short, long)]
    interactive: bool,

    /// Config file, relative paths resolve against the scanned root
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Neither read nor write the config file
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// Minimum number of files for a standalone system
    #[arg(long, default_value_t = ClusterPolicy::default().min_system_files)]
    min_files: usize,

    /// Maximum number of systems besides `other`
    #[arg(long, default_value_t = ClusterPolicy::default().max_systems)]
    max_systems: usize,
}

#[derive(Args)]
struct ScanArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Args)]
struct IdentifyArgs {
    /// Scan data JSON file, or `-` for stdin
    input: String,

    /// Write JSON here instead of stdout
    output: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args)]
struct DocsArgs {
    /// Systems JSON file, or `-` for stdin
    input: String,

    /// Output directory
    #[arg(long, default_value = "docs/architecture")]
    out_dir: PathBuf,
}

#[derive(Args)]
struct MapArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output directory for systems.json and the rendered docs
    #[arg(long, default_value = "docs/architecture")]
    out_dir: PathBuf,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    engine: EngineArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Identify(args) => run_identify(args),
        Commands::Docs(args) => run_docs(args),
        Commands::Map(args) => run_map(args),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let scan = scan_project(&args.path, &args.filters, &[])?;
    emit_json(&scan, args.output.as_deref())
}

fn run_identify(args: IdentifyArgs) -> Result<()> {
    if args.engine.interactive && args.input == STDIN_MARKER {
        anyhow::bail!("Interactive mode needs a scan file; stdin already carries the scan data");
    }

    let scan = if args.input == STDIN_MARKER {
        read_scan_data(io::stdin().lock()).context("Failed to read scan data from stdin")?
    } else {
        load_scan_data(Path::new(&args.input))
            .with_context(|| format!("Failed to load scan data from {}", args.input))?
    };

    let report = identify(&scan, &args.engine)?;
    emit_json(&report, args.output.as_deref())
}

fn run_docs(args: DocsArgs) -> Result<()> {
    let raw = if args.input == STDIN_MARKER {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read systems JSON from stdin")?;
        buffer
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read systems JSON from {}", args.input))?
    };
    let report: SystemsReport =
        serde_json::from_str(&raw).context("Systems JSON is not a valid identification report")?;

    render_docs(&report, &args.out_dir)
}

fn run_map(args: MapArgs) -> Result<()> {
    // Docs and config from an earlier run must not feed back into the scan.
    let root = args.path.canonicalize().context("Invalid project path")?;
    let out_dir = env::current_dir()
        .context("Failed to resolve the current directory")?
        .join(&args.out_dir);
    let mut generated = vec![out_dir];
    generated.extend(config_path(&root.to_string_lossy(), &args.engine));

    let scan = scan_project(&root, &args.filters, &generated)?;
    let report = identify(&scan, &args.engine)?;

    emit_json(&report, Some(&args.out_dir.join("systems.json")))?;

    render_docs(&report, &args.out_dir)
}

fn scan_project(path: &Path, filters: &FilterArgs, generated: &[PathBuf]) -> Result<ScanData> {
    let path = path.canonicalize().context("Invalid project path")?;
    let mut filter = PathFilter::new()
        .include(&filters.include)
        .exclude(&filters.exclude);
    if let Some(pattern) = &filters.pattern {
        filter = filter.pattern(pattern)?;
    }

    FileScanner::new(&path)
        .with_filter(filter)
        .exclude_paths(generated)
        .scan()
        .with_context(|| format!("Failed to scan {}", path.display()))
}

fn identify(scan: &ScanData, engine: &EngineArgs) -> Result<SystemsReport> {
    let policy = ClusterPolicy::new(engine.min_files, engine.max_systems);
    let identifier = SystemIdentifier::new(policy)?;

    let config_file = config_path(&scan.root, engine);
    let mut console = ConsoleAnnotator::new();
    let annotator: Option<&mut dyn Annotator> = if engine.interactive {
        Some(&mut console)
    } else {
        None
    };

    let report = identifier
        .identify(scan, config_file.as_deref(), annotator)
        .context("System identification failed")?;

    for (key, system) in report.systems_by_size() {
        log::info!(
            "{key}: {} files, {} lines, depends on [{}]",
            system.file_count,
            system.total_lines,
            system.depends_on.join(", ")
        );
    }
    Ok(report)
}

fn config_path(root: &str, engine: &EngineArgs) -> Option<PathBuf> {
    if engine.no_config {
        return None;
    }
    let config = engine
        .config
        .as_deref()
        .unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));
    Some(resolve_config_path(root, config))
}

fn render_docs(report: &SystemsReport, out_dir: &Path) -> Result<()> {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
    let written = report::write_docs(report, out_dir, &generated_at)?;
    log::info!(
        "Wrote {} documents, open {}",
        written.len(),
        out_dir.join("OVERVIEW.md").display()
    );
    Ok(())
}

fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Results saved to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
