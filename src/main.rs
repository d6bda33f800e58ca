use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lro_lint::analyzer::{GoPackageLoader, NamedType, PackageSource, ProgramModel};
use lro_lint::config::LoadFailurePolicy;
use lro_lint::lint::{CallShapes, Finding, InventoryCache, Scanner};
use lro_lint::{Config, GoWorkspace};

#[derive(Parser)]
#[command(name = "lro-lint")]
#[command(about = "Finds Azure SDK long-running operations whose poller is discarded or bypassed")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Scan Go packages for discarded long-running operations")]
    Scan {
        /// Package patterns such as `./...` or `./internal/services/network`
        patterns: Vec<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, help = "Directory inside the Go module to analyze")]
        root: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        #[arg(long)]
        output_json: Option<PathBuf>,
        #[arg(long, help = "Continue when an SDK package cannot be loaded for its method inventory")]
        skip_failed_loads: bool,
    },
    #[command(about = "Print the sync/async method inventory of one client type")]
    Inventory {
        /// Import path of the package declaring the type
        package_path: String,
        /// Receiver type name, e.g. `VirtualNetworksClient`
        type_name: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            patterns,
            config,
            root,
            format,
            output_json,
            skip_failed_loads,
        } => {
            let mut config = load_config(config, root)?;
            if skip_failed_loads {
                config.inventory.on_load_failure = LoadFailurePolicy::Skip;
            }
            scan(config, patterns, format, output_json)
        }
        Commands::Inventory {
            package_path,
            type_name,
            config,
            root,
        } => {
            let config = load_config(config, root)?;
            print_inventory(config, package_path, type_name)
        }
    }
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
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config: Option<PathBuf>, root: Option<PathBuf>) -> Result<Config> {
    let mut config = match config {
        Some(path) => Config::from_file(&path.to_string_lossy())?,
        None => Config::from_workspace_root(root.clone().unwrap_or_else(|| PathBuf::from(".")))?,
    };
    if let Some(root) = root {
        config.workspace.root = root;
    }
    Ok(config)
}

fn scan(config: Config, patterns: Vec<String>, format: OutputFormat, output_json: Option<PathBuf>) -> Result<()> {
    let workspace = GoWorkspace::discover(&config)?;
    let root = workspace.root().to_path_buf();
    let patterns = if patterns.is_empty() {
        config.workspace.patterns.clone()
    } else {
        patterns
    };
    let import_paths = workspace.expand_patterns(&patterns)?;
    eprintln!("🔍 Scanning {} packages in {}", import_paths.len(), workspace.module().path);

    let loader: Arc<dyn PackageSource> = Arc::new(GoPackageLoader::new(workspace));
    let model = Arc::new(ProgramModel::new(loader.clone()));

    let mut packages = Vec::new();
    let mut failures = 0;
    for import_path in import_paths.iter().filter(|path| !config.is_excluded(path)) {
        match model.load(import_path) {
            Ok(package) => packages.push(package),
            Err(e) => {
                eprintln!("❌ {}", e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{} package(s) failed to load", failures);
    }

    let scanner = Scanner::new(model, loader, &config).with_display_root(root);
    let findings = scanner.scan(&packages)?;

    match format {
        OutputFormat::Text => {
            for finding in &findings {
                println!("{}", finding);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
    }

    if let Some(output_path) = output_json {
        write_json(&findings, &output_path)?;
        eprintln!("💾 Results written to {:?}", output_path);
    }

    eprintln!(
        "📊 {} findings in {} packages ({} SDK packages inventoried)",
        findings.len(),
        packages.len(),
        scanner.inventory().load_count()
    );
    Ok(())
}

fn write_json(findings: &[Finding], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(findings)?;
    std::fs::write(output_path, json).with_context(|| format!("Failed to write {:?}", output_path))?;
    Ok(())
}

fn print_inventory(config: Config, package_path: String, type_name: String) -> Result<()> {
    let workspace = GoWorkspace::discover(&config)?;
    let loader: Arc<dyn PackageSource> = Arc::new(GoPackageLoader::new(workspace));
    let cache = InventoryCache::new(
        loader,
        CallShapes::from_config(&config.rules.pandora),
        LoadFailurePolicy::Fail,
    );

    let inventory = cache.get(&NamedType::new(package_path, type_name))?;
    println!("{}", serde_json::to_string_pretty(&*inventory)?);
    Ok(())
}
