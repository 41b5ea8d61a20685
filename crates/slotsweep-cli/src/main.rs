//! Missing-script scanner CLI.
//!
//! Provides the `slotsweep` binary, which drives the cleanup orchestrator
//! against a SQLite asset database or a scene file.
//!
//! Settings fall back to environment variables:
//! - `SLOTSWEEP_DB_PATH`: asset database path (default: "slotsweep.db")
//! - `SLOTSWEEP_ASSET_KIND`: kind of asset to process (default: "Prefab")
//! - `SLOTSWEEP_OPEN_ASSET`: path of the asset open in an editing session

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slotsweep_clean::{
    AssetCleanupOrchestrator, CleanOptions, FixedEditingSession, InMemoryScene, ProgressSink,
    Scope, TracingLog,
};
use slotsweep_core::Forest;
use slotsweep_storage::{AssetStore, InMemoryStore, SqliteStore};

/// Find and remove missing script references.
#[derive(Parser)]
#[command(name = "slotsweep", about = "Find and remove missing script references")]
struct Cli {
    /// Path to the asset database file.
    #[arg(long, env = "SLOTSWEEP_DB_PATH", default_value = "slotsweep.db", global = true)]
    db: String,

    /// Asset kind to process.
    #[arg(long, env = "SLOTSWEEP_ASSET_KIND", default_value = "Prefab", global = true)]
    kind: String,

    /// Asset currently open for editing; it is never modified.
    #[arg(long, env = "SLOTSWEEP_OPEN_ASSET", global = true)]
    open_asset: Option<String>,

    /// Print progress to stderr.
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Store a forest JSON file as a new asset.
    Import {
        /// Asset path to register, e.g. Assets/Enemy.prefab.
        #[arg(short, long)]
        path: String,

        /// Forest JSON file.
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List stored assets.
    List,
    /// Report missing scripts without changing anything.
    Scan {
        /// Scan this scene file instead of the asset database.
        #[arg(long)]
        scene: Option<PathBuf>,
    },
    /// Remove missing scripts and save the result.
    Clean {
        /// Clean this scene file in place instead of the asset database.
        #[arg(long)]
        scene: Option<PathBuf>,
    },
}

/// Writes `[ 42%] message` lines to stderr.
struct StderrProgress {
    enabled: bool,
}

impl ProgressSink for StderrProgress {
    fn report(&mut self, message: &str, fraction: f32) -> bool {
        if self.enabled {
            eprintln!("[{:>3.0}%] {}", fraction * 100.0, message);
        }
        true
    }

    fn clear(&mut self) {}
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = run(cli);
    process::exit(exit_code);
}

/// Returns exit code: 0 = success, 1 = operation failed, 3 = I/O error.
fn run(cli: Cli) -> i32 {
    let scene = match &cli.command {
        Commands::Scan { scene } | Commands::Clean { scene } => scene.clone(),
        _ => None,
    };
    if let Some(scene_path) = scene {
        return run_scene(&cli, &scene_path);
    }

    let store = match SqliteStore::new(&cli.db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to open database '{}': {}", cli.db, e);
            return 3;
        }
    };

    match &cli.command {
        Commands::Import { path, file } => run_import(store, path, &cli.kind, file),
        Commands::List => run_list(&store),
        Commands::Scan { .. } => {
            let mut orchestrator = build_orchestrator(store, &cli);
            match orchestrator.scan_and_report(Scope::AllStoredAssets) {
                Ok(report) => print_json(&report),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
        Commands::Clean { .. } => {
            let mut orchestrator = build_orchestrator(store, &cli);
            match orchestrator.scan_and_clean(Scope::AllStoredAssets) {
                Ok(summary) => print_json(&summary),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
    }
}

fn build_orchestrator<S: AssetStore>(
    store: S,
    cli: &Cli,
) -> AssetCleanupOrchestrator<S, FixedEditingSession, TracingLog, StderrProgress> {
    let session = FixedEditingSession {
        open_path: cli.open_asset.clone(),
    };
    let options = CleanOptions {
        asset_kind: cli.kind.clone(),
        ..CleanOptions::default()
    };
    AssetCleanupOrchestrator::new(store, session)
        .with_progress(StderrProgress {
            enabled: cli.progress,
        })
        .with_options(options)
}

fn run_scene(cli: &Cli, scene_path: &Path) -> i32 {
    let forest = match read_forest(scene_path) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };
    let mut scene = InMemoryScene::new(forest);

    // Scene runs never touch the asset database.
    let store = InMemoryStore::new();
    let mut orchestrator = build_orchestrator(store, cli);

    match &cli.command {
        Commands::Clean { .. } => {
            let summary = match orchestrator.scan_and_clean(Scope::CurrentScene(&mut scene)) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return 1;
                }
            };
            if scene.is_dirty() {
                if let Err(msg) = write_forest(scene_path, &scene.into_forest()) {
                    eprintln!("Error: {}", msg);
                    return 3;
                }
            }
            print_json(&summary)
        }
        _ => match orchestrator.scan_and_report(Scope::CurrentScene(&mut scene)) {
            Ok(report) => print_json(&report),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    }
}

fn run_import(mut store: SqliteStore, path: &str, kind: &str, file: &Path) -> i32 {
    let forest = match read_forest(file) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };
    match store.create_asset(path, kind, &forest) {
        Ok(id) => {
            tracing::info!("imported {} as {}", path, id);
            println!("{}", id.0);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to import '{}': {}", path, e);
            1
        }
    }
}

fn run_list(store: &SqliteStore) -> i32 {
    match store.list_assets() {
        Ok(records) => print_json(&records),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn read_forest(path: &Path) -> Result<Forest, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("invalid forest in '{}': {}", path.display(), e))
}

fn write_forest(path: &Path, forest: &Forest) -> Result<(), String> {
    let json = serde_json::to_string_pretty(forest)
        .map_err(|e| format!("failed to serialize forest: {}", e))?;
    fs::write(path, json).map_err(|e| format!("failed to write '{}': {}", path.display(), e))
}

/// Prints a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize result: {}", e);
            1
        }
    }
}
