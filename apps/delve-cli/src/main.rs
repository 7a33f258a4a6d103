use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use delve_common::EntityKind;
use delve_gen::{DungeonConfig, DungeonGenerator, PrefabSet};
use delve_kernel::Scene;
use delve_tools::DungeonInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delve", about = "CLI tool for procedural dungeon generation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a dungeon and print its summary
    Generate {
        #[command(flatten)]
        params: Params,
        /// Print the full layout as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Write the layout JSON to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate several dungeons and check each one's structure
    Validate {
        #[command(flatten)]
        params: Params,
        /// Number of consecutive seeds to check
        #[arg(short, long, default_value = "100")]
        runs: u64,
    },
}

/// Config file plus per-field overrides.
#[derive(Args)]
struct Params {
    /// YAML or JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// RNG seed for deterministic generation
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    grid_size: Option<u32>,
    #[arg(long)]
    cell_size: Option<f32>,
    #[arg(long)]
    min_rooms: Option<u32>,
    #[arg(long)]
    max_rooms: Option<u32>,
    /// Skip invisible room barriers
    #[arg(long)]
    no_barriers: bool,
}

impl Params {
    fn resolve(&self) -> anyhow::Result<DungeonConfig> {
        let mut config = match &self.config {
            Some(path) => DungeonConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DungeonConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(size) = self.grid_size {
            config.grid_size = size;
        }
        if let Some(cell) = self.cell_size {
            config.cell_size = cell;
        }
        if let Some(min) = self.min_rooms {
            config.min_rooms = min;
        }
        if let Some(max) = self.max_rooms {
            config.max_rooms = max;
        }
        if self.no_barriers {
            config.enable_room_barriers = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("delve v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: entities={}", Scene::new().entity_count());
            println!("grid: {}", delve_grid::crate_info());
            println!("gen: {}", delve_gen::crate_info());
            println!("tools: {}", delve_tools::crate_info());
            let kinds: Vec<String> = EntityKind::ALL.iter().map(|k| k.to_string()).collect();
            println!("entity kinds: {}", kinds.join(", "));
        }
        Commands::Generate {
            params,
            json,
            output,
        } => {
            let config = params.resolve()?;
            let mut generator = DungeonGenerator::new(config, PrefabSet::placeholders());
            let report = generator.generate()?;
            let layout = generator
                .layout()
                .context("generator finished without a layout")?;

            if let Some(path) = &output {
                std::fs::write(path, layout.to_json()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(path = %path.display(), "layout written");
            }

            if json {
                println!("{}", layout.to_json()?);
            } else {
                println!(
                    "Generated: seed={} rooms={}/{} tree={} loops={} vertical={}",
                    report.seed,
                    report.placed_rooms,
                    report.requested_rooms,
                    report.tree_edges,
                    report.loop_edges,
                    report.vertical_links
                );
                println!("{}", DungeonInspector::summary(generator.dungeon()));
                for room in DungeonInspector::list_rooms(generator.dungeon()) {
                    println!("  {room}");
                }
                let spawn = generator.first_room_position();
                println!("Spawn point: ({:.2}, {:.2}, {:.2})", spawn.x, spawn.y, spawn.z);
            }
        }
        Commands::Validate { params, runs } => {
            let config = params.resolve()?;
            let base = config.seed.unwrap_or(0);
            let mut generator = DungeonGenerator::new(config, PrefabSet::placeholders());

            let mut failures = 0u64;
            for seed in base..base.saturating_add(runs) {
                generator.generate_with_seed(seed)?;
                let report = DungeonInspector::validate(generator.dungeon());
                if !report.is_ok() {
                    failures += 1;
                    println!("seed {seed}: {report}");
                }
            }
            println!(
                "Validated {runs} runs from seed {base}: {}",
                if failures == 0 { "OK" } else { "FAILED" }
            );
            if failures > 0 {
                anyhow::bail!("{failures} of {runs} runs failed validation");
            }
        }
    }

    Ok(())
}
