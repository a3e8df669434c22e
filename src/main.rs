#![warn(clippy::all, clippy::pedantic)]
//! `bce`: explore bandaged cube puzzles from the command line.

use anyhow::{Context, Result};
use bandaged_cube_explorer::analysis::{analyze, depth_distribution};
use bandaged_cube_explorer::layers::{
    layer_distances, path_to_next_layer, worst_case, LayerDistances, LayerTable, Summary,
};
use bandaged_cube_explorer::path::shortest_path_between;
use bandaged_cube_explorer::turn::apply_moves;
use bandaged_cube_explorer::{Cube, PuzzleConfig};
use clap::{Parser, Subcommand};
use env_logger::TimestampPrecision;
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore every shape reachable from the puzzle and print the graph's size.
    Explore {
        /// The puzzle file, in TOML format.
        puzzle: PathBuf,
        /// Also compute the diameter, antipodes and center. Searches from every shape.
        #[arg(long)]
        diameter: bool,
    },
    /// Print a shortest move sequence between two shapes of the puzzle.
    Solve {
        /// The puzzle file, in TOML format.
        puzzle: PathBuf,
        /// The starting shape, 27 block ids. Defaults to the puzzle's shape.
        #[arg(long)]
        from: Option<Cube>,
        /// The target shape. Defaults to the puzzle's solved shape.
        #[arg(long)]
        to: Option<Cube>,
    },
    /// Apply a move sequence to the puzzle's shape.
    Apply {
        /// The puzzle file, in TOML format.
        puzzle: PathBuf,
        /// The move sequence to execute, e.g. "R U' F2".
        moves: String,
    },
    /// Measure every step of the puzzle's stabilizer chain.
    Layers {
        /// The puzzle file, in TOML format.
        puzzle: PathBuf,
        /// Print how many shapes lie at each distance instead of only the worst case.
        #[arg(long)]
        tally: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    match cli.command {
        Commands::Explore { puzzle, diameter } => run_explore(&load(&puzzle)?, diameter),
        Commands::Solve { puzzle, from, to } => run_solve(&load(&puzzle)?, from, to),
        Commands::Apply { puzzle, moves } => run_apply(&load(&puzzle)?, &moves),
        Commands::Layers { puzzle, tally } => run_layers(&load(&puzzle)?, tally),
    }
}

fn load(path: &Path) -> Result<PuzzleConfig> {
    let puzzle = PuzzleConfig::load(path)
        .with_context(|| format!("Failed to load puzzle {}", path.display()))?;
    info!("loaded puzzle {:?}", puzzle.name);
    Ok(puzzle)
}

fn run_explore(puzzle: &PuzzleConfig, diameter: bool) -> Result<()> {
    let graph = puzzle.explore();
    println!(
        "{}: {} shapes, {} turns",
        puzzle.name,
        graph.len(),
        graph.edges().len()
    );
    for (depth, count) in depth_distribution(&graph, 0).iter().enumerate() {
        println!("{depth:>4} {count}");
    }
    if diameter {
        let stats = analyze(&graph).context("The graph has no shapes")?;
        println!(
            "diameter {} from shape {} to shape {}",
            stats.max_dist, stats.max_start, stats.max_end
        );
        println!("radius {} around shape {}", stats.radius, stats.center);
        if let Some(antipode) = graph.state(stats.max_start) {
            println!("{antipode}");
        }
    }
    Ok(())
}

fn run_solve(puzzle: &PuzzleConfig, from: Option<Cube>, to: Option<Cube>) -> Result<()> {
    let graph = puzzle.explore();
    let from = from.unwrap_or(puzzle.shape);
    let to = to.unwrap_or_else(|| puzzle.solved());
    let moves = shortest_path_between(&graph, &from, &to).context("Failed to find a path")?;
    println!("{moves}");
    Ok(())
}

fn run_apply(puzzle: &PuzzleConfig, moves: &str) -> Result<()> {
    let cube = apply_moves(&puzzle.shape, moves)
        .with_context(|| format!("Failed to apply {moves:?} to {}", puzzle.name))?;
    println!("{cube}");
    Ok(())
}

fn run_layers(puzzle: &PuzzleConfig, tally: bool) -> Result<()> {
    let graph = puzzle.explore();
    let layers = puzzle.chain().layers(&graph);
    let table = LayerTable::new(&graph, &layers);
    let summary = if tally { Summary::Tally } else { Summary::Max };
    let steps = layer_distances(&layers, &table, summary).context("Failed to measure the chain")?;

    for (n, step) in steps.iter().enumerate() {
        let (current, next) = (&layers[n], &layers[n + 1]);
        println!(
            "{} ({} shapes) -> {} ({} shapes)",
            current.name(),
            current.len(),
            next.name(),
            next.len()
        );
        match step {
            LayerDistances::Max(None) => println!("  nothing to do"),
            LayerDistances::Max(Some(d)) => println!("  at most {d} turns"),
            LayerDistances::Tally(tally) => {
                for (d, count) in tally {
                    println!("  {d:>3} turns: {count}");
                }
            }
        }
        if let Some((v, d)) = worst_case(&layers, &table, n)? {
            let moves = path_to_next_layer(&graph, v, &layers, &table)?;
            println!("  worst case shape {v} ({d} turns): {moves}");
        }
    }
    Ok(())
}
