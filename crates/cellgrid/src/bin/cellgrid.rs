//! Command-line runner: compose a grid, run it, write the history.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use log::info;

use cellgrid::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "cellgrid", version)]
#[command(about = "Simulate a lattice of reaction-network cells", long_about = None)]
struct Cli {
    /// Lattice rows
    #[arg(long, default_value_t = 9)]
    rows: u32,

    /// Lattice columns
    #[arg(long, default_value_t = 9)]
    cols: u32,

    /// Boundary species (repeatable)
    #[arg(long = "boundary", value_name = "SPECIES", default_values = ["Xex"])]
    boundary: Vec<String>,

    /// Simulated time to run for
    #[arg(long, default_value_t = 10.0)]
    total_time: f64,

    /// Increment per step
    #[arg(long, default_value_t = 1.0)]
    time_step: f64,

    /// Master seed for noise and boundary randomisation
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Start boundary species at the network's values instead of random draws
    #[arg(long, action = ArgAction::SetTrue)]
    no_randomize: bool,

    /// Parameter noise half-width (repeatable)
    #[arg(long, value_name = "NAME=WIDTH", value_parser = parse_noise)]
    noise: Vec<(String, f64)>,

    /// Also feed internal store values back into the network each step
    #[arg(long, action = ArgAction::SetTrue)]
    apply_internal: bool,

    /// Reaction network preset
    #[arg(long, default_value = "glycolysis")]
    model: String,

    /// Worker threads for the compute phase (0 = one per CPU)
    #[arg(long)]
    threads: Option<usize>,

    /// Write the JSON history here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write one CSV heatmap per (slice, species, port) into this directory
    #[arg(long, value_name = "DIR")]
    heatmap_dir: Option<PathBuf>,

    /// Time slice to extract heatmaps at (repeatable; default: final time)
    #[arg(long = "slice", value_name = "TIME")]
    slices: Vec<f64>,

    /// Species to extract heatmaps for (repeatable)
    #[arg(long = "species", value_name = "ID", default_values = ["X", "Y", "Yex", "Xex"])]
    species: Vec<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn grid_config(&self) -> GridConfig {
        let mut noise = NoiseSpec::new();
        for (name, width) in &self.noise {
            noise.insert(name.clone(), *width);
        }
        GridConfig {
            rows: self.rows,
            cols: self.cols,
            cell: CellConfig {
                boundary_species: self.boundary.clone(),
                parameter_noise: noise,
                time_step: self.time_step,
                apply_internal: self.apply_internal,
            },
            randomize_boundary: !self.no_randomize,
            seed: self.seed,
            ..GridConfig::default()
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let parallelism = match self.threads {
            None => Parallelism::Sequential,
            Some(n) => NonZeroUsize::new(n).map_or_else(Parallelism::available, Parallelism::Threads),
        };
        EngineConfig { parallelism }
    }
}

fn parse_noise(s: &str) -> Result<(String, f64), String> {
    let (name, width) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=WIDTH, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    let width: f64 = width
        .parse()
        .map_err(|e| format!("invalid width in '{s}': {e}"))?;
    Ok((name.to_string(), width))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let template = cellgrid::network::preset(&cli.model)?;
    let composite = GridComposer::build(&cli.grid_config(), &template)?;
    let mut engine = SimulationEngine::new(composite, cli.engine_config())?;

    let started = Instant::now();
    // Keep the outcome; whatever was committed is written out either way.
    let outcome = engine.run_for(cli.total_time).map(|_| ());
    info!(
        "{} increments in {:.1?} ({:?})",
        engine.current_step().0,
        started.elapsed(),
        engine.state()
    );

    match &cli.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, engine.history())?;
            writer.flush()?;
            info!("history written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer(&mut stdout, engine.history())?;
            writeln!(stdout)?;
        }
    }

    if let Some(dir) = &cli.heatmap_dir {
        fs::create_dir_all(dir)?;
        let slices = if cli.slices.is_empty() {
            vec![engine.elapsed()]
        } else {
            cli.slices.clone()
        };
        let species: Vec<&str> = cli.species.iter().map(String::as_str).collect();
        let maps = extract_heatmaps(engine.history(), &slices, &species);
        for map in &maps {
            fs::write(dir.join(map.file_name("grid")), map.to_csv())?;
        }
        info!("{} heatmaps written to {}", maps.len(), dir.display());
    }

    outcome?;
    Ok(())
}
