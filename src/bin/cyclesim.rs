//! Cyclesim CLI binary.
//!
//! # Commands
//!
//! - `sweep` - Run the configured parameter sweep and write a report
//! - `run` - Simulate a single topology for one ttl
//! - `group` - Generate and print group parameters

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cyclesim::{
    config::GraphModel, Config, GeneratedTopology, GroupParams, NodeStatePolicy, OutputFormat,
    ReportWriter, RunRecord, SimulationConfig, Simulator, Sweep, Topology, VERSION,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "cyclesim")]
#[command(version = VERSION)]
#[command(about = "Cycle-collision simulator for onion-relayed key exchange", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a parameter sweep and write one record per configuration
    Sweep {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RNG seed (overrides config and CYCLESIM_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Report directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write JSON lines instead of CSV
        #[arg(long)]
        json: bool,

        /// Start every ttl from empty node state
        #[arg(long)]
        reset_nodes: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Simulate one topology at one ttl
    Run {
        /// Graph size
        #[arg(short, long, default_value = "50")]
        nodes: usize,

        /// Degree parameter
        #[arg(short, long, default_value = "3")]
        degree: usize,

        /// ttl (search depth)
        #[arg(short, long, default_value = "3")]
        ttl: u32,

        /// Graph model
        #[arg(short, long, value_enum, default_value = "scale-free")]
        model: ModelArg,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Read the topology from a `u,v` edge list instead
        #[arg(long)]
        edge_list: Option<PathBuf>,

        /// Largest vertex id kept from the edge list
        #[arg(long, default_value_t = usize::MAX)]
        max_node: usize,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate group parameters
    Group {
        /// Bits of the subgroup order q
        #[arg(long, default_value = "20")]
        q_bits: u32,

        /// Cofactor bound, r <= 2^r_bits
        #[arg(long, default_value = "8")]
        r_bits: u32,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    ScaleFree,
    Uniform,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep {
            config,
            seed,
            output,
            json,
            reset_nodes,
            verbose,
        } => cmd_sweep(config, seed, output, json, reset_nodes, verbose),

        Commands::Run {
            nodes,
            degree,
            ttl,
            model,
            seed,
            edge_list,
            max_node,
            json,
            verbose,
        } => cmd_run(nodes, degree, ttl, model, seed, edge_list, max_node, json, verbose),

        Commands::Group {
            q_bits,
            r_bits,
            seed,
            json,
        } => cmd_group(q_bits, r_bits, seed, json),
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn cmd_sweep(
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    json: bool,
    reset_nodes: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);

    let mut config = match config_path {
        Some(path) => Config::from_file(path)?.with_env_overrides(),
        None => Config::from_env(),
    };
    if seed.is_some() {
        config.simulation.seed = seed;
    }
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    if json {
        config.output.format = OutputFormat::Json;
    }
    if reset_nodes {
        config.simulation.node_state = NodeStatePolicy::ResetPerRun;
    }
    config.validate()?;

    let mut rng = rng_from(config.simulation.seed);
    let params = GroupParams::generate(config.group.q_bits, config.group.r_bits, &mut rng)?;
    tracing::info!(%params, records = config.sweep.record_count(), "starting sweep");

    let mut writer = ReportWriter::create(&config.output, &params)?;
    let sweep = Sweep::new(config, params)?;
    sweep.run(&mut rng, |record| writer.write(record))?;

    let rows = writer.rows();
    let path = writer.finish()?;
    println!("Wrote {rows} records to {}", path.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    nodes: usize,
    degree: usize,
    ttl: u32,
    model: ModelArg,
    seed: Option<u64>,
    edge_list: Option<PathBuf>,
    max_node: usize,
    json: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);

    let config = Config::from_env();
    let mut rng = rng_from(seed.or(config.simulation.seed));
    let params = GroupParams::generate(config.group.q_bits, config.group.r_bits, &mut rng)?;

    let graph = match (edge_list, model_of(model)) {
        (Some(path), _) => {
            GeneratedTopology::from_topology(Topology::read_edge_list_file(path, degree, max_node)?)
        },
        (None, GraphModel::ScaleFree) => Topology::scale_free(degree, degree, nodes, &mut rng)?,
        (None, GraphModel::Uniform) => Topology::uniform(nodes, degree, degree, &mut rng)?,
    };

    let simulation = SimulationConfig {
        seed,
        ..config.simulation
    };
    let sim_rng = StdRng::from_rng(&mut rng)?;
    let mut simulator = Simulator::new(&graph.topology, params, simulation, sim_rng);
    let summary = simulator.run(ttl)?;
    let record = RunRecord::new(&graph, &summary);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{params}");
        println!(
            "n={} m={} d_avg={:.2} l={}",
            record.n, record.edge_param, record.avg_degree, record.ttl
        );
        println!(
            "cycles={} cycle_edges={} messages={} (forward={}, backward={}, publish={}, broadcast={}) in {}ms",
            record.distinct_cycles,
            record.cycle_edge_count,
            record.total_messages,
            record.forward_count,
            record.backward_count,
            record.publish_count,
            record.broadcast_count,
            record.elapsed_millis
        );
        for key in summary.cycles.keys() {
            println!("  {{ {key} }}");
        }
    }
    Ok(())
}

fn cmd_group(q_bits: u32, r_bits: u32, seed: Option<u64>, json: bool) -> anyhow::Result<()> {
    let mut rng = rng_from(seed);
    let params = GroupParams::generate(q_bits, r_bits, &mut rng)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&params)?);
    } else {
        println!("{params}");
    }
    Ok(())
}

fn model_of(model: ModelArg) -> GraphModel {
    match model {
        ModelArg::ScaleFree => GraphModel::ScaleFree,
        ModelArg::Uniform => GraphModel::Uniform,
    }
}
