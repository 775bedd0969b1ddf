//! Aries dragonfly 流量建模
//!
//! 读取配置文件、映射文件与通信 trace，估计每条链路与每个 PCI 的负载。

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use aries_flow::error::ModelError;
use aries_flow::flow::EngineConfig;
use aries_flow::input::ModelConf;
use aries_flow::model::{ModelInputs, SeedSource, run_model};
use aries_flow::report::{LoadSummary, write_link_loads, write_pci_loads};
use aries_flow::route::clock_seed;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "aries_model",
    about = "Estimate per-link and per-PCI load of a communication trace on a dragonfly network"
)]
struct Args {
    /// Configuration file (router count, dimensions, connection files, traces)
    conffile: PathBuf,

    /// Rank-to-coordinate map; a missing file selects the default mapping
    mapfile: PathBuf,

    /// Output file: one `<link> <load>` line per link slot
    outfile: PathBuf,

    /// Number of SPMD ranks (threads)
    #[arg(long, default_value_t = 1)]
    ranks: usize,

    /// Engine parameters as JSON (missing fields use defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Seed every rank from the wall clock instead of the prime table
    #[arg(long)]
    clock_seed: bool,

    /// Optional PCI load dump: `<router> <pci> <send> <recv>` per line
    #[arg(long)]
    pci_out: Option<PathBuf>,
}

fn load_params(path: Option<&PathBuf>) -> Result<EngineConfig, ModelError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
        path: path.clone(),
        source: e,
    })?;
    let cfg: EngineConfig = serde_json::from_str(&raw).map_err(|e| ModelError::Parse {
        path: path.clone(),
        line: e.line(),
        msg: e.to_string(),
    })?;
    cfg.validate()?;
    Ok(cfg)
}

fn create(path: &PathBuf) -> Result<BufWriter<File>, ModelError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ModelError::Io {
            path: path.clone(),
            source: e,
        })
}

fn run(args: &Args) -> Result<(), ModelError> {
    let cfg = load_params(args.params.as_ref())?;
    let conf = ModelConf::load(&args.conffile)?;
    // 先打开输出文件，避免建模完成后才发现路径不可写
    let mut out = create(&args.outfile)?;
    let mut pci_out = args.pci_out.as_ref().map(create).transpose()?;

    let inputs = ModelInputs::load(&conf, Some(args.mapfile.as_path()), cfg.layout)?;
    let seeds = if args.clock_seed {
        SeedSource::Fixed(clock_seed())
    } else {
        SeedSource::RankTable
    };

    let solution = run_model(&inputs, &cfg, args.ranks, seeds)?;
    for r in &solution.rounds {
        info!(phase = ?r.phase, iterations = r.iterations, converged = r.converged, "Number of iterations executed");
    }

    write_link_loads(&mut out, &solution.links).map_err(|e| ModelError::Io {
        path: args.outfile.clone(),
        source: e,
    })?;
    if let (Some(w), Some(path)) = (pci_out.as_mut(), args.pci_out.as_ref()) {
        write_pci_loads(
            w,
            inputs.topo.dims().pcis(),
            &solution.pci_send,
            &solution.pci_recv,
        )
        .map_err(|e| ModelError::Io {
            path: path.clone(),
            source: e,
        })?;
    }

    println!("{}", LoadSummary::from_solution(&inputs.topo, &solution));
    Ok(())
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
