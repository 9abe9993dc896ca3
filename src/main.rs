//! Strong-solution driver: prove the value of 7x6 Connect Four against a
//! precomputed WDL oracle, caching every expanded position.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use forza_core::MoveSeq;
use forza_engine::{Solver, ply_histogram};
use forza_oracle::{Oracle, WdlServer};

/// Canonical table sizing, tuned to the working set of the full proof
/// rather than rounded up to a power of two.
const DEFAULT_TT_CAPACITY: usize = (1 << 33) + (1 << 32);

struct Config {
    wdl_binary: PathBuf,
    solution_dir: PathBuf,
    in_memory: bool,
    tt_capacity: usize,
}

fn parse_args() -> Result<Config> {
    let mut positional = Vec::new();
    let mut in_memory = false;
    let mut tt_capacity = DEFAULT_TT_CAPACITY;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--in-memory" => in_memory = true,
            "--tt-capacity" => {
                let value = args.next().context("--tt-capacity needs a value")?;
                tt_capacity = value
                    .parse()
                    .with_context(|| format!("bad table capacity {value:?}"))?;
                if tt_capacity == 0 {
                    bail!("table capacity must be positive");
                }
            }
            other if other.starts_with("--") => bail!("unknown flag {other:?}"),
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        bail!("usage: forza <wdl-binary> <solution-dir> [--in-memory] [--tt-capacity N]");
    }
    Ok(Config {
        wdl_binary: PathBuf::from(&positional[0]),
        solution_dir: PathBuf::from(&positional[1]),
        in_memory,
        tt_capacity,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = parse_args()?;

    let mut server = WdlServer::start(&config.wdl_binary, &config.solution_dir, config.in_memory)?;
    // The first query forces the oracle to load its solution files.
    server.query(&MoveSeq::new())?;

    let mut solver = Solver::new(server, config.tt_capacity);
    info!("starting search");
    let value = solver.search_root()?;
    info!(value, tt_size = solver.tt().len(), "search completed");

    let (tt, server) = solver.into_parts();
    server.shutdown()?;

    println!("Depth,NodeCount");
    for (depth, count) in ply_histogram(&tt)?.iter().enumerate() {
        println!("{depth},{count}");
    }

    info!("program finished");
    Ok(())
}
