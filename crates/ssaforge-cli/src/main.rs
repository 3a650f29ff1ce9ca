//! `ssaforge` — convert a bundled demo CFG to SSA form and print it as
//! Graphviz DOT.
//!
//! ```text
//! ssaforge diamond          # branch diamond, SSA form
//! ssaforge loop --no-ssa    # natural loop, raw CFG
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ssaforge_core::build_ssa;
use tracing_subscriber::EnvFilter;

mod demos;
mod render;

#[derive(Parser)]
#[command(
    name = "ssaforge",
    version,
    about = "SSA construction over demo control flow graphs"
)]
struct Cli {
    /// Which bundled demo graph to use.
    #[arg(value_enum)]
    demo: Demo,

    /// Print the raw CFG without running SSA construction.
    #[arg(long)]
    no_ssa: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// Branch diamond: two arms redefining the same variable, then a join.
    Diamond,
    /// Natural loop with a loop-carried variable.
    Loop,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    tracing::debug!(demo = ?cli.demo, no_ssa = cli.no_ssa, "building demo graph");
    let mut graph = match cli.demo {
        Demo::Diamond => demos::diamond(),
        Demo::Loop => demos::natural_loop(),
    };

    if !cli.no_ssa {
        build_ssa(&mut graph).context("ssa construction failed")?;
    }

    print!("{}", render::to_dot(&mut graph));
    Ok(())
}
