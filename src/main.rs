use anyhow::Result;
use clap::Parser;

use anchor_gas_bench::cast::CastClient;
use anchor_gas_bench::config::{Cli, Config};
use anchor_gas_bench::runner;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::resolve(&cli)?;

    let client = CastClient::new();
    let report = runner::run(&cfg, &client)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
