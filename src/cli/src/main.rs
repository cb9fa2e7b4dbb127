use anyhow::Context;
use pstree_cli::process_command::process_cli;

pub fn main() -> anyhow::Result<()> {
    let passed = process_cli().context("Can't process CLI command")?;
    if !passed {
        std::process::exit(1);
    }
    Ok(())
}
