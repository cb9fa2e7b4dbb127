use crate::commands::{Cli, Command};
use crate::config::{Config, ConfigLoader};
use crate::logging::setup_logging;
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use pstree_common::pattern_file::{load_pattern, PatternSpec};
use pstree_common::{build_process_tree, Pattern, ProcessTreeNode};
use pstree_extracts::stabilize::snapshot_tree;
use pstree_extracts::{filter_rows, output_lines, parse_ps_output, DockerProcessSource};
use std::path::Path;

/// Runs the command line. Returns `false` when a check ran and failed.
pub fn process_cli() -> Result<bool> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_config(cli.config.as_deref())?;
    setup_logging(&config.log_level, config.log_file.as_deref().map(Path::new))?;

    match cli.command {
        Command::Check {
            container,
            pattern,
            expect_count,
        } => runtime()?.block_on(check_container(&container, &pattern, expect_count, &config)),
        Command::Match { listing, pattern } => match_listing(&listing, &pattern, &config),
        Command::Show {
            container,
            as_pattern,
            with_pids,
        } => runtime()?.block_on(show_container(&container, as_pattern, with_pids, &config)),
        Command::Validate { pattern } => validate_pattern(&pattern),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(true)
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start tokio runtime")
}

pub async fn check_container(
    container: &str,
    pattern: &Path,
    expect_count: Option<usize>,
    config: &Config,
) -> Result<bool> {
    let pattern = load_pattern(pattern)?;
    let expected = expect_count.unwrap_or_else(|| pattern.process_count());
    let source = DockerProcessSource::connect(container, config.exclude.clone())?;

    tracing::info!(
        "Checking {} against {} ({} processes expected)",
        container,
        pattern,
        expected
    );
    let tree = snapshot_tree(&source, Some(expected), config.retry_policy())
        .await
        .with_context(|| format!("Failed to read processes of {}", container))?;

    Ok(report(&tree, &pattern))
}

pub async fn show_container(
    container: &str,
    as_pattern: bool,
    with_pids: bool,
    config: &Config,
) -> Result<bool> {
    let source = DockerProcessSource::connect(container, config.exclude.clone())?;
    let tree = snapshot_tree(&source, None, config.retry_policy())
        .await
        .with_context(|| format!("Failed to read processes of {}", container))?;

    if as_pattern {
        let spec = PatternSpec::from_tree(&tree, with_pids);
        print!("{}", toml::to_string_pretty(&spec)?);
    } else {
        print!("{}", tree);
    }
    Ok(true)
}

fn validate_pattern(path: &Path) -> Result<bool> {
    let pattern = load_pattern(path)?;
    println!(
        "{} {} ({} processes)",
        "Valid pattern:".green(),
        pattern,
        pattern.process_count()
    );
    Ok(true)
}

fn match_listing(listing: &Path, pattern: &Path, config: &Config) -> Result<bool> {
    let pattern = load_pattern(pattern)?;
    let raw = std::fs::read(listing)
        .with_context(|| format!("Failed to read process listing {:?}", listing))?;
    let rows = filter_rows(parse_ps_output(&output_lines(&raw))?, &config.exclude);
    let tree = build_process_tree(rows).context("Failed to build process tree")?;

    Ok(report(&tree, &pattern))
}

fn report(tree: &ProcessTreeNode, pattern: &Pattern) -> bool {
    match pattern.match_tree(tree) {
        None => {
            println!("{} {}", "Process tree matches".green(), pattern);
            true
        }
        Some(mismatch) => {
            println!("{}", "Process tree does not match".red().bold());
            println!("{}", mismatch.describe());
            println!();
            println!("Actual tree:");
            print!("{}", tree);
            false
        }
    }
}
