use crate::docker::ProcessSource;
use anyhow::{Context, Result};
use pstree_common::{build_process_tree, ProcessRecord, ProcessTreeNode};
use std::time::Duration;
use tokio::time::sleep;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Fixed-interval polling used while a container's processes settle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Polls `source` until it reports `expected` processes or the retries run
/// out. The last listing is returned either way; a wrong count is for the
/// matcher to report, not for the poller.
pub async fn wait_for_process_count(
    source: &dyn ProcessSource,
    expected: usize,
    policy: RetryPolicy,
) -> Result<Vec<ProcessRecord>> {
    let mut rows = source.list_processes().await?;

    for attempt in 1..=policy.retries {
        if rows.len() == expected {
            break;
        }
        tracing::debug!(
            "Found {} processes, expected {} (retry {}/{})",
            rows.len(),
            expected,
            attempt,
            policy.retries
        );
        sleep(policy.delay).await;
        rows = source.list_processes().await?;
    }

    if rows.len() != expected {
        tracing::warn!(
            "Process count did not settle: found {}, expected {}",
            rows.len(),
            expected
        );
    }

    Ok(rows)
}

/// Takes one listing (waiting for `expected` processes if given) and links it
/// into a tree.
pub async fn snapshot_tree(
    source: &dyn ProcessSource,
    expected: Option<usize>,
    policy: RetryPolicy,
) -> Result<ProcessTreeNode> {
    let rows = match expected {
        Some(expected) => wait_for_process_count(source, expected, policy).await?,
        None => source.list_processes().await?,
    };
    build_process_tree(rows).context("Failed to build process tree")
}
