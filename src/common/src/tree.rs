use crate::error::TreeError;
use crate::record::ProcessRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Parent pid reported for the root of a container's process tree (and for
/// anything started with `docker exec`).
pub const ROOT_PPID: &str = "0";

/// A process and the processes it spawned.
///
/// The tree is owned top-down and has no parent links. The order of
/// `children` is whatever order the listing produced and carries no meaning
/// for matching.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProcessTreeNode {
    pub row: ProcessRecord,
    pub children: Vec<ProcessTreeNode>,
}

impl ProcessTreeNode {
    pub fn leaf(row: ProcessRecord) -> Self {
        ProcessTreeNode {
            row,
            children: Vec::new(),
        }
    }

    pub fn with_children(row: ProcessRecord, children: Vec<ProcessTreeNode>) -> Self {
        ProcessTreeNode { row, children }
    }

    /// Number of processes in this subtree, including this one.
    pub fn process_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ProcessTreeNode::process_count)
            .sum::<usize>()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}[{}] {} {}",
            "",
            self.row.pid,
            self.row.ruser,
            self.row.args,
            indent = depth * 2
        )?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ProcessTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Links a flat listing into a tree rooted at the single row whose parent pid
/// is `0`.
///
/// Rows that cannot be reached from the root are dropped, so the returned
/// tree is always acyclic even if the listing contains a pid loop.
pub fn build_process_tree(rows: Vec<ProcessRecord>) -> Result<ProcessTreeNode, TreeError> {
    let mut seen_pids = HashSet::new();
    for row in &rows {
        if !seen_pids.insert(row.pid.as_str()) {
            return Err(TreeError::DuplicatePid(row.pid.clone()));
        }
    }

    let roots: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.ppid == ROOT_PPID)
        .map(|(idx, _)| idx)
        .collect();

    let root_idx = match roots.as_slice() {
        [] => return Err(TreeError::NoRoot),
        [idx] => *idx,
        _ => {
            return Err(TreeError::MultipleRoots(
                roots.iter().map(|idx| rows[*idx].pid.clone()).collect(),
            ))
        }
    };

    let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        if idx != root_idx {
            children_of.entry(row.ppid.as_str()).or_default().push(idx);
        }
    }

    let mut visited = vec![false; rows.len()];
    let tree = attach(root_idx, &rows, &children_of, &mut visited);

    let dropped: Vec<&str> = rows
        .iter()
        .zip(&visited)
        .filter(|(_, visited)| !**visited)
        .map(|(row, _)| row.pid.as_str())
        .collect();
    if !dropped.is_empty() {
        tracing::warn!(
            "Dropped {} process(es) not reachable from root pid {}: {}",
            dropped.len(),
            rows[root_idx].pid,
            dropped.join(", ")
        );
    }

    Ok(tree)
}

fn attach(
    idx: usize,
    rows: &[ProcessRecord],
    children_of: &HashMap<&str, Vec<usize>>,
    visited: &mut [bool],
) -> ProcessTreeNode {
    visited[idx] = true;
    let children = children_of
        .get(rows[idx].pid.as_str())
        .map(|indices| {
            indices
                .iter()
                .filter(|child| !visited[**child])
                .copied()
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, rows, children_of, visited))
        .collect();

    ProcessTreeNode::with_children(rows[idx].clone(), children)
}
