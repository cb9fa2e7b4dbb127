//! Unordered matching of a process's children against child patterns.
//!
//! Children and patterns form the two sides of a bipartite graph, with an
//! edge wherever the pattern matches the child's whole subtree. The children
//! match only if that graph has a perfect matching. A first-fit assignment is
//! not enough: a child that fits two patterns may take the one a later child
//! needs, so the search uses augmenting paths (Kuhn's algorithm) and is free
//! to move earlier pairings.
//!
//! Edge tests are recursive tree matches, so each one is computed on first
//! use and cached for the rest of the search.

use crate::mismatch::PsTreeMismatch;
use crate::pattern::{Matcher, Pattern};
use crate::record::ProcessRecord;
use crate::tree::ProcessTreeNode;

/// Set-wise matcher over a fixed list of child patterns.
#[derive(Clone, Copy, Debug)]
pub struct Setwise<'a> {
    patterns: &'a [Pattern],
}

/// Why a set of children could not be paired one-to-one with the expected
/// patterns.
///
/// After the largest possible pairing has been found, leftover patterns are
/// matched up with leftover children purely for reporting (`pair_mismatches`);
/// whatever remains on either side is listed as unexpected or missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildrenMismatch {
    pub expected: usize,
    pub actual: usize,
    pub unmatched_children: Vec<ProcessRecord>,
    pub unmatched_patterns: Vec<String>,
    pub pair_mismatches: Vec<PsTreeMismatch>,
}

impl<'a> Setwise<'a> {
    pub fn new(patterns: &'a [Pattern]) -> Self {
        Setwise { patterns }
    }
}

impl Matcher<[ProcessTreeNode]> for Setwise<'_> {
    type Mismatch = ChildrenMismatch;

    fn match_value(&self, children: &[ProcessTreeNode]) -> Option<ChildrenMismatch> {
        if children.is_empty() && self.patterns.is_empty() {
            return None;
        }

        let mut assignment = Assignment::new(children, self.patterns);
        let matched = assignment.maximise();

        if matched == children.len() && matched == self.patterns.len() {
            return None;
        }

        tracing::debug!(
            "Set-wise match paired {} of {} children with {} patterns",
            matched,
            children.len(),
            self.patterns.len()
        );

        Some(assignment.into_mismatch())
    }
}

pub fn match_setwise(
    children: &[ProcessTreeNode],
    patterns: &[Pattern],
) -> Option<ChildrenMismatch> {
    Setwise::new(patterns).match_value(children)
}

struct Assignment<'a> {
    children: &'a [ProcessTreeNode],
    patterns: &'a [Pattern],
    /// `edges[child][pattern]`, filled in lazily.
    edges: Vec<Vec<Option<bool>>>,
    pattern_owner: Vec<Option<usize>>,
    child_pattern: Vec<Option<usize>>,
}

impl<'a> Assignment<'a> {
    fn new(children: &'a [ProcessTreeNode], patterns: &'a [Pattern]) -> Self {
        Assignment {
            children,
            patterns,
            edges: vec![vec![None; patterns.len()]; children.len()],
            pattern_owner: vec![None; patterns.len()],
            child_pattern: vec![None; children.len()],
        }
    }

    fn edge(&mut self, child: usize, pattern: usize) -> bool {
        if let Some(known) = self.edges[child][pattern] {
            return known;
        }
        let matches = self.patterns[pattern]
            .match_tree(&self.children[child])
            .is_none();
        self.edges[child][pattern] = Some(matches);
        matches
    }

    /// Tries to give `child` a pattern, displacing current owners along an
    /// augmenting path if needed.
    fn augment(&mut self, child: usize, visited: &mut [bool]) -> bool {
        for pattern in 0..self.patterns.len() {
            if visited[pattern] || !self.edge(child, pattern) {
                continue;
            }
            visited[pattern] = true;

            let reassigned = match self.pattern_owner[pattern] {
                None => true,
                Some(owner) => self.augment(owner, visited),
            };
            if reassigned {
                self.pattern_owner[pattern] = Some(child);
                self.child_pattern[child] = Some(pattern);
                return true;
            }
        }
        false
    }

    /// Size of the maximum matching.
    fn maximise(&mut self) -> usize {
        let mut matched = 0;
        for child in 0..self.children.len() {
            let mut visited = vec![false; self.patterns.len()];
            if self.augment(child, &mut visited) {
                matched += 1;
            }
        }
        matched
    }

    fn into_mismatch(self) -> ChildrenMismatch {
        let mut spare_children: Vec<usize> = (0..self.children.len())
            .filter(|child| self.child_pattern[*child].is_none())
            .collect();
        let spare_patterns: Vec<usize> = (0..self.patterns.len())
            .filter(|pattern| self.pattern_owner[*pattern].is_none())
            .collect();

        let mut pair_mismatches = Vec::new();
        let mut unmatched_patterns = Vec::new();

        for pattern_idx in spare_patterns {
            let pattern = &self.patterns[pattern_idx];
            if spare_children.is_empty() {
                unmatched_patterns.push(pattern.to_string());
                continue;
            }

            // Prefer a child whose own row fits, so the report points at the
            // subtree that actually differs.
            let pick = spare_children
                .iter()
                .position(|child| pattern.fields().match_row(&self.children[*child].row).is_none())
                .unwrap_or(0);
            let child = spare_children.remove(pick);

            if let Some(mismatch) = pattern.match_tree(&self.children[child]) {
                pair_mismatches.push(mismatch);
            }
        }

        ChildrenMismatch {
            expected: self.patterns.len(),
            actual: self.children.len(),
            unmatched_children: spare_children
                .into_iter()
                .map(|child| self.children[child].row.clone())
                .collect(),
            unmatched_patterns,
            pair_mismatches,
        }
    }
}
