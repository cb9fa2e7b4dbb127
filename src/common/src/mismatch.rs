use crate::fields::FieldsMismatch;
use crate::record::{Field, ProcessRecord};
use crate::setwise::ChildrenMismatch;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

const FIELD_INDENT: &str = "  ";
const CHILDREN_INDENT: &str = "    ";

/// Why a process subtree did not satisfy a [`crate::Pattern`].
///
/// Produced only by a failed match, so at least one of `fields_mismatch` and
/// `children_mismatch` is always set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PsTreeMismatch {
    /// The fields the pattern constrained, with their expected values.
    pub row_fields: BTreeMap<Field, String>,
    /// The process that was matched against.
    pub subject: ProcessRecord,
    /// How many children the pattern expected.
    pub child_count: usize,
    pub fields_mismatch: Option<FieldsMismatch>,
    pub children_mismatch: Option<ChildrenMismatch>,
}

/// `PsTree(args="..", ruser=".." with N children)`
pub(crate) fn summarize(row_fields: &BTreeMap<Field, String>, child_count: usize) -> String {
    let fields = row_fields
        .iter()
        .map(|(field, value)| format!("{}={:?}", field, value))
        .join(", ");
    let suffix = if child_count == 1 { "" } else { "ren" };
    format!("PsTree({} with {} child{})", fields, child_count, suffix)
}

fn indented<'a>(prefix: &'a str, lines: Vec<String>) -> impl Iterator<Item = String> + 'a {
    lines.into_iter().map(move |line| format!("{}{}", prefix, line))
}

impl PsTreeMismatch {
    /// Returns `None` when neither part failed, which is how a successful
    /// match is represented.
    pub fn new(
        row_fields: BTreeMap<Field, String>,
        subject: ProcessRecord,
        child_count: usize,
        fields_mismatch: Option<FieldsMismatch>,
        children_mismatch: Option<ChildrenMismatch>,
    ) -> Option<Self> {
        if fields_mismatch.is_none() && children_mismatch.is_none() {
            return None;
        }
        Some(PsTreeMismatch {
            row_fields,
            subject,
            child_count,
            fields_mismatch,
            children_mismatch,
        })
    }

    pub fn describe(&self) -> String {
        self.describe_lines().join("\n")
    }

    pub(crate) fn describe_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} mismatch at pid {}: [",
            summarize(&self.row_fields, self.child_count),
            self.subject.pid
        )];

        if let Some(fields) = &self.fields_mismatch {
            lines.extend(indented(
                FIELD_INDENT,
                fields.mismatches.iter().map(ToString::to_string).collect(),
            ));
        }

        if let Some(children) = &self.children_mismatch {
            lines.push(format!("{}mismatches in children:", FIELD_INDENT));
            lines.extend(indented(CHILDREN_INDENT, children.describe_lines()));
        }

        lines.push("]".to_string());
        lines
    }
}

impl fmt::Display for PsTreeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl ChildrenMismatch {
    pub fn describe(&self) -> String {
        self.describe_lines().join("\n")
    }

    pub(crate) fn describe_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if self.expected != self.actual {
            let suffix = if self.expected == 1 { "" } else { "ren" };
            lines.push(format!(
                "expected {} child{}, found {}",
                self.expected, suffix, self.actual
            ));
        }
        for row in &self.unmatched_children {
            lines.push(format!("unexpected child: {}", row));
        }
        for pattern in &self.unmatched_patterns {
            lines.push(format!("missing child: {}", pattern));
        }
        for pair in &self.pair_mismatches {
            lines.extend(pair.describe_lines());
        }

        lines
    }
}

impl fmt::Display for ChildrenMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
