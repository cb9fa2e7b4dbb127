use crate::fields::{FieldPattern, FieldsMismatch};
use crate::mismatch::{summarize, PsTreeMismatch};
use crate::record::{Field, ProcessRecord};
use crate::setwise::match_setwise;
use crate::tree::ProcessTreeNode;
use std::fmt;

/// Something that can check a value and explain a failure.
///
/// `None` means the value matched.
pub trait Matcher<T: ?Sized> {
    type Mismatch;

    fn match_value(&self, value: &T) -> Option<Self::Mismatch>;

    fn matches(&self, value: &T) -> bool {
        self.match_value(value).is_none()
    }
}

impl Matcher<ProcessRecord> for FieldPattern {
    type Mismatch = FieldsMismatch;

    fn match_value(&self, row: &ProcessRecord) -> Option<FieldsMismatch> {
        self.match_row(row)
    }
}

/// The expected shape of a process subtree: constraints on the process
/// itself and one pattern per expected child, in no particular order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    fields: FieldPattern,
    children: Vec<Pattern>,
}

impl Pattern {
    /// The usual pattern: a process owned by `ruser` running `args`.
    pub fn new(ruser: impl Into<String>, args: impl Into<String>) -> Self {
        Self::from_fields(
            FieldPattern::new()
                .with(Field::Ruser, ruser)
                .with(Field::Args, args),
        )
    }

    pub fn from_fields(fields: FieldPattern) -> Self {
        Pattern {
            fields,
            children: Vec::new(),
        }
    }

    /// Builds a pattern that constrains `fields` of every node to the values
    /// found in `node`.
    pub fn from_tree(node: &ProcessTreeNode, fields: &[Field]) -> Self {
        let row_fields = fields
            .iter()
            .fold(FieldPattern::new(), |pattern, field| {
                pattern.with(*field, node.row.get(*field))
            });

        Pattern {
            fields: row_fields,
            children: node
                .children
                .iter()
                .map(|child| Pattern::from_tree(child, fields))
                .collect(),
        }
    }

    pub fn pid(self, pid: impl Into<String>) -> Self {
        self.with_field(Field::Pid, pid)
    }

    pub fn ppid(self, ppid: impl Into<String>) -> Self {
        self.with_field(Field::Ppid, ppid)
    }

    pub fn with_field(self, field: Field, value: impl Into<String>) -> Self {
        Pattern {
            fields: self.fields.with(field, value),
            ..self
        }
    }

    pub fn with_child(mut self, child: Pattern) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Pattern>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn fields(&self) -> &FieldPattern {
        &self.fields
    }

    pub fn child_patterns(&self) -> &[Pattern] {
        &self.children
    }

    /// Number of processes a matching tree contains.
    pub fn process_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Pattern::process_count)
            .sum::<usize>()
    }

    /// Matches the process itself and then, set-wise, its children.
    pub fn match_tree(&self, node: &ProcessTreeNode) -> Option<PsTreeMismatch> {
        let fields_mismatch = self.fields.match_row(&node.row);
        let children_mismatch = match_setwise(&node.children, &self.children);

        PsTreeMismatch::new(
            self.fields.fields().clone(),
            node.row.clone(),
            self.children.len(),
            fields_mismatch,
            children_mismatch,
        )
    }
}

impl Matcher<ProcessTreeNode> for Pattern {
    type Mismatch = PsTreeMismatch;

    fn match_value(&self, node: &ProcessTreeNode) -> Option<PsTreeMismatch> {
        self.match_tree(node)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&summarize(self.fields.fields(), self.children.len()))
    }
}

/// Panics with the rendered mismatch if `node` does not match `pattern`.
#[track_caller]
pub fn assert_tree_matches(node: &ProcessTreeNode, pattern: &Pattern) {
    if let Some(mismatch) = pattern.match_tree(node) {
        panic!(
            "process tree does not match pattern\n{}\nactual tree:\n{}",
            mismatch.describe(),
            node
        );
    }
}
