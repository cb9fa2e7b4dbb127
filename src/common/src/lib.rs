pub mod error;
pub mod fields;
pub mod mismatch;
pub mod pattern;
pub mod pattern_file;
pub mod record;
pub mod setwise;
pub mod tree;

pub use error::{PatternError, TreeError};
pub use fields::{FieldMismatch, FieldPattern, FieldsMismatch};
pub use mismatch::PsTreeMismatch;
pub use pattern::{assert_tree_matches, Matcher, Pattern};
pub use record::{Field, ProcessRecord};
pub use setwise::{match_setwise, ChildrenMismatch, Setwise};
pub use tree::{build_process_tree, ProcessTreeNode};
