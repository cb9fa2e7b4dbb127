use std::error::Error;
use std::fmt;

/// Raised while a pattern is being built, never while it is being matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    UnknownField(String),
    ParseError(String),
    UnsupportedFormat(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PatternError::UnknownField(name) => write!(
                f,
                "Unknown process field '{}' (expected one of: args, pid, ppid, ruser)",
                name
            ),
            PatternError::ParseError(msg) => write!(f, "Failed to parse pattern: {}", msg),
            PatternError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported pattern file format: '{}'", ext)
            }
        }
    }
}

impl Error for PatternError {}

/// Raised when a flat process listing cannot be assembled into a rooted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    NoRoot,
    MultipleRoots(Vec<String>),
    DuplicatePid(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TreeError::NoRoot => write!(f, "No root process (ppid 0) found"),
            TreeError::MultipleRoots(pids) => {
                write!(f, "Multiple root processes found: {}", pids.join(", "))
            }
            TreeError::DuplicatePid(pid) => write!(f, "Process id {} listed more than once", pid),
        }
    }
}

impl Error for TreeError {}
