//! Patterns loaded from TOML or JSON test data.
//!
//! ```toml
//! ruser = "root"
//! args = "tini -- django-entrypoint.sh mysite.wsgi:application"
//! pid = "1"
//!
//! [[children]]
//! ruser = "django"
//! args = "gunicorn: master"
//! ```

use crate::error::PatternError;
use crate::pattern::Pattern;
use crate::tree::ProcessTreeNode;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    pub ruser: String,
    pub args: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PatternSpec>,
}

impl From<PatternSpec> for Pattern {
    fn from(spec: PatternSpec) -> Self {
        let mut pattern = Pattern::new(spec.ruser, spec.args);
        if let Some(pid) = spec.pid {
            pattern = pattern.pid(pid);
        }
        if let Some(ppid) = spec.ppid {
            pattern = pattern.ppid(ppid);
        }
        pattern.with_children(spec.children.into_iter().map(Pattern::from))
    }
}

impl PatternSpec {
    /// Describes an observed tree as pattern data, e.g. to seed a new test.
    /// Pids are only included when asked for since they rarely survive a
    /// container restart.
    pub fn from_tree(node: &ProcessTreeNode, with_pids: bool) -> Self {
        PatternSpec {
            ruser: node.row.ruser.clone(),
            args: node.row.args.clone(),
            pid: with_pids.then(|| node.row.pid.clone()),
            ppid: None,
            children: node
                .children
                .iter()
                .map(|child| PatternSpec::from_tree(child, with_pids))
                .collect(),
        }
    }
}

pub fn parse_toml_pattern(content: &str) -> Result<Pattern, PatternError> {
    toml::from_str::<PatternSpec>(content)
        .map(Pattern::from)
        .map_err(|e| PatternError::ParseError(e.to_string()))
}

pub fn parse_json_pattern(content: &str) -> Result<Pattern, PatternError> {
    serde_json::from_str::<PatternSpec>(content)
        .map(Pattern::from)
        .map_err(|e| PatternError::ParseError(e.to_string()))
}

/// Loads a pattern file, picking the format from the extension.
pub fn load_pattern(path: impl AsRef<Path>) -> anyhow::Result<Pattern> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file {:?}", path))?;

    let pattern = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml_pattern(&content)?,
        Some("json") => parse_json_pattern(&content)?,
        other => {
            return Err(PatternError::UnsupportedFormat(other.unwrap_or_default().to_string()).into())
        }
    };

    tracing::debug!("Loaded pattern {} from {:?}", pattern, path);
    Ok(pattern)
}
