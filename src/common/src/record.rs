use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The columns of a `ps -o pid,ppid,ruser,args` listing.
///
/// Variants are declared in name order so that `Ord` (and therefore any
/// `BTreeMap<Field, _>`) iterates lexicographically by field name.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Args,
    Pid,
    Ppid,
    Ruser,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Args, Field::Pid, Field::Ppid, Field::Ruser];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Args => "args",
            Field::Pid => "pid",
            Field::Ppid => "ppid",
            Field::Ruser => "ruser",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| PatternError::UnknownField(s.to_string()))
    }
}

/// One row of a process listing. Values are kept exactly as `ps` printed them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessRecord {
    pub pid: String,
    pub ppid: String,
    pub ruser: String,
    pub args: String,
}

impl ProcessRecord {
    pub fn new(
        pid: impl Into<String>,
        ppid: impl Into<String>,
        ruser: impl Into<String>,
        args: impl Into<String>,
    ) -> Self {
        ProcessRecord {
            pid: pid.into(),
            ppid: ppid.into(),
            ruser: ruser.into(),
            args: args.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Args => &self.args,
            Field::Pid => &self.pid,
            Field::Ppid => &self.ppid,
            Field::Ruser => &self.ruser,
        }
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ProcessRecord(args={:?}, pid={:?}, ppid={:?}, ruser={:?})",
            self.args, self.pid, self.ppid, self.ruser
        )
    }
}
