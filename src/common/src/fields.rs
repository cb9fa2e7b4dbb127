use crate::error::PatternError;
use crate::record::{Field, ProcessRecord};
use std::collections::BTreeMap;
use std::fmt;

/// Expected values for a subset of a record's fields. Fields that are not
/// named are not checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPattern {
    expected: BTreeMap<Field, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: Field,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: expected {:?}, actual {:?}",
            self.field, self.expected, self.actual
        )
    }
}

/// Every constrained field that differed, in field-name order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldsMismatch {
    pub mismatches: Vec<FieldMismatch>,
}

impl FieldPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.expected.insert(field, value.into());
        self
    }

    /// Builds a pattern from loosely-typed `(name, value)` pairs, rejecting
    /// any name that is not a process field.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .try_fold(FieldPattern::new(), |pattern, (name, value)| {
                Ok(pattern.with(name.parse::<Field>()?, value))
            })
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.expected.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<Field, String> {
        &self.expected
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn match_row(&self, row: &ProcessRecord) -> Option<FieldsMismatch> {
        let mismatches: Vec<FieldMismatch> = self
            .expected
            .iter()
            .filter(|(field, expected)| row.get(**field) != expected.as_str())
            .map(|(field, expected)| FieldMismatch {
                field: *field,
                expected: expected.clone(),
                actual: row.get(*field).to_string(),
            })
            .collect();

        if mismatches.is_empty() {
            None
        } else {
            Some(FieldsMismatch { mismatches })
        }
    }
}
