//! Schema: the named fields of the configured line pattern.
//!
//! A [`Schema`] is derived once at startup from `LOG_REGEX`. It owns the
//! compiled pattern and the ordered list of named capture groups; one of them
//! must be `time`. Unnamed groups are ignored.

use crate::error::ConfigError;
use regex::Regex;

/// Name of the mandatory timestamp group.
pub const TIME_FIELD: &str = "time";

/// A named capture group and its position in the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pattern: Regex,
    /// Named groups in pattern order, `time` included.
    fields: Vec<Field>,
    time_index: usize,
}

impl Schema {
    /// Compile `pattern` and validate that it defines a `time` group.
    pub fn derive(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern)?;

        let fields: Vec<Field> = pattern
            .capture_names()
            .enumerate()
            .filter_map(|(index, name)| match name {
                Some(name) if !name.is_empty() => Some(Field {
                    name: name.to_string(),
                    index,
                }),
                _ => None,
            })
            .collect();

        let time_index = fields
            .iter()
            .find(|f| f.name == TIME_FIELD)
            .map(|f| f.index)
            .ok_or(ConfigError::MissingTimeField)?;

        Ok(Self {
            pattern,
            fields,
            time_index,
        })
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// All named fields, in pattern order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Named fields other than `time`; these become point attributes.
    pub fn attr_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.name != TIME_FIELD)
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    /// Total capture positions a match yields, including the implicit whole
    /// match at position 0.
    pub fn capture_count(&self) -> usize {
        self.pattern.captures_len()
    }
}
