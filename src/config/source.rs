//! Queryable configuration source.
//!
//! # Responsibilities
//! - Define the lookup contract the resolver depends on
//! - Distinguish "nothing at this path" from every other lookup failure
//! - Provide a TOML-backed implementation with loose scalar coercion
//!
//! # Design Decisions
//! - Paths are dotted (`http.max-request-size-mb`)
//! - A missing intermediate table is `Missing`; a non-table intermediate is `WrongType`
//! - Strings coerce into integers, booleans and lists so environment overrides
//!   (always strings) behave like typed file values

use thiserror::Error;
use toml::{Table, Value};

/// Errors raised by a [`ConfigSource`] lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Nothing is configured at the path.
    #[error("no value at `{path}`")]
    Missing { path: String },

    /// A value exists but has an incompatible structural type.
    #[error("`{path}` has the wrong type: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value exists but cannot be coerced.
    #[error("`{path}` is invalid: {reason}")]
    Invalid { path: String, reason: String },
}

impl SourceError {
    /// Returns true if the error means "not configured".
    pub fn is_missing(&self) -> bool {
        matches!(self, SourceError::Missing { .. })
    }

    /// The fully-qualified path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            SourceError::Missing { path }
            | SourceError::WrongType { path, .. }
            | SourceError::Invalid { path, .. } => path,
        }
    }
}

/// A hierarchical key-value store the resolver reads from.
pub trait ConfigSource {
    /// Read a string value.
    fn get_string(&self, path: &str) -> Result<String, SourceError>;

    /// Read an integer value.
    fn get_integer(&self, path: &str) -> Result<i64, SourceError>;

    /// Read a boolean value.
    fn get_boolean(&self, path: &str) -> Result<bool, SourceError>;

    /// Read an ordered list of strings.
    fn get_string_list(&self, path: &str) -> Result<Vec<String>, SourceError>;

    /// Descend into a nested section.
    fn get_section(&self, path: &str) -> Result<Self, SourceError>
    where
        Self: Sized;

    /// Qualify a section-relative path for error messages.
    fn qualify(&self, path: &str) -> String {
        path.to_string()
    }
}

/// [`ConfigSource`] over a parsed TOML table.
#[derive(Debug, Clone)]
pub struct TomlSource<'a> {
    table: &'a Table,
    prefix: String,
}

impl<'a> TomlSource<'a> {
    /// Wrap a root table.
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            prefix: String::new(),
        }
    }

    fn lookup(&self, path: &str) -> Result<&'a Value, SourceError> {
        let mut current = self.table;
        let mut segments = path.split('.');
        let last = segments.next_back().unwrap_or(path);

        for segment in segments {
            match current.get(segment) {
                Some(Value::Table(next)) => current = next,
                Some(other) => return Err(self.wrong_type(path, "table", other)),
                None => {
                    return Err(SourceError::Missing {
                        path: self.qualify(path),
                    })
                }
            }
        }

        current.get(last).ok_or_else(|| SourceError::Missing {
            path: self.qualify(path),
        })
    }

    fn wrong_type(&self, path: &str, expected: &'static str, found: &Value) -> SourceError {
        SourceError::WrongType {
            path: self.qualify(path),
            expected,
            found: found.type_str(),
        }
    }

    fn invalid(&self, path: &str, reason: impl Into<String>) -> SourceError {
        SourceError::Invalid {
            path: self.qualify(path),
            reason: reason.into(),
        }
    }
}

/// Render a scalar TOML value as a string; `None` for arrays and tables.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

impl<'a> ConfigSource for TomlSource<'a> {
    fn get_string(&self, path: &str) -> Result<String, SourceError> {
        let value = self.lookup(path)?;
        scalar_to_string(value).ok_or_else(|| self.wrong_type(path, "string", value))
    }

    fn get_integer(&self, path: &str) -> Result<i64, SourceError> {
        match self.lookup(path)? {
            Value::Integer(i) => Ok(*i),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| self.invalid(path, format!("`{s}` is not an integer ({e})"))),
            other => Err(self.wrong_type(path, "integer", other)),
        }
    }

    fn get_boolean(&self, path: &str) -> Result<bool, SourceError> {
        match self.lookup(path)? {
            Value::Boolean(b) => Ok(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(self.invalid(path, format!("`{s}` is not a boolean"))),
            },
            other => Err(self.wrong_type(path, "boolean", other)),
        }
    }

    fn get_string_list(&self, path: &str) -> Result<Vec<String>, SourceError> {
        match self.lookup(path)? {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| self.wrong_type(path, "string", item))
                })
                .collect(),
            // Environment overrides arrive as comma-separated strings.
            Value::String(s) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()),
            other => Err(self.wrong_type(path, "array", other)),
        }
    }

    fn get_section(&self, path: &str) -> Result<Self, SourceError> {
        match self.lookup(path)? {
            Value::Table(table) => Ok(TomlSource {
                table,
                prefix: self.qualify(path),
            }),
            other => Err(self.wrong_type(path, "table", other)),
        }
    }

    fn qualify(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}.{}", self.prefix, path)
        }
    }
}
