//! Total scalar accessors over a [`ConfigSource`].
//!
//! Every accessor returns a usable value: a missing key, an empty string, or a
//! value that cannot be coerced all collapse to the caller's default (or to
//! `None` for the optional accessors). Callers decide elsewhere whether a
//! silent fallback is acceptable.

use std::path::PathBuf;

use crate::config::source::{ConfigSource, SourceError};

/// Resolve a lookup result to its value or `default`.
fn or_default<T>(path: &str, result: Result<T, SourceError>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            if !e.is_missing() {
                tracing::trace!(path, error = %e, "Unusable value, using default");
            }
            default
        }
    }
}

/// Returns true if the path holds an empty or whitespace-only string.
fn is_blank<S: ConfigSource + ?Sized>(source: &S, path: &str) -> bool {
    matches!(source.get_string(path), Ok(s) if s.trim().is_empty())
}

/// Read an integer, falling back to `default`.
pub fn integer_or<S: ConfigSource + ?Sized>(source: &S, path: &str, default: i64) -> i64 {
    or_default(path, source.get_integer(path), default)
}

/// Read a boolean, falling back to `default`.
pub fn boolean_or<S: ConfigSource + ?Sized>(source: &S, path: &str, default: bool) -> bool {
    or_default(path, source.get_boolean(path), default)
}

/// Read a string, falling back to `default`.
///
/// An explicitly empty string is returned as-is; only an absent or unreadable
/// value takes the default.
pub fn string_or<S: ConfigSource + ?Sized>(source: &S, path: &str, default: &str) -> String {
    or_default(path, source.get_string(path), default.to_string())
}

/// Read a list of strings, falling back to `default`.
pub fn string_list_or<S: ConfigSource + ?Sized>(
    source: &S,
    path: &str,
    default: &[String],
) -> Vec<String> {
    if is_blank(source, path) {
        return default.to_vec();
    }
    or_default(path, source.get_string_list(path), default.to_vec())
}

/// Read an optional string. Absent, empty, or unreadable values are `None`.
pub fn optional_string<S: ConfigSource + ?Sized>(source: &S, path: &str) -> Option<String> {
    or_default(path, source.get_string(path).map(Some), None).filter(|s| !s.is_empty())
}

/// Read an optional file path. Absent, empty, or unreadable values are `None`.
pub fn optional_path<S: ConfigSource + ?Sized>(source: &S, path: &str) -> Option<PathBuf> {
    optional_string(source, path).map(PathBuf::from)
}
