//! Resource path construction.
//!
//! Tile resources are addressed by a cache-relative path:
//!
//! ```text
//! {cache_name}/{level}/{row}/{row}_{column}{suffix}
//! ```
//!
//! Example: `Earth/BlueMarble/3/12/12_45.dds`. On-disk tile stores written by
//! other tools use the same layout, so the format must not change.

use std::fmt::Write;

/// Default image format suffix for tile resources.
pub const DEFAULT_FORMAT_SUFFIX: &str = ".dds";

/// Dataset name and file suffix used to build resource identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    dataset_name: String,
    format_suffix: String,
}

impl PathTemplate {
    /// Creates a template. A suffix without a leading dot gets one.
    pub fn new(dataset_name: impl Into<String>, format_suffix: &str) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            format_suffix: normalize_suffix(format_suffix),
        }
    }

    /// Name of the dataset on the tile server.
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// File suffix including the leading dot, e.g. `.dds`.
    pub fn format_suffix(&self) -> &str {
        &self.format_suffix
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self::new("", DEFAULT_FORMAT_SUFFIX)
    }
}

/// Prefixes `suffix` with a dot unless it is empty or already has one.
pub fn normalize_suffix(suffix: &str) -> String {
    let suffix = suffix.trim();
    if suffix.is_empty() || suffix.starts_with('.') {
        suffix.to_string()
    } else {
        format!(".{}", suffix)
    }
}

/// Formats `{cache_name}/{level}/{row}/{row}_{column}{suffix}`.
pub fn format_resource_path(
    cache_name: &str,
    level_number: u32,
    row: u32,
    column: u32,
    suffix: &str,
) -> String {
    let mut path = String::with_capacity(cache_name.len() + suffix.len() + 32);
    // Writing to a String cannot fail.
    let _ = write!(
        path,
        "{}/{}/{}/{}_{}{}",
        cache_name, level_number, row, row, column, suffix
    );
    path
}
