//! Canonical tile identity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Identity of a tile: level number, row and column.
///
/// Equality, ordering and hashing use `(level_number, row, column)` only.
/// The optional cache name rides along so a cache can namespace its entries,
/// but two keys naming the same grid cell are the same key.
///
/// # Example
///
/// ```
/// use globetiles::tile::TileKey;
///
/// let a = TileKey::new(3, 12, 45);
/// let b = TileKey::new(3, 12, 45).with_cache_name("Earth/BlueMarble");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "tile:3:12:45");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TileKey {
    level_number: u32,
    row: u32,
    column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_name: Option<String>,
}

impl TileKey {
    pub fn new(level_number: u32, row: u32, column: u32) -> Self {
        Self {
            level_number,
            row,
            column,
            cache_name: None,
        }
    }

    /// Attaches a cache namespace.
    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.cache_name = Some(cache_name.into());
        self
    }

    #[inline]
    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn cache_name(&self) -> Option<&str> {
        self.cache_name.as_deref()
    }

    #[inline]
    fn identity(&self) -> (u32, u32, u32) {
        (self.level_number, self.row, self.column)
    }
}

impl PartialEq for TileKey {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for TileKey {}

impl Hash for TileKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for TileKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile:{}:{}:{}", self.level_number, self.row, self.column)
    }
}
