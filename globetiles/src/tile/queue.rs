//! Fetch-order queue for tiles.
//!
//! Tiles are ordered by priority (lower values first, so nearer tiles when
//! priorities are distances), then by enqueue order (FIFO within the same
//! priority). The priority is read once when the tile is pushed; a later
//! [`Tile::set_priority`] on a queued tile does not reorder it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use globetiles::level::{Level, PathTemplate};
//! use globetiles::tile::{Tile, TileQueue};
//!
//! let level = Arc::new(
//!     Level::new(0, 512, 512, 36.0, 36.0, "Earth", PathTemplate::default()).unwrap(),
//! );
//! let far = Tile::from_grid(Arc::clone(&level), 0, 0).unwrap();
//! far.set_priority_distance(5000.0);
//! let near = Tile::from_grid(level, 0, 1).unwrap();
//! near.set_priority_distance(10.0);
//!
//! let mut queue = TileQueue::new();
//! queue.push(far);
//! queue.push(near);
//! assert_eq!(queue.pop().unwrap().column(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{Tile, TileKey};

struct QueuedTile {
    tile: Tile,
    priority: f64,
    sequence: u64,
}

// Ordering for BinaryHeap: lowest priority value first, then lowest sequence
impl PartialEq for QueuedTile {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTile {}

impl PartialOrd for QueuedTile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTile {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so both comparisons are reversed.
        match other.priority.total_cmp(&self.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ordering => ordering,
        }
    }
}

/// Priority queue of tiles awaiting fetch.
#[derive(Default)]
pub struct TileQueue {
    heap: BinaryHeap<QueuedTile>,
    next_sequence: u64,
}

impl TileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `tile` at its current priority.
    pub fn push(&mut self, tile: Tile) {
        let priority = tile.priority();
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedTile {
            tile,
            priority,
            sequence,
        });
    }

    /// Removes the tile to fetch next.
    pub fn pop(&mut self) -> Option<Tile> {
        self.heap.pop().map(|queued| queued.tile)
    }

    /// The tile [`pop`](Self::pop) would return.
    pub fn peek(&self) -> Option<&Tile> {
        self.heap.peek().map(|queued| &queued.tile)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True if a tile with `key` is queued.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.heap.iter().any(|queued| queued.tile.key() == key)
    }

    /// Keeps only the tiles for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Tile) -> bool) {
        self.heap.retain(|queued| keep(&queued.tile));
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Empties the queue, returning tiles in fetch order.
    pub fn drain_sorted(&mut self) -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(self.heap.len());
        while let Some(tile) = self.pop() {
            tiles.push(tile);
        }
        tiles
    }
}

impl std::fmt::Debug for TileQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileQueue")
            .field("len", &self.heap.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

impl Extend<Tile> for TileQueue {
    fn extend<I: IntoIterator<Item = Tile>>(&mut self, iter: I) {
        for tile in iter {
            self.push(tile);
        }
    }
}
