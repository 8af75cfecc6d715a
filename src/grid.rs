//! Grid engine: blocks, adjacency, same-colour flood fill, column collapse.

use rand::Rng;
use std::collections::VecDeque;
use thiserror::Error;

/// Default number of columns.
pub const DEFAULT_WIDTH: usize = 10;

/// Default number of rows.
pub const DEFAULT_HEIGHT: usize = 10;

/// Block colours. The palette is fixed; the theme maps each variant to a terminal colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Colour {
    pub const ALL: [Self; 4] = [Self::Red, Self::Green, Self::Blue, Self::Yellow];

    /// Uniformly random palette entry.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        }
    }
}

/// Handle to a block in the grid's arena. Stays valid for the lifetime of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

/// One cell's content. Only the grid mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    x: usize,
    y: usize,
    colour: Colour,
    removed: bool,
}

impl Block {
    pub fn new<R: Rng + ?Sized>(x: usize, y: usize, rng: &mut R) -> Self {
        Self::with_colour(x, y, Colour::random(rng))
    }

    fn with_colour(x: usize, y: usize, colour: Colour) -> Self {
        Self {
            x,
            y,
            colour,
            removed: false,
        }
    }

    #[inline]
    pub fn x(&self) -> usize {
        self.x
    }

    /// Row, 0 = bottom.
    #[inline]
    pub fn y(&self) -> usize {
        self.y
    }

    #[inline]
    pub fn colour(&self) -> Colour {
        self.colour
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
    #[cfg(test)]
    #[error("column {column} has {found} blocks, expected {expected}")]
    RaggedColumns {
        column: usize,
        expected: usize,
        found: usize,
    },
}

/// Fixed-size grid of blocks. `columns[x][y]` is the block at column x, row y (row 0 = bottom).
///
/// Blocks live in `blocks` and are never created or dropped after construction;
/// collapse only reorders the ids inside each column and rewrites `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    width: usize,
    height: usize,
    blocks: Vec<Block>,
    columns: Vec<Vec<BlockId>>,
}

impl BlockGrid {
    /// Grid of random colours from the thread-local RNG.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::with_rng(width, height, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        let mut blocks = Vec::with_capacity(width * height);
        let mut columns = Vec::with_capacity(width);
        for x in 0..width {
            let mut col = Vec::with_capacity(height);
            for y in 0..height {
                col.push(BlockId(blocks.len()));
                blocks.push(Block::new(x, y, &mut *rng));
            }
            columns.push(col);
        }
        let grid = Self {
            width,
            height,
            blocks,
            columns,
        };
        grid.debug_check_invariants();
        Ok(grid)
    }

    /// Grid with explicit colours, column-major with row 0 first in each column.
    #[cfg(test)]
    pub fn from_columns(colours: Vec<Vec<Colour>>) -> Result<Self, GridError> {
        let width = colours.len();
        let height = colours.first().map_or(0, Vec::len);
        check_dimensions(width, height)?;
        let mut blocks = Vec::with_capacity(width * height);
        let mut columns = Vec::with_capacity(width);
        for (x, col_colours) in colours.into_iter().enumerate() {
            if col_colours.len() != height {
                return Err(GridError::RaggedColumns {
                    column: x,
                    expected: height,
                    found: col_colours.len(),
                });
            }
            let mut col = Vec::with_capacity(height);
            for (y, colour) in col_colours.into_iter().enumerate() {
                col.push(BlockId(blocks.len()));
                blocks.push(Block::with_colour(x, y, colour));
            }
            columns.push(col);
        }
        let grid = Self {
            width,
            height,
            blocks,
            columns,
        };
        grid.debug_check_invariants();
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Block behind an id. Panics if the id does not belong to this grid.
    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    #[inline]
    pub fn block_at(&self, x: usize, y: usize) -> Option<BlockId> {
        self.columns.get(x).and_then(|col| col.get(y)).copied()
    }

    /// Ids in column `x`, bottom row first.
    pub fn column(&self, x: usize) -> &[BlockId] {
        &self.columns[x]
    }

    /// Number of blocks not yet removed.
    pub fn remaining(&self) -> usize {
        self.blocks.iter().filter(|b| !b.removed).count()
    }

    /// In-bounds 4-neighbours in the order left, right, down, up.
    pub fn adjacent_blocks(&self, id: BlockId) -> Vec<BlockId> {
        let block = self.owned(id);
        let (x, y) = (block.x, block.y);
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push(self.columns[x - 1][y]);
        }
        if x + 1 < self.width {
            out.push(self.columns[x + 1][y]);
        }
        if y > 0 {
            out.push(self.columns[x][y - 1]);
        }
        if y + 1 < self.height {
            out.push(self.columns[x][y + 1]);
        }
        out
    }

    /// Every block reachable from `origin` through same-coloured neighbours, `origin` first.
    /// Matches on colour only; the removed flag is not consulted.
    pub fn connected_blocks(&self, origin: BlockId) -> Vec<BlockId> {
        let colour = self.owned(origin).colour;
        let mut visited = vec![false; self.blocks.len()];
        let mut queue = VecDeque::from([origin]);
        visited[origin.0] = true;
        let mut hits = Vec::new();

        while let Some(current) = queue.pop_front() {
            hits.push(current);
            for next in self.adjacent_blocks(current) {
                if !visited[next.0] && self.blocks[next.0].colour == colour {
                    visited[next.0] = true;
                    queue.push_back(next);
                }
            }
        }
        hits
    }

    /// Move removed blocks to the top of their columns, keeping relative order in both groups.
    /// Returns true if any block in the grid is removed.
    pub fn collapse(&mut self) -> bool {
        let mut any_removed = false;
        for x in 0..self.width {
            let (kept, removed): (Vec<BlockId>, Vec<BlockId>) = self.columns[x]
                .iter()
                .partition(|id| !self.blocks[id.0].removed);
            any_removed |= !removed.is_empty();

            let mut settled = kept;
            settled.extend(removed);
            for (y, id) in settled.iter().enumerate() {
                self.blocks[id.0].y = y;
            }
            self.columns[x] = settled;
        }
        self.debug_check_invariants();
        any_removed
    }

    /// Player selects a block: remove its connected group and collapse.
    /// Returns true when the grid changed and needs redrawing.
    pub fn resolve_action(&mut self, id: BlockId) -> bool {
        if self.owned(id).removed {
            return false;
        }
        for hit in self.connected_blocks(id) {
            self.blocks[hit.0].removed = true;
        }
        self.collapse()
    }

    fn owned(&self, id: BlockId) -> &Block {
        let block = &self.blocks[id.0];
        debug_assert_eq!(
            self.columns[block.x][block.y], id,
            "block id does not match its grid slot"
        );
        block
    }

    /// Invariants that hold after construction and after every collapse.
    fn debug_check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        assert_eq!(self.columns.len(), self.width);
        for (x, col) in self.columns.iter().enumerate() {
            assert_eq!(col.len(), self.height, "column {x} changed length");
            for (y, id) in col.iter().enumerate() {
                let b = &self.blocks[id.0];
                assert_eq!((b.x, b.y), (x, y), "stale coordinates for {id:?}");
            }
            assert!(
                col.windows(2)
                    .all(|w| !self.blocks[w[0].0].removed || self.blocks[w[1].0].removed),
                "live block above a removed one in column {x}"
            );
        }
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    Ok(())
}
