use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use crate::constants::{LAYOUT, TILE_SIZE, TUNNEL_ROWS};
use crate::types::{CellKind, Direction, GridView, Tile};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} is {width} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("unknown symbol {symbol:?} at column {col}, row {row}")]
    UnknownSymbol { symbol: char, col: usize, row: usize },
    #[error("tunnel row {row} is outside the layout")]
    TunnelOutOfBounds { row: i32 },
}

/// Static walkability map plus the mutable collectible state of one maze.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    initial: Vec<CellKind>,
    cells: Vec<CellKind>,
    tunnel_rows: Vec<i32>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// The fixed maze. Unknown symbols cannot occur here; the layout is
    /// checked by `fixed_layout_parses_cleanly`.
    pub fn new() -> Self {
        let rows: Vec<Vec<CellKind>> = LAYOUT
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| CellKind::from_symbol(c).unwrap_or(CellKind::Wall))
                    .collect()
            })
            .collect();
        Self::from_rows(rows, TUNNEL_ROWS.to_vec())
    }

    pub fn parse(rows: &[&str], tunnel_rows: &[i32]) -> Result<Self, LayoutError> {
        let Some(first) = rows.first() else {
            return Err(LayoutError::Empty);
        };
        let expected = first.chars().count();
        if expected == 0 {
            return Err(LayoutError::Empty);
        }

        let mut parsed = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let width = row.chars().count();
            if width != expected {
                return Err(LayoutError::RaggedRow {
                    row: row_idx,
                    width,
                    expected,
                });
            }
            let mut cells = Vec::with_capacity(width);
            for (col_idx, symbol) in row.chars().enumerate() {
                let kind = CellKind::from_symbol(symbol).ok_or(LayoutError::UnknownSymbol {
                    symbol,
                    col: col_idx,
                    row: row_idx,
                })?;
                cells.push(kind);
            }
            parsed.push(cells);
        }

        for &row in tunnel_rows {
            if row < 0 || row as usize >= rows.len() {
                return Err(LayoutError::TunnelOutOfBounds { row });
            }
        }
        Ok(Self::from_rows(parsed, tunnel_rows.to_vec()))
    }

    fn from_rows(rows: Vec<Vec<CellKind>>, tunnel_rows: Vec<i32>) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let pad = width as usize - row.len();
            cells.extend(row);
            cells.extend(std::iter::repeat(CellKind::Wall).take(pad));
        }
        Self {
            width,
            height,
            initial: cells.clone(),
            cells,
            tunnel_rows,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.width && row < self.height
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if !self.in_bounds(col, row) {
            return None;
        }
        Some((row * self.width + col) as usize)
    }

    /// Out-of-bounds coordinates read as walls.
    pub fn cell_kind(&self, col: i32, row: i32) -> CellKind {
        self.index(col, row)
            .map(|idx| self.cells[idx])
            .unwrap_or(CellKind::Wall)
    }

    pub fn set_cell_kind(&mut self, col: i32, row: i32, kind: CellKind) -> bool {
        let Some(idx) = self.index(col, row) else {
            return false;
        };
        self.cells[idx] = kind;
        true
    }

    /// In bounds and not a wall. Tunnel transit is resolved by the mover,
    /// never here.
    pub fn is_walkable(&self, col: i32, row: i32) -> bool {
        self.index(col, row)
            .map(|idx| self.cells[idx] != CellKind::Wall)
            .unwrap_or(false)
    }

    pub fn is_walkable_tile(&self, tile: Tile) -> bool {
        self.is_walkable(tile.col, tile.row)
    }

    /// Gates are one-way: they can be crossed upward but never entered
    /// moving down.
    pub fn gate_blocks(&self, tile: Tile, dir: Direction) -> bool {
        dir == Direction::Down && self.cell_kind(tile.col, tile.row) == CellKind::Gate
    }

    pub fn is_tunnel_row(&self, row: i32) -> bool {
        self.tunnel_rows.contains(&row)
    }

    pub fn tunnel_rows(&self) -> &[i32] {
        &self.tunnel_rows
    }

    pub fn reset(&mut self) {
        self.cells.clone_from(&self.initial);
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.cells.iter().filter(|kind| kind.is_collectible()).count()
    }

    pub fn collectibles(&self) -> Vec<(Tile, CellKind)> {
        let mut out = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let kind = self.cell_kind(col, row);
                if kind.is_collectible() {
                    out.push((Tile::new(col, row), kind));
                }
            }
        }
        out
    }

    /// Adjacent walkable tile for graph searches, with tunnel exits already
    /// wrapped to the opposite boundary.
    pub fn neighbor(&self, tile: Tile, dir: Direction) -> Option<Tile> {
        let next = tile.step(dir);
        if self.is_walkable_tile(next) {
            return (!self.gate_blocks(next, dir)).then_some(next);
        }
        if !dir.is_horizontal() || !self.is_tunnel_row(tile.row) {
            return None;
        }
        let wrapped_col = if next.col == -1 && tile.col == 0 {
            self.width - 1
        } else if next.col == self.width && tile.col == self.width - 1 {
            0
        } else {
            return None;
        };
        let wrapped = Tile::new(wrapped_col, tile.row);
        self.is_walkable_tile(wrapped).then_some(wrapped)
    }

    pub fn reachable_from(&self, start: Tile) -> HashSet<Tile> {
        let mut out = HashSet::new();
        if !self.is_walkable_tile(start) {
            return out;
        }
        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);
        while let Some(tile) = queue.pop_front() {
            for dir in Direction::PRIORITY {
                let Some(next) = self.neighbor(tile, dir) else {
                    continue;
                };
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// Tiles reachable from `start` in at most `radius` steps, tunnel-aware.
    pub fn reachable_within(&self, start: Tile, radius: i32) -> Vec<Tile> {
        let mut out = vec![start];
        let mut seen = HashSet::from([start]);
        let mut frontier = vec![start];
        for _ in 0..radius {
            let mut next_frontier = Vec::new();
            for tile in frontier {
                for dir in Direction::PRIORITY {
                    let Some(next) = self.neighbor(tile, dir) else {
                        continue;
                    };
                    if seen.insert(next) {
                        out.push(next);
                        next_frontier.push(next);
                    }
                }
            }
            frontier = next_frontier;
        }
        out
    }

    pub fn to_view(&self) -> GridView {
        let cells = (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| self.cell_kind(col, row).symbol())
                    .collect::<String>()
            })
            .collect();
        GridView {
            width: self.width,
            height: self.height,
            tile_size: TILE_SIZE,
            tunnel_rows: self.tunnel_rows.clone(),
            cells,
        }
    }
}
