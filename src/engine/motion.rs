use crate::constants::TILE_SIZE;
use crate::types::{Direction, Tile, Vec2};
use crate::world::Grid;

pub fn tile_center(tile: Tile) -> Vec2 {
    Vec2 {
        x: (tile.col as f32 + 0.5) * TILE_SIZE,
        y: (tile.row as f32 + 0.5) * TILE_SIZE,
    }
}

/// Tile-to-tile movement shared by the player and every ghost.
///
/// `target`, when set, is exactly one step from `tile`. On tunnel rows it may
/// be a sentinel one column past either boundary; the column wraps on arrival.
#[derive(Clone, Debug)]
pub struct Mover {
    pub tile: Tile,
    pub pos: Vec2,
    pub dir: Direction,
    pub target: Option<Tile>,
    home: Tile,
    home_dir: Direction,
}

impl Mover {
    pub fn new(home: Tile, dir: Direction) -> Self {
        Self {
            tile: home,
            pos: tile_center(home),
            dir,
            target: None,
            home,
            home_dir: dir,
        }
    }

    pub fn home(&self) -> Tile {
        self.home
    }

    pub fn reset(&mut self) {
        self.tile = self.home;
        self.pos = tile_center(self.home);
        self.dir = self.home_dir;
        self.target = None;
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Tile a step in `dir` would commit to, or `None` when blocked. Gates
    /// only admit upward steps. A tunnel exit needs a tunnel row, the mover on the matching boundary column and
    /// a walkable cell on the opposite boundary.
    pub fn resolve_step(&self, grid: &Grid, dir: Direction) -> Option<Tile> {
        let next = self.tile.step(dir);
        if grid.is_walkable_tile(next) {
            return (!grid.gate_blocks(next, dir)).then_some(next);
        }
        if !dir.is_horizontal() || !grid.is_tunnel_row(self.tile.row) {
            return None;
        }
        let width = grid.width();
        let exits_left = next.col == -1 && self.tile.col == 0;
        let exits_right = next.col == width && self.tile.col == width - 1;
        let opposite_col = if exits_left {
            width - 1
        } else if exits_right {
            0
        } else {
            return None;
        };
        grid.is_walkable(opposite_col, self.tile.row).then_some(next)
    }

    pub fn commit(&mut self, dir: Direction, target: Tile) {
        self.dir = dir;
        self.target = Some(target);
    }

    pub fn try_commit(&mut self, grid: &Grid, dir: Direction) -> bool {
        let Some(target) = self.resolve_step(grid, dir) else {
            return false;
        };
        self.commit(dir, target);
        true
    }

    /// Moves toward the committed target by `speed * dt` and reports arrival.
    pub fn advance(&mut self, grid_width: i32, dt: f32, speed: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let center = tile_center(target);
        let dx = center.x - self.pos.x;
        let dy = center.y - self.pos.y;
        let remaining = (dx * dx + dy * dy).sqrt();
        let travel = speed * dt;

        if remaining <= 0.0 || travel >= remaining {
            let col = if target.col < 0 {
                grid_width - 1
            } else if target.col >= grid_width {
                0
            } else {
                target.col
            };
            let landed = Tile::new(col, target.row);
            self.tile = landed;
            self.pos = tile_center(landed);
            self.target = None;
            return true;
        }

        self.pos.x += dx / remaining * travel;
        self.pos.y += dy / remaining * travel;
        false
    }
}
