use crate::config::RoundConfig;
use crate::engine::motion::Mover;
use crate::types::{CellKind, Direction, Tile};
use crate::world::Grid;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerStep {
    pub points: u32,
    pub pellet_eaten: bool,
    pub eaten: Option<(Tile, CellKind)>,
}

#[derive(Clone, Debug)]
pub struct PlayerAgent {
    pub mover: Mover,
    pub queued_dir: Option<Direction>,
}

impl PlayerAgent {
    pub fn new(home: Tile, dir: Direction) -> Self {
        Self {
            mover: Mover::new(home, dir),
            queued_dir: None,
        }
    }

    pub fn request_direction(&mut self, dir: Direction) {
        self.queued_dir = Some(dir);
    }

    pub fn reset(&mut self) {
        self.mover.reset();
        self.queued_dir = None;
    }

    pub fn update(&mut self, grid: &mut Grid, dt: f32, config: &RoundConfig) -> PlayerStep {
        if dt <= 0.0 {
            return PlayerStep::default();
        }

        if !self.mover.has_target() {
            let committed_queued = match self.queued_dir {
                Some(dir) => self.mover.try_commit(grid, dir),
                None => false,
            };
            if committed_queued {
                self.queued_dir = None;
            } else {
                let facing = self.mover.dir;
                if !self.mover.try_commit(grid, facing) {
                    return PlayerStep::default();
                }
            }
        }

        if !self.mover.advance(grid.width(), dt, config.player_speed) {
            return PlayerStep::default();
        }
        self.consume(grid, config)
    }

    fn consume(&mut self, grid: &mut Grid, config: &RoundConfig) -> PlayerStep {
        let tile = self.mover.tile;
        let kind = grid.cell_kind(tile.col, tile.row);
        let points = match kind {
            CellKind::Dot => config.dot_points,
            CellKind::PowerPellet => config.pellet_points,
            _ => return PlayerStep::default(),
        };
        grid.set_cell_kind(tile.col, tile.row, CellKind::Empty);
        PlayerStep {
            points,
            pellet_eaten: kind == CellKind::PowerPellet,
            eaten: Some((tile, kind)),
        }
    }
}
