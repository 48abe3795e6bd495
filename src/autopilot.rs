use std::collections::{HashSet, VecDeque};

use crate::types::{Direction, Snapshot, Tile};
use crate::world::Grid;

/// Headless player used by the simulator: walks to the nearest collectible,
/// steering around tiles next to ghosts unless they are frightened.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    danger_radius: i32,
}

impl Autopilot {
    pub fn new(danger_radius: i32) -> Self {
        Self {
            danger_radius: danger_radius.max(0),
        }
    }

    pub fn decide(&self, grid: &Grid, snapshot: &Snapshot) -> Option<Direction> {
        let start = snapshot.player.tile;
        let mut blocked = HashSet::new();
        if !snapshot.frightened {
            for ghost in &snapshot.ghosts {
                for tile in grid.reachable_within(ghost.tile, self.danger_radius) {
                    blocked.insert(tile);
                }
            }
        }
        blocked.remove(&start);

        nearest_collectible_direction(grid, start, &blocked)
            .or_else(|| nearest_collectible_direction(grid, start, &HashSet::new()))
    }
}

fn nearest_collectible_direction(
    grid: &Grid,
    start: Tile,
    blocked: &HashSet<Tile>,
) -> Option<Direction> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    for dir in Direction::PRIORITY {
        let Some(next) = grid.neighbor(start, dir) else {
            continue;
        };
        if blocked.contains(&next) || !seen.insert(next) {
            continue;
        }
        queue.push_back((next, dir));
    }

    while let Some((tile, first_dir)) = queue.pop_front() {
        if grid.cell_kind(tile.col, tile.row).is_collectible() {
            return Some(first_dir);
        }
        for dir in Direction::PRIORITY {
            let Some(next) = grid.neighbor(tile, dir) else {
                continue;
            };
            if blocked.contains(&next) || !seen.insert(next) {
                continue;
            }
            queue.push_back((next, first_dir));
        }
    }
    None
}
