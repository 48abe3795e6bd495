use crate::types::{Direction, Personality, Tile};

pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;
pub const NOMINAL_DT: f32 = 1.0 / TICK_RATE as f32;

pub const TILE_SIZE: f32 = 16.0;

/// Undrained round events kept before the oldest are dropped.
pub const MAX_PENDING_EVENTS: usize = 512;

pub const STARTING_LIVES: u32 = 3;
pub const READY_DELAY_MS: u64 = 2_000;
pub const FRIGHTENED_DURATION_MS: u64 = 6_000;

pub const PLAYER_SPEED: f32 = 80.0;
pub const GHOST_SPEED: f32 = 72.0;
pub const DIRECT_CHASE_SPEED_MULTIPLIER: f32 = 1.125;

pub const DOT_POINTS: u32 = 10;
pub const PELLET_POINTS: u32 = 50;
pub const GHOST_CAPTURE_POINTS: u32 = 200;

pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const CONDITIONAL_FLEE_DISTANCE: i32 = 8;

pub const TUNNEL_ROWS: [i32; 1] = [9];

pub const LAYOUT: [&str; 21] = [
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "   #.#       #.#   ",
    "####.# ##-## #.####",
    "    .  #   #  .    ",
    "####.# ##### #.####",
    "   #.#       #.#   ",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#..... .....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub const PLAYER_HOME: Tile = Tile::new(9, 15);
pub const PLAYER_START_DIR: Direction = Direction::Left;

/// Ghost homes sit in the corridor above the pen gate. The gate only lets
/// movers through upward, so nothing ever re-enters the pen.
pub fn ghost_home(personality: Personality) -> (Tile, Direction) {
    match personality {
        Personality::DirectChase => (Tile::new(9, 7), Direction::Left),
        Personality::Ambush => (Tile::new(10, 7), Direction::Right),
        Personality::Erratic => (Tile::new(8, 7), Direction::Left),
        Personality::Conditional => (Tile::new(11, 7), Direction::Right),
    }
}

/// Corner the conditional adversary retreats to when close to the player.
pub fn flee_corner(height: i32) -> Tile {
    Tile::new(0, height - 1)
}
