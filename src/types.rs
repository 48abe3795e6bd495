use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order used whenever directions are compared; the first
    /// minimal candidate in this order wins a distance tie.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tile {
    pub col: i32,
    pub row: i32,
}

impl Tile {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    pub fn offset(self, dir: Direction, steps: i32) -> Self {
        let (dc, dr) = dir.delta();
        Self {
            col: self.col + dc * steps,
            row: self.row + dr * steps,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Empty,
    Wall,
    Dot,
    PowerPellet,
    Gate,
}

impl CellKind {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            ' ' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            '.' => Some(Self::Dot),
            'o' => Some(Self::PowerPellet),
            '-' => Some(Self::Gate),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Wall => '#',
            Self::Dot => '.',
            Self::PowerPellet => 'o',
            Self::Gate => '-',
        }
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Self::Dot | Self::PowerPellet)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    DirectChase,
    Ambush,
    Erratic,
    Conditional,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::DirectChase,
        Personality::Ambush,
        Personality::Erratic,
        Personality::Conditional,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Title,
    Ready,
    Playing,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Caught,
    Cleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub tile: Tile,
    pub pos: Vec2,
    pub dir: Direction,
    #[serde(rename = "queuedDir")]
    pub queued_dir: Option<Direction>,
    pub moving: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub personality: Personality,
    pub tile: Tile,
    pub pos: Vec2,
    pub dir: Direction,
    pub home: Tile,
}

#[derive(Clone, Debug, Serialize)]
pub struct GridView {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: f32,
    #[serde(rename = "tunnelRows")]
    pub tunnel_rows: Vec<i32>,
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    DotEaten {
        col: i32,
        row: i32,
        points: u32,
    },
    PelletEaten {
        col: i32,
        row: i32,
        points: u32,
    },
    FrightenedStarted {
        #[serde(rename = "untilMs")]
        until_ms: u64,
    },
    FrightenedEnded,
    GhostCaptured {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        personality: Personality,
        points: u32,
    },
    LifeLost {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        lives: u32,
    },
    MazeCleared,
    PhaseChanged {
        phase: Phase,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub frightened: bool,
    #[serde(rename = "frightenedRemainingMs")]
    pub frightened_remaining_ms: u64,
    pub outcome: Option<RoundOutcome>,
    #[serde(rename = "remainingCollectibles")]
    pub remaining_collectibles: usize,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub grid: GridView,
    pub events: Vec<RoundEvent>,
}
