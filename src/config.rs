use serde::{Deserialize, Serialize};

use crate::constants::{
    AMBUSH_LOOKAHEAD, CONDITIONAL_FLEE_DISTANCE, DIRECT_CHASE_SPEED_MULTIPLIER, DOT_POINTS,
    FRIGHTENED_DURATION_MS, GHOST_CAPTURE_POINTS, GHOST_SPEED, PELLET_POINTS, PLAYER_SPEED,
    READY_DELAY_MS, STARTING_LIVES, TICK_RATE,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    pub tick_rate: u32,
    pub starting_lives: u32,
    pub player_speed: f32,
    pub ghost_speed: f32,
    pub direct_chase_speed_multiplier: f32,
    pub dot_points: u32,
    pub pellet_points: u32,
    pub ghost_capture_points: u32,
    pub frightened_duration_ms: u64,
    pub ready_delay_ms: u64,
    pub ambush_lookahead: i32,
    pub conditional_flee_distance: i32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            starting_lives: STARTING_LIVES,
            player_speed: PLAYER_SPEED,
            ghost_speed: GHOST_SPEED,
            direct_chase_speed_multiplier: DIRECT_CHASE_SPEED_MULTIPLIER,
            dot_points: DOT_POINTS,
            pellet_points: PELLET_POINTS,
            ghost_capture_points: GHOST_CAPTURE_POINTS,
            frightened_duration_ms: FRIGHTENED_DURATION_MS,
            ready_delay_ms: READY_DELAY_MS,
            ambush_lookahead: AMBUSH_LOOKAHEAD,
            conditional_flee_distance: CONDITIONAL_FLEE_DISTANCE,
        }
    }
}

impl RoundConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(lives) = lookup("MAZE_CHASE_LIVES").and_then(|v| v.trim().parse::<u32>().ok())
        {
            config.starting_lives = lives.max(1);
        }
        if let Some(ms) =
            lookup("MAZE_CHASE_FRIGHTENED_MS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.frightened_duration_ms = ms;
        }
        if let Some(ms) = lookup("MAZE_CHASE_READY_MS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.ready_delay_ms = ms;
        }
        config
    }

    pub fn frightened_duration_secs(&self) -> f64 {
        self.frightened_duration_ms as f64 / 1000.0
    }

    pub fn ready_delay_secs(&self) -> f64 {
        self.ready_delay_ms as f64 / 1000.0
    }
}
