use crate::config::RoundConfig;
use crate::constants::{MAX_PENDING_EVENTS, PLAYER_HOME, PLAYER_START_DIR};
use crate::rng::{RandomSource, Rng};
use crate::types::{
    CellKind, Direction, GhostView, Personality, Phase, PlayerView, RoundEvent, RoundOutcome,
    Snapshot,
};
use crate::world::Grid;

pub mod ghost;
pub mod motion;
pub mod player;
mod utils;

use self::ghost::GhostAgent;
use self::player::PlayerAgent;

fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

/// Round controller: owns the grid, the agents and every piece of round
/// state, and advances them once per `tick`.
#[derive(Clone, Debug)]
pub struct GameEngine<R = Rng> {
    pub config: RoundConfig,
    pub grid: Grid,

    rng: R,
    player: PlayerAgent,
    ghosts: Vec<GhostAgent>,
    events: Vec<RoundEvent>,

    phase: Phase,
    score: u32,
    lives: u32,
    outcome: Option<RoundOutcome>,
    frightened_until: Option<f64>,
    frightened_active: bool,
    clock: f64,
    ready_since: f64,
    tick_counter: u64,
}

impl GameEngine<Rng> {
    pub fn new(config: RoundConfig, seed: u32) -> Self {
        Self::with_random(config, Rng::new(seed))
    }
}

impl<R: RandomSource> GameEngine<R> {
    pub fn with_random(config: RoundConfig, rng: R) -> Self {
        let ghosts = Personality::ALL
            .iter()
            .enumerate()
            .map(|(id, personality)| GhostAgent::new(id, *personality))
            .collect();
        Self::with_parts(
            config,
            Grid::new(),
            PlayerAgent::new(PLAYER_HOME, PLAYER_START_DIR),
            ghosts,
            rng,
        )
    }

    pub fn with_parts(
        config: RoundConfig,
        grid: Grid,
        player: PlayerAgent,
        ghosts: Vec<GhostAgent>,
        rng: R,
    ) -> Self {
        let lives = config.starting_lives;
        Self {
            config,
            grid,
            rng,
            player,
            ghosts,
            events: Vec::new(),
            phase: Phase::Title,
            score: 0,
            lives,
            outcome: None,
            frightened_until: None,
            frightened_active: false,
            clock: 0.0,
            ready_since: 0.0,
            tick_counter: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn now_secs(&self) -> f64 {
        self.clock
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened_at(self.clock)
    }

    pub fn player(&self) -> &PlayerAgent {
        &self.player
    }

    pub fn ghosts(&self) -> &[GhostAgent] {
        &self.ghosts
    }

    pub fn request_direction(&mut self, dir: Direction) {
        self.player.request_direction(dir);
    }

    /// `title -> ready`. The round is already fresh, so nothing is reset.
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::Title {
            return false;
        }
        self.enter_ready();
        true
    }

    /// `over -> ready` with a full reset.
    pub fn restart(&mut self) -> bool {
        if self.phase != Phase::Over {
            return false;
        }
        self.reset_round();
        self.enter_ready();
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.tick_counter += 1;
        self.clock += dt as f64;

        match self.phase {
            Phase::Title | Phase::Over => {}
            Phase::Ready => {
                if self.clock - self.ready_since >= self.config.ready_delay_secs() {
                    self.set_phase(Phase::Playing);
                }
            }
            Phase::Playing => self.tick_playing(dt),
        }
    }

    fn tick_playing(&mut self, dt: f32) {
        let now = self.clock;

        let step = self.player.update(&mut self.grid, dt, &self.config);
        if let Some((tile, kind)) = step.eaten {
            let event = if kind == CellKind::PowerPellet {
                RoundEvent::PelletEaten {
                    col: tile.col,
                    row: tile.row,
                    points: step.points,
                }
            } else {
                RoundEvent::DotEaten {
                    col: tile.col,
                    row: tile.row,
                    points: step.points,
                }
            };
            self.push_event(event);
        }
        self.score = self.score.saturating_add(step.points);
        if step.pellet_eaten {
            let until = now + self.config.frightened_duration_secs();
            self.frightened_until = Some(until);
            self.push_event(RoundEvent::FrightenedStarted {
                until_ms: secs_to_ms(until),
            });
        }
        if step.eaten.is_some() && self.grid.remaining_collectibles() == 0 {
            self.outcome = Some(RoundOutcome::Cleared);
            self.push_event(RoundEvent::MazeCleared);
            self.set_phase(Phase::Over);
            return;
        }

        let frightened = self.frightened_at(now);
        if self.frightened_active && !frightened {
            self.push_event(RoundEvent::FrightenedEnded);
        }
        self.frightened_active = frightened;

        self.resolve_collisions(frightened);
        if self.phase != Phase::Playing {
            return;
        }

        let player_tile = self.player.mover.tile;
        let player_dir = self.player.mover.dir;
        for ghost in &mut self.ghosts {
            ghost.update(
                &self.grid,
                player_tile,
                player_dir,
                frightened,
                dt,
                &self.config,
                &mut self.rng,
            );
        }
    }

    fn resolve_collisions(&mut self, frightened: bool) {
        let player_tile = self.player.mover.tile;
        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].mover.tile != player_tile {
                continue;
            }
            if frightened {
                let points = self.config.ghost_capture_points;
                self.score = self.score.saturating_add(points);
                self.ghosts[idx].send_home();
                self.push_event(RoundEvent::GhostCaptured {
                    ghost_id: self.ghosts[idx].id,
                    personality: self.ghosts[idx].personality,
                    points,
                });
                continue;
            }

            self.lives = self.lives.saturating_sub(1);
            self.player.reset();
            self.push_event(RoundEvent::LifeLost {
                ghost_id: self.ghosts[idx].id,
                lives: self.lives,
            });
            if self.lives == 0 {
                self.outcome = Some(RoundOutcome::Caught);
                self.set_phase(Phase::Over);
            }
            break;
        }
    }

    fn frightened_at(&self, now: f64) -> bool {
        self.frightened_until
            .map(|until| now < until)
            .unwrap_or(false)
    }

    fn enter_ready(&mut self) {
        self.ready_since = self.clock;
        self.set_phase(Phase::Ready);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        self.phase = phase;
        self.push_event(RoundEvent::PhaseChanged { phase });
    }

    fn push_event(&mut self, event: RoundEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    fn reset_round(&mut self) {
        self.events.clear();
        self.grid.reset();
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.outcome = None;
        self.frightened_until = None;
        self.frightened_active = false;
        self.player.reset();
        for ghost in &mut self.ghosts {
            ghost.send_home();
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let frightened = self.is_frightened();
        let frightened_remaining_ms = match self.frightened_until {
            Some(until) if frightened => secs_to_ms(until - self.clock),
            _ => 0,
        };
        let mover = &self.player.mover;
        let snapshot = Snapshot {
            tick: self.tick_counter,
            now_ms: secs_to_ms(self.clock),
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            frightened,
            frightened_remaining_ms,
            outcome: self.outcome,
            remaining_collectibles: self.grid.remaining_collectibles(),
            player: PlayerView {
                tile: mover.tile,
                pos: mover.pos,
                dir: mover.dir,
                queued_dir: self.player.queued_dir,
                moving: mover.has_target(),
            },
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| GhostView {
                    id: ghost.id,
                    personality: ghost.personality,
                    tile: ghost.mover.tile,
                    pos: ghost.mover.pos,
                    dir: ghost.mover.dir,
                    home: ghost.mover.home(),
                })
                .collect(),
            grid: self.grid.to_view(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }
}
