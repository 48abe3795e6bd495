use chrono::Utc;
use clap::Parser;
use maze_chase::autopilot::Autopilot;
use maze_chase::config::RoundConfig;
use maze_chase::constants::{NOMINAL_DT, TICK_RATE, TILE_SIZE};
use maze_chase::engine::motion::tile_center;
use maze_chase::engine::GameEngine;
use maze_chase::types::{Phase, RoundEvent, RoundOutcome, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs headless autopilot rounds and reports anomalies")]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3)]
    rounds: u32,
    #[arg(long)]
    lives: Option<u32>,
    #[arg(long, default_value_t = 300)]
    max_seconds: u32,
    #[arg(long, default_value_t = 2)]
    danger_radius: i32,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct Scenario {
    name: String,
    seed: u32,
    config: RoundConfig,
    max_ticks: u64,
    danger_radius: i32,
}

#[derive(Clone, Debug, Serialize)]
struct RoundResultLine {
    scenario: String,
    seed: u32,
    outcome: Option<RoundOutcome>,
    score: u32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "dotsEaten")]
    dots_eaten: u32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "ghostsCaptured")]
    ghosts_captured: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "remainingCollectibles")]
    remaining_collectibles: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RoundRunResult {
    result: RoundResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "roundCount")]
    round_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    rounds: Vec<RoundResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Counters gathered from drained round events.
#[derive(Clone, Debug, Default)]
struct EventTally {
    dots_eaten: u32,
    pellets_eaten: u32,
    ghosts_captured: u32,
    lives_lost: u32,
}

impl EventTally {
    fn record(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::DotEaten { .. } => self.dots_eaten += 1,
            RoundEvent::PelletEaten { .. } => self.pellets_eaten += 1,
            RoundEvent::GhostCaptured { .. } => self.ghosts_captured += 1,
            RoundEvent::LifeLost { .. } => self.lives_lost += 1,
            _ => {}
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let started_at = Utc::now().to_rfc3339();
    let scenarios = resolve_scenarios(&cli, RoundConfig::from_env());
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));
    let mut has_anomaly = false;
    let mut round_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "round_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "startingLives": scenario.config.starting_lives,
                "maxTicks": scenario.max_ticks,
            }),
        );
        let run = run_round(&scenario);

        for anomaly in &run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }

        if !run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "round_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(run.finished_tick),
            json!({
                "outcome": run.result.outcome,
                "score": run.result.score,
                "durationMs": run.result.duration_ms,
                "anomalyCount": run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        round_results.push(run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        Utc::now().to_rfc3339(),
        round_results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "roundCount": summary.round_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_round(scenario: &Scenario) -> RoundRunResult {
    let mut engine = GameEngine::new(scenario.config.clone(), scenario.seed);
    let pilot = Autopilot::new(scenario.danger_radius);
    let mut tally = EventTally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_score = 0u32;
    let mut last_tick;

    engine.begin();
    loop {
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;
        for event in &snapshot.events {
            tally.record(event);
        }
        for message in collect_snapshot_anomalies(&snapshot, last_score) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = snapshot.score;

        if snapshot.phase == Phase::Over {
            break;
        }
        if snapshot.tick >= scenario.max_ticks {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                "tick safety limit exceeded".to_string(),
            );
            break;
        }

        if snapshot.phase == Phase::Playing {
            if let Some(dir) = pilot.decide(&engine.grid, &snapshot) {
                engine.request_direction(dir);
            }
        }
        engine.tick(NOMINAL_DT);
    }

    let remaining_collectibles = engine.grid.remaining_collectibles();
    RoundRunResult {
        result: RoundResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            outcome: engine.outcome(),
            score: engine.score(),
            duration_ms: (engine.now_secs() * 1000.0).round() as u64,
            dots_eaten: tally.dots_eaten,
            pellets_eaten: tally.pellets_eaten,
            ghosts_captured: tally.ghosts_captured,
            lives_lost: tally.lives_lost,
            remaining_collectibles,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, previous_score: u32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.score < previous_score {
        anomalies.push(format!(
            "score decreased: {previous_score} -> {}",
            snapshot.score
        ));
    }

    let width = snapshot.grid.width;
    let height = snapshot.grid.height;
    let in_bounds = |col: i32, row: i32| col >= 0 && col < width && row >= 0 && row < height;

    let player = &snapshot.player;
    if !in_bounds(player.tile.col, player.tile.row) {
        anomalies.push(format!(
            "player tile out of bounds: ({}, {})",
            player.tile.col, player.tile.row
        ));
    }
    if !player.moving && player.pos != tile_center(player.tile) {
        anomalies.push(format!(
            "idle player off tile center: ({}, {})",
            player.tile.col, player.tile.row
        ));
    }

    for ghost in &snapshot.ghosts {
        if !in_bounds(ghost.tile.col, ghost.tile.row) {
            anomalies.push(format!(
                "ghost {} tile out of bounds: ({}, {})",
                ghost.id, ghost.tile.col, ghost.tile.row
            ));
        }
        let center = tile_center(ghost.tile);
        if (ghost.pos.x - center.x).abs() > TILE_SIZE || (ghost.pos.y - center.y).abs() > TILE_SIZE
        {
            anomalies.push(format!("ghost {} drifted from its tile", ghost.id));
        }
    }

    if snapshot.lives == 0 && snapshot.phase != Phase::Over {
        anomalies.push("no lives left but round still running".to_string());
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli, base: RoundConfig) -> Vec<Scenario> {
    let seed = normalize_seed(
        cli.seed
            .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs()),
    );
    let mut config = base;
    if let Some(lives) = cli.lives {
        config.starting_lives = lives.max(1);
    }
    let max_ticks = u64::from(cli.max_seconds.max(1)) * u64::from(TICK_RATE);

    (0..cli.rounds.max(1))
        .map(|index| Scenario {
            name: format!("autopilot-{}", index + 1),
            seed: normalize_seed(u64::from(seed).wrapping_add(u64::from(index))),
            config: config.clone(),
            max_ticks,
            danger_radius: cli.danger_radius,
        })
        .collect()
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    rounds: Vec<RoundResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let round_count = rounds.len();
    let total_score: u64 = rounds.iter().map(|round| u64::from(round.score)).sum();
    let average_score = if round_count == 0 {
        0
    } else {
        (total_score / round_count as u64) as u32
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        round_count,
        anomaly_count,
        average_score,
        outcome_counts,
        rounds,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: Utc::now().to_rfc3339(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn outcome_key(outcome: Option<RoundOutcome>) -> String {
    match outcome {
        Some(RoundOutcome::Caught) => "caught",
        Some(RoundOutcome::Cleared) => "cleared",
        None => "unfinished",
    }
    .to_string()
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}
