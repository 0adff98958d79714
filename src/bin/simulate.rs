use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use pacstudent_core::constants::{TICK_MS, TICK_RATE};
use pacstudent_core::engine::{GameEngine, GameEngineOptions};
use pacstudent_core::events::GameEvent;
use pacstudent_core::high_score::HighScoreStore;
use pacstudent_core::maze::{Maze, DEFAULT_LAYOUT};
use pacstudent_core::types::{
    Cell, Direction, FeedbackKind, GameOverReason, GhostState, Snapshot,
};
use serde::Serialize;
use serde_json::{json, Value};

const HIGH_SCORE_ENV: &str = "PACSTUDENT_HIGH_SCORE_PATH";
const DEFAULT_TICKS: u64 = TICK_RATE as u64 * 60 * 5;

/// Runs one headless round and prints a JSON result line.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    /// Tick budget before the run is cut off.
    #[arg(long)]
    ticks: Option<u64>,
    /// ASCII layout file; the built-in maze when absent.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Steer the player toward the nearest collectible.
    #[arg(long)]
    autopilot: bool,
    #[arg(long)]
    high_score: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize)]
struct RunResultLine {
    seed: u32,
    ticks: u64,
    reason: Option<GameOverReason>,
    score: u32,
    lives: u32,
    collected: u32,
    #[serde(rename = "totalCollectibles")]
    total_collectibles: u32,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: u64,
    #[serde(rename = "highScore")]
    high_score: u32,
    #[serde(rename = "powerUps")]
    power_ups: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    deaths: u32,
    bananas: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    result: RunResultLine,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    seed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_started_at_ms = now_ms();

    let maze = match load_maze(cli.layout.as_deref()) {
        Ok(maze) => maze,
        Err(message) => {
            emit_log("error", "layout_load_failed", seed, None, json!({ "error": message }));
            std::process::exit(2);
        }
    };

    let high_score_path = cli
        .high_score
        .clone()
        .or_else(|| std::env::var_os(HIGH_SCORE_ENV).map(PathBuf::from));
    let store = match high_score_path {
        Some(path) => match HighScoreStore::try_open(path) {
            Ok(store) => store,
            Err(error) => {
                emit_log(
                    "error",
                    "high_score_load_failed",
                    seed,
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        },
        None => HighScoreStore::in_memory(0),
    };

    let mut engine = GameEngine::new(
        maze,
        GameEngineOptions {
            seed,
            ..GameEngineOptions::default()
        },
    )
    .with_high_score(store);

    emit_log(
        "info",
        "run_started",
        seed,
        None,
        json!({
            "autopilot": cli.autopilot,
            "config": engine.config,
            "highScore": engine.high_score(),
        }),
    );

    let (result, anomaly_records) =
        run_round(&mut engine, seed, cli.ticks.unwrap_or(DEFAULT_TICKS), cli.autopilot);

    for anomaly in &anomaly_records {
        emit_log(
            "warn",
            "anomaly_detected",
            seed,
            Some(anomaly.tick),
            json!({ "message": anomaly.message }),
        );
    }

    println!(
        "{}",
        serde_json::to_string(&result).unwrap_or_else(|error| format!(
            r#"{{"error":"result serialization failed: {error}"}}"#
        ))
    );

    if let Some(path) = cli.summary_out.as_ref() {
        let summary = RunSummary {
            started_at_ms: run_started_at_ms,
            finished_at_ms: now_ms(),
            anomaly_records: anomaly_records.clone(),
            result: result.clone(),
        };
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                seed,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    }

    emit_log(
        "info",
        "run_finished",
        seed,
        Some(result.ticks),
        json!({
            "reason": result.reason,
            "score": result.score,
            "anomalyCount": anomaly_records.len(),
        }),
    );

    if !result.anomalies.is_empty() {
        std::process::exit(1);
    }
}

fn load_maze(path: Option<&Path>) -> Result<Maze, String> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|error| format!("failed to read {}: {error}", path.display()))?,
        None => DEFAULT_LAYOUT.to_string(),
    };
    Maze::parse(&text).map_err(|error| error.to_string())
}

fn run_round(
    engine: &mut GameEngine,
    seed: u32,
    max_ticks: u64,
    autopilot: bool,
) -> (RunResultLine, Vec<AnomalyRecord>) {
    let mut line = RunResultLine {
        seed,
        ..RunResultLine::default()
    };
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_score = 0;

    engine.start_round();
    while !engine.is_ended() && engine.tick() < max_ticks {
        if autopilot && !engine.player().in_transit() {
            if let Some(dir) = autopilot_direction(engine) {
                engine.set_requested_direction(dir);
            }
        }
        engine.step(TICK_MS);
        let snapshot = engine.build_snapshot(true);

        for message in collect_snapshot_anomalies(engine.maze(), &snapshot, last_score) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = snapshot.round.score;

        for event in &snapshot.events {
            match event {
                GameEvent::Feedback {
                    kind: FeedbackKind::PowerPellet,
                } => line.power_ups += 1,
                GameEvent::Feedback {
                    kind: FeedbackKind::Banana,
                } => line.bananas += 1,
                GameEvent::Feedback {
                    kind: FeedbackKind::Death,
                } => line.deaths += 1,
                GameEvent::GhostStateChanged {
                    state: GhostState::Dead,
                    ..
                } => line.ghosts_eaten += 1,
                _ => {}
            }
        }
    }

    let round = engine.round();
    line.ticks = engine.tick();
    line.reason = round.end_reason;
    line.score = round.score;
    line.lives = round.lives;
    line.collected = round.collected;
    line.total_collectibles = round.total_collectibles;
    line.elapsed_ms = round.elapsed_ms;
    line.high_score = engine.high_score();
    line.anomalies = anomalies;
    (line, anomaly_records)
}

/// First step of the shortest path to the nearest remaining collectible,
/// routing around cells next to walking ghosts.
fn autopilot_direction(engine: &GameEngine) -> Option<Direction> {
    let maze = engine.maze();
    let start = engine.player().cell();
    let danger: HashSet<Cell> = engine
        .ghosts()
        .iter()
        .filter(|ghost| ghost.state() == GhostState::Walking)
        .flat_map(|ghost| {
            let cell = ghost.position().nearest_cell();
            std::iter::once(cell).chain(Direction::ALL.into_iter().map(move |dir| cell.step(dir)))
        })
        .collect();

    let mut first_step: BTreeMap<Cell, Direction> = BTreeMap::new();
    let mut queue = VecDeque::new();
    let mut visited = HashSet::from([start]);
    for dir in Direction::ALL {
        let next = start.step(dir);
        if maze.is_walkable(next) && !danger.contains(&next) && visited.insert(next) {
            first_step.insert(next, dir);
            queue.push_back(next);
        }
    }

    while let Some(cell) = queue.pop_front() {
        let dir = *first_step.get(&cell)?;
        if engine.collectibles().contains_key(&cell) {
            return Some(dir);
        }
        for step in Direction::ALL {
            let next = cell.step(step);
            if maze.is_walkable(next) && !danger.contains(&next) && visited.insert(next) {
                first_step.insert(next, dir);
                queue.push_back(next);
            }
        }
    }
    None
}

fn collect_snapshot_anomalies(maze: &Maze, snapshot: &Snapshot, last_score: u32) -> Vec<String> {
    let mut anomalies = Vec::new();
    let player_cell = Cell::new(snapshot.player.x.round() as i32, snapshot.player.y.round() as i32);
    if maze.is_wall(player_cell) {
        anomalies.push(format!(
            "player inside wall at ({:.2}, {:.2})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    if snapshot.round.score < last_score {
        anomalies.push(format!(
            "score decreased from {last_score} to {}",
            snapshot.round.score
        ));
    }
    if snapshot.round.collected > snapshot.round.total_collectibles {
        anomalies.push(format!(
            "collected {} of {} collectibles",
            snapshot.round.collected, snapshot.round.total_collectibles
        ));
    }
    for ghost in &snapshot.ghosts {
        let cell = Cell::new(ghost.x.round() as i32, ghost.y.round() as i32);
        if ghost.state != GhostState::Dead && maze.is_wall(cell) {
            anomalies.push(format!("ghost {} inside wall", ghost.id));
        }
    }
    anomalies
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

fn emit_log(level: &str, event: &str, seed: u32, tick: Option<u64>, details: Value) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        seed,
        tick,
        details,
    };
    if let Ok(text) = serde_json::to_string(&log_line) {
        eprintln!("{text}");
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_for(layout: &str) -> GameEngine {
        GameEngine::new(
            Maze::parse(layout).expect("valid layout"),
            GameEngineOptions {
                seed: 11,
                ..GameEngineOptions::default()
            },
        )
    }

    #[test]
    fn autopilot_heads_for_nearest_collectible() {
        let engine = engine_for(
            "\
#######
#.#P..#
#.###.#
#.....#
#######",
        );
        assert_eq!(autopilot_direction(&engine), Some(Direction::Right));
    }

    #[test]
    fn autopilot_gives_up_when_nothing_is_reachable() {
        let engine = engine_for(
            "\
######
#P#..#
######",
        );
        assert_eq!(autopilot_direction(&engine), None);
    }

    #[test]
    fn autopilot_round_on_default_maze_has_no_anomalies() {
        let mut engine = engine_for(DEFAULT_LAYOUT);
        let (line, records) = run_round(&mut engine, 11, 2_000, true);
        assert!(records.is_empty(), "{records:?}");
        assert!(line.score > 0);
        assert!(line.collected <= line.total_collectibles);
    }

    #[test]
    fn wall_positions_are_reported() {
        let mut engine = engine_for("#P.#");
        let mut snapshot = engine.build_snapshot(false);
        snapshot.player.x = 0.0;
        let anomalies = collect_snapshot_anomalies(engine.maze(), &snapshot, 0);
        assert_eq!(anomalies.len(), 1);
        let snapshot = engine.build_snapshot(false);
        let anomalies = collect_snapshot_anomalies(engine.maze(), &snapshot, 5);
        assert_eq!(anomalies, vec!["score decreased from 5 to 0".to_string()]);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("pacstudent-missing-{}", now_ms()))
            .join("summary.json");
        let summary = RunSummary {
            started_at_ms: 1,
            finished_at_ms: 2,
            anomaly_records: Vec::new(),
            result: RunResultLine::default(),
        };
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
    }
}
