use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::constants::{
    BONUS_SPAWN_INTERVAL_MS, INITIAL_LIVES, PLAYER_RESPAWN_DELAY_MS, PLAYER_SPEED,
    POWER_DURATION_MS, RECOVERING_WINDOW_MS, GHOST_RESPAWN_DELAY_MS, TELEPORT_COOLDOWN_MS,
    TICK_RATE,
};
use crate::events::{dispatch, EventSink, GameEvent};
use crate::ghost::{random_open_direction, Ghost, StateChange};
use crate::high_score::HighScoreStore;
use crate::maze::Maze;
use crate::player::Player;
use crate::rng::Rng;
use crate::types::{
    Cell, CollectibleKind, CollectibleView, Direction, FeedbackKind, GameConfig, RoundPhase,
    RoundState, Snapshot,
};

mod bonus_system;
mod contact_system;
mod power_system;
mod round_system;

use self::bonus_system::Bonus;

#[derive(Clone, Debug, Default)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub lives_override: Option<u32>,
    pub high_score_path: Option<PathBuf>,
}

/// Owns one round: the maze, the player, every ghost and the round state.
/// Presentation consumers read snapshots and drain queued events; nothing
/// outside the engine mutates gameplay state.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,

    maze: Maze,
    rng: Rng,
    player: Player,
    ghosts: Vec<Ghost>,
    collectibles: BTreeMap<Cell, CollectibleKind>,
    bonuses: Vec<Bonus>,
    events: Vec<GameEvent>,
    round: RoundState,
    high_score: HighScoreStore,

    power_remaining_ms: u64,
    ghost_timer_shown: Option<u64>,
    ghost_music: Option<FeedbackKind>,
    bonus_spawn_in_ms: u64,
    tick_counter: u64,
    next_id_counter: u64,
}

impl GameEngine {
    pub fn new(maze: Maze, options: GameEngineOptions) -> Self {
        let mut rng = Rng::new(options.seed);
        let config = GameConfig {
            tick_rate: TICK_RATE,
            initial_lives: options.lives_override.unwrap_or(INITIAL_LIVES),
            power_duration_ms: POWER_DURATION_MS,
            recovering_window_ms: RECOVERING_WINDOW_MS,
            ghost_respawn_delay_ms: GHOST_RESPAWN_DELAY_MS,
            player_respawn_delay_ms: PLAYER_RESPAWN_DELAY_MS,
            teleport_cooldown_ms: TELEPORT_COOLDOWN_MS,
            bonus_spawn_interval_ms: BONUS_SPAWN_INTERVAL_MS,
            player_speed: PLAYER_SPEED,
        };

        let ghosts = maze
            .ghost_homes()
            .iter()
            .enumerate()
            .map(|(idx, home)| {
                let mut ghost = Ghost::new(idx, home.mode, home.cell);
                random_open_direction(&mut ghost, &maze, &mut rng);
                ghost
            })
            .collect();

        let collectibles = maze.collectibles().clone();
        let round = RoundState {
            score: 0,
            lives: config.initial_lives,
            collected: 0,
            total_collectibles: collectibles.len() as u32,
            elapsed_ms: 0,
            phase: RoundPhase::Ready,
            end_reason: None,
        };
        let high_score = match options.high_score_path {
            Some(path) => HighScoreStore::open(path),
            None => HighScoreStore::in_memory(0),
        };

        Self {
            config,
            player: Player::new(maze.player_spawn()),
            maze,
            rng,
            ghosts,
            collectibles,
            bonuses: Vec::new(),
            events: Vec::new(),
            round,
            high_score,
            power_remaining_ms: 0,
            ghost_timer_shown: None,
            ghost_music: None,
            bonus_spawn_in_ms: 0,
            tick_counter: 0,
            next_id_counter: 1,
        }
    }

    /// Replaces the high-score store, for callers that open it themselves.
    pub fn with_high_score(mut self, store: HighScoreStore) -> Self {
        self.high_score = store;
        self
    }

    /// Ends the pre-round countdown: enables movement and the bonus
    /// scheduler.
    pub fn start_round(&mut self) {
        if self.round.phase != RoundPhase::Ready {
            return;
        }
        self.round.phase = RoundPhase::Playing;
        self.set_ghost_music(FeedbackKind::GhostMusicNormal);
        self.spawn_bonus();
        self.bonus_spawn_in_ms = self.config.bonus_spawn_interval_ms;
        info!(
            collectibles = self.round.total_collectibles,
            ghosts = self.ghosts.len(),
            high_score = self.high_score.best(),
            "round started"
        );
    }

    /// Buffers the latest directional command. Accepted in any phase; it is
    /// acted on once the round is playing.
    pub fn set_requested_direction(&mut self, dir: Direction) {
        self.player.request(dir);
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.round.phase != RoundPhase::Playing {
            return;
        }
        self.tick_counter += 1;
        self.round.elapsed_ms = self.round.elapsed_ms.saturating_add(dt_ms);

        self.update_power_window(dt_ms);
        self.update_player(dt_ms);
        self.update_ghosts(dt_ms);
        self.resolve_ghost_contacts();
        self.update_bonuses(dt_ms);
    }

    fn update_ghosts(&mut self, dt_ms: u64) {
        if self.round.phase != RoundPhase::Playing {
            return;
        }
        let target = self.player.position();
        for idx in 0..self.ghosts.len() {
            let change = self.ghosts[idx].advance(&self.maze, target, &mut self.rng, dt_ms);
            if let Some(change) = change {
                self.apply_state_change(change);
            }
        }
    }

    /// Queues the notifications for a committed ghost transition.
    fn apply_state_change(&mut self, change: StateChange) {
        debug!(ghost = change.ghost_id, state = ?change.state, "ghost state changed");
        self.events.push(GameEvent::GhostStateChanged {
            ghost_id: change.ghost_id,
            state: change.state,
        });
        if let Some(music) = change.music {
            self.set_ghost_music(music);
        }
    }

    fn set_ghost_music(&mut self, kind: FeedbackKind) {
        if self.ghost_music == Some(kind) {
            return;
        }
        self.ghost_music = Some(kind);
        self.feedback(kind);
    }

    fn feedback(&mut self, kind: FeedbackKind) {
        self.events.push(GameEvent::Feedback { kind });
    }

    /// Current score, for HUD-like consumers.
    pub fn score(&self) -> u32 {
        self.round.score
    }

    pub fn lives(&self) -> u32 {
        self.round.lives
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn is_ended(&self) -> bool {
        self.round.phase == RoundPhase::Over
    }

    /// Seconds left in the power-up window, 0 when inactive.
    pub fn ghost_timer_seconds(&self) -> f32 {
        self.power_remaining_ms as f32 / 1000.0
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn collectibles(&self) -> &BTreeMap<Cell, CollectibleKind> {
        &self.collectibles
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let target = self.player.position();
        Snapshot {
            tick: self.tick_counter,
            round: self.round.clone(),
            high_score: self.high_score.best(),
            ghost_timer_seconds: self.ghost_timer_seconds(),
            player: self.player.view(),
            ghosts: self.ghosts.iter().map(|ghost| ghost.view(target)).collect(),
            bonuses: self.bonuses.iter().map(Bonus::view).collect(),
            collectibles: self
                .collectibles
                .iter()
                .map(|(cell, kind)| CollectibleView {
                    x: cell.x,
                    y: cell.y,
                    kind: *kind,
                })
                .collect(),
            events: if include_events {
                self.drain_events()
            } else {
                Vec::new()
            },
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forwards every queued event to `sink`, in the order they committed.
    pub fn flush_events(&mut self, sink: &mut dyn EventSink) {
        dispatch(self.drain_events(), sink);
    }

    fn make_id(&mut self) -> u64 {
        let id = self.next_id_counter;
        self.next_id_counter += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::TICK_MS;
    use crate::engine::{GameEngine, GameEngineOptions};
    use crate::events::{EventSink, GameEvent};
    use crate::maze::{Maze, DEFAULT_LAYOUT};
    use crate::types::{Direction, FeedbackKind, GhostState, RoundPhase};

    pub(super) fn engine_for(layout: &str, lives: Option<u32>) -> GameEngine {
        let maze = Maze::parse(layout).expect("valid layout");
        GameEngine::new(
            maze,
            GameEngineOptions {
                seed: 7,
                lives_override: lives,
                high_score_path: None,
            },
        )
    }

    pub(super) fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|event| *event == wanted).count()
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let make = || {
            GameEngine::new(
                Maze::parse(DEFAULT_LAYOUT).expect("valid layout"),
                GameEngineOptions {
                    seed: 424_242,
                    ..GameEngineOptions::default()
                },
            )
        };
        let mut a = make();
        let mut b = make();
        a.start_round();
        b.start_round();
        let inputs = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];

        for tick in 0..600 {
            let dir = inputs[(tick / 40) % inputs.len()];
            a.set_requested_direction(dir);
            b.set_requested_direction(dir);
            a.step(TICK_MS);
            b.step(TICK_MS);
            let sa = a.build_snapshot(true);
            let sb = b.build_snapshot(true);

            assert_eq!(sa.round.score, sb.round.score);
            assert_eq!(sa.round.lives, sb.round.lives);
            assert_eq!(sa.player.x.to_bits(), sb.player.x.to_bits());
            assert_eq!(sa.player.y.to_bits(), sb.player.y.to_bits());
            for (ga, gb) in sa.ghosts.iter().zip(sb.ghosts.iter()) {
                assert_eq!(ga.x.to_bits(), gb.x.to_bits());
                assert_eq!(ga.y.to_bits(), gb.y.to_bits());
                assert_eq!(ga.state, gb.state);
            }
            assert_eq!(sa.events, sb.events);
            if a.is_ended() || b.is_ended() {
                assert_eq!(a.is_ended(), b.is_ended());
                break;
            }
        }
    }

    #[test]
    fn nothing_moves_before_start_round() {
        let mut engine = engine_for(DEFAULT_LAYOUT, None);
        let ghosts_before: Vec<_> = engine.ghosts().iter().map(|g| g.position()).collect();
        engine.set_requested_direction(Direction::Left);
        for _ in 0..20 {
            engine.step(TICK_MS);
        }
        assert_eq!(engine.phase(), RoundPhase::Ready);
        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.player().cell(), engine.maze().player_spawn());
        let ghosts_after: Vec<_> = engine.ghosts().iter().map(|g| g.position()).collect();
        assert_eq!(ghosts_before, ghosts_after);
        assert_eq!(engine.round().elapsed_ms, 0);
    }

    #[test]
    fn start_round_plays_normal_music_once() {
        let mut engine = engine_for(DEFAULT_LAYOUT, None);
        engine.start_round();
        engine.start_round();
        let events = engine.drain_events();
        assert_eq!(
            count(
                &events,
                &GameEvent::Feedback {
                    kind: FeedbackKind::GhostMusicNormal
                }
            ),
            1
        );
        assert_eq!(engine.phase(), RoundPhase::Playing);
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut engine = engine_for(DEFAULT_LAYOUT, None);
        engine.start_round();

        let peek = engine.build_snapshot(false);
        assert!(peek.events.is_empty());
        let first = engine.build_snapshot(true);
        let second = engine.build_snapshot(true);
        assert!(!first.events.is_empty());
        assert!(second.events.is_empty());
        assert_eq!(first.ghosts.len(), 4);
        assert_eq!(first.collectibles.len() as u32, first.round.total_collectibles);
    }

    #[test]
    fn flush_events_reaches_sink_in_commit_order() {
        #[derive(Default)]
        struct Recorder {
            scores: Vec<u32>,
            feedback: Vec<FeedbackKind>,
        }
        impl EventSink for Recorder {
            fn score_changed(&mut self, total: u32) {
                self.scores.push(total);
            }
            fn play_feedback(&mut self, kind: FeedbackKind) {
                self.feedback.push(kind);
            }
        }

        let mut engine = engine_for(
            "\
######
#P..##
######",
            None,
        );
        engine.start_round();
        engine.set_requested_direction(Direction::Right);
        for _ in 0..8 {
            engine.step(TICK_MS);
        }
        let mut sink = Recorder::default();
        engine.flush_events(&mut sink);
        assert_eq!(sink.scores, vec![10, 20]);
        assert_eq!(
            sink.feedback,
            vec![
                FeedbackKind::GhostMusicNormal,
                FeedbackKind::Pellet,
                FeedbackKind::Pellet,
                FeedbackKind::GhostMusicStop,
            ]
        );
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn ghost_views_face_the_player() {
        let mut engine = engine_for(
            "\
#######
#P...1#
#######",
            None,
        );
        let snapshot = engine.build_snapshot(false);
        assert_eq!(snapshot.ghosts[0].facing, Direction::Left);
        assert_eq!(snapshot.ghosts[0].state, GhostState::Walking);
    }
}
