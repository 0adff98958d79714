use serde::Serialize;

use crate::types::{FeedbackKind, GhostState};

/// Notifications produced by the engine for presentation-side consumers.
///
/// The engine queues these as transitions commit; consumers either drain
/// them through a [`crate::types::Snapshot`] or forward them to an
/// [`EventSink`] with [`dispatch`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    ScoreChanged {
        total: u32,
    },
    LivesChanged {
        remaining: u32,
    },
    RoundComplete,
    GameOver,
    GhostTimer {
        #[serde(rename = "secondsRemaining")]
        seconds_remaining: f32,
    },
    Feedback {
        kind: FeedbackKind,
    },
    GhostStateChanged {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        state: GhostState,
    },
}

/// Receiver for engine notifications. Every method defaults to a no-op so a
/// consumer only implements what it displays or plays.
pub trait EventSink {
    fn score_changed(&mut self, _total: u32) {}
    fn lives_changed(&mut self, _remaining: u32) {}
    fn round_complete(&mut self) {}
    fn game_over(&mut self) {}
    fn ghost_timer(&mut self, _seconds_remaining: f32) {}
    fn play_feedback(&mut self, _kind: FeedbackKind) {}
    fn ghost_state_changed(&mut self, _ghost_id: usize, _state: GhostState) {}
}

/// Sink that drops everything; used when no presentation layer is bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

pub fn dispatch<I>(events: I, sink: &mut dyn EventSink)
where
    I: IntoIterator<Item = GameEvent>,
{
    for event in events {
        match event {
            GameEvent::ScoreChanged { total } => sink.score_changed(total),
            GameEvent::LivesChanged { remaining } => sink.lives_changed(remaining),
            GameEvent::RoundComplete => sink.round_complete(),
            GameEvent::GameOver => sink.game_over(),
            GameEvent::GhostTimer { seconds_remaining } => sink.ghost_timer(seconds_remaining),
            GameEvent::Feedback { kind } => sink.play_feedback(kind),
            GameEvent::GhostStateChanged { ghost_id, state } => {
                sink.ghost_state_changed(ghost_id, state)
            }
        }
    }
}
