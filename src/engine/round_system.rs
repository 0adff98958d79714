use crate::types::GameOverReason;

use super::*;

impl GameEngine {
    pub(super) fn add_score(&mut self, points: u32) {
        self.round.score = self.round.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged {
            total: self.round.score,
        });
        debug!(points, total = self.round.score, "score changed");
    }

    pub(super) fn record_collection(&mut self) {
        self.round.collected += 1;
        if self.round.collected >= self.round.total_collectibles {
            self.end_round(GameOverReason::Cleared);
        }
    }

    /// Starts the death sequence. A death already in progress, or a round
    /// that has ended, swallows further kills.
    pub(super) fn kill_player(&mut self) {
        if self.round.phase != RoundPhase::Playing || self.player.is_respawning() {
            return;
        }
        self.round.lives = self.round.lives.saturating_sub(1);
        self.events.push(GameEvent::LivesChanged {
            remaining: self.round.lives,
        });
        self.feedback(FeedbackKind::Death);
        info!(lives = self.round.lives, "player died");

        if self.round.lives == 0 {
            self.end_round(GameOverReason::OutOfLives);
        } else {
            self.player.respawn_in_ms = Some(self.config.player_respawn_delay_ms);
        }
    }

    /// Freezes the round, stops ghost music and saves a beaten high score.
    /// Runs at most once per round.
    pub(super) fn end_round(&mut self, reason: GameOverReason) {
        if self.round.phase == RoundPhase::Over {
            return;
        }
        self.round.phase = RoundPhase::Over;
        self.round.end_reason = Some(reason);
        self.set_ghost_music(FeedbackKind::GhostMusicStop);

        let previous_best = self.high_score.best();
        if self.high_score.record(self.round.score) {
            info!(
                score = self.round.score,
                previous_best, "new high score"
            );
        }

        self.events.push(match reason {
            GameOverReason::Cleared => GameEvent::RoundComplete,
            GameOverReason::OutOfLives => GameEvent::GameOver,
        });
        info!(
            ?reason,
            score = self.round.score,
            elapsed_ms = self.round.elapsed_ms,
            "round over"
        );
    }
}
