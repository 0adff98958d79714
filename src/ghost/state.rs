use crate::constants::{GHOST_HOME_EPSILON, GHOST_RESPAWN_DELAY_MS};
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, FeedbackKind, GhostState};

use super::{random_open_direction, Ghost};

/// A committed lifecycle transition, reported to the engine so it can
/// notify presentation after the fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub ghost_id: usize,
    pub state: GhostState,
    pub music: Option<FeedbackKind>,
}

impl Ghost {
    fn enter_state(&mut self, state: GhostState) -> StateChange {
        self.state = state;
        self.respawn_in_ms = None;
        let music = match state {
            GhostState::Walking => Some(FeedbackKind::GhostMusicNormal),
            GhostState::Scared => Some(FeedbackKind::GhostMusicScared),
            GhostState::Recovering => None,
            GhostState::Dead => Some(FeedbackKind::GhostMusicDead),
        };
        StateChange {
            ghost_id: self.id,
            state,
            music,
        }
    }

    /// Power-up start or restart. Scared ghosts are re-entered so the
    /// broadcast reaches every living ghost; dead ghosts keep heading home.
    pub(crate) fn scare(&mut self) -> Option<StateChange> {
        if self.state == GhostState::Dead {
            return None;
        }
        Some(self.enter_state(GhostState::Scared))
    }

    pub(crate) fn begin_recovering(&mut self) -> Option<StateChange> {
        if self.state != GhostState::Scared {
            return None;
        }
        Some(self.enter_state(GhostState::Recovering))
    }

    /// Power-up expiry.
    pub(crate) fn calm(&mut self) -> Option<StateChange> {
        if !self.state.is_vulnerable() {
            return None;
        }
        Some(self.enter_state(GhostState::Walking))
    }

    /// Eaten by the player. Only vulnerable ghosts die.
    pub(crate) fn kill(&mut self) -> Option<StateChange> {
        if !self.state.is_vulnerable() {
            return None;
        }
        Some(self.enter_state(GhostState::Dead))
    }

    /// Resets the ghost onto its home cell in the initial state.
    pub(crate) fn reset(&mut self, maze: &Maze, rng: &mut Rng) -> StateChange {
        self.place_at(self.home);
        self.previous_direction = Direction::None;
        let change = self.enter_state(GhostState::Walking);
        random_open_direction(self, maze, rng);
        change
    }

    /// Dead ghosts fly straight home, wait out the respawn delay there, then
    /// walk again with a fresh heading.
    pub(super) fn update_dead(
        &mut self,
        maze: &Maze,
        rng: &mut Rng,
        dt_ms: u64,
    ) -> Option<StateChange> {
        if let Some(remaining) = self.respawn_in_ms {
            let remaining = remaining.saturating_sub(dt_ms);
            if remaining == 0 {
                return Some(self.reset(maze, rng));
            }
            self.respawn_in_ms = Some(remaining);
            return None;
        }

        let home = self.home.center();
        let to_home = home - self.position;
        let distance = to_home.length();
        let travel = self.state.speed() * dt_ms as f32 / 1000.0;
        if distance > 0.0 {
            if travel >= distance {
                self.position = home;
            } else {
                self.position = self.position + to_home * (travel / distance);
            }
        }

        if self.position.distance(home) < GHOST_HOME_EPSILON {
            self.place_at(self.home);
            self.direction = Direction::None;
            self.respawn_in_ms = Some(GHOST_RESPAWN_DELAY_MS);
        }
        None
    }
}
