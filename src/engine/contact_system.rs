use tracing::warn;

use crate::constants::{
    GHOST_CONTACT_RADIUS, GHOST_SCORE, ITEM_CONTACT_RADIUS, PELLET_SCORE, POWER_PELLET_SCORE,
};
use crate::maze::Tile;
use crate::player::MoveOutcome;
use crate::types::GhostState;

use super::*;

impl GameEngine {
    pub(super) fn update_player(&mut self, dt_ms: u64) {
        if let Some(remaining) = self.player.respawn_in_ms {
            let remaining = remaining.saturating_sub(dt_ms);
            if remaining == 0 {
                self.player.respawn();
                debug!(cell = ?self.player.cell(), "player respawned");
            } else {
                self.player.respawn_in_ms = Some(remaining);
            }
            return;
        }

        if !self.player.in_transit() && self.player.try_move(&self.maze) == MoveOutcome::Blocked {
            self.feedback(FeedbackKind::WallCollision);
        }
        let teleported = match self.player.advance(dt_ms) {
            Some(arrived) => self.resolve_teleport(arrived),
            None => false,
        };
        // The cooldown starts counting on the tick after a teleport, so it
        // still covers the arrival that ends the next transit.
        if !teleported {
            self.player.teleport_cooldown_ms =
                self.player.teleport_cooldown_ms.saturating_sub(dt_ms);
        }
        self.resolve_item_contact();
    }

    fn resolve_teleport(&mut self, cell: Cell) -> bool {
        if self.maze.tile(cell) != Tile::Teleporter || self.player.teleport_cooldown_ms > 0 {
            return false;
        }
        let Some(partner) = self.maze.teleport_partner(cell) else {
            warn!(x = cell.x, y = cell.y, "teleporter has no partner");
            return false;
        };
        self.player.relocate(partner);
        self.player.teleport_cooldown_ms = self.config.teleport_cooldown_ms;
        debug!(from = ?cell, to = ?partner, "player teleported");
        true
    }

    fn resolve_item_contact(&mut self) {
        let position = self.player.position();
        let cell = position.nearest_cell();
        if position.distance(cell.center()) > ITEM_CONTACT_RADIUS {
            return;
        }
        let Some(kind) = self.collectibles.remove(&cell) else {
            return;
        };
        match kind {
            CollectibleKind::Pellet => {
                self.add_score(PELLET_SCORE);
                self.feedback(FeedbackKind::Pellet);
            }
            CollectibleKind::PowerPellet => {
                self.add_score(POWER_PELLET_SCORE);
                self.feedback(FeedbackKind::PowerPellet);
                self.start_power_window();
            }
        }
        self.record_collection();
    }

    /// Player against every ghost. Vulnerable ghosts are eaten, a walking
    /// ghost kills the player, and dead ghosts are passed through.
    pub(super) fn resolve_ghost_contacts(&mut self) {
        if self.round.phase != RoundPhase::Playing || self.player.is_respawning() {
            return;
        }
        let position = self.player.position();
        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].position().distance(position) > GHOST_CONTACT_RADIUS {
                continue;
            }
            match self.ghosts[idx].state() {
                GhostState::Dead => {}
                GhostState::Scared | GhostState::Recovering => {
                    if let Some(change) = self.ghosts[idx].kill() {
                        self.apply_state_change(change);
                        self.add_score(GHOST_SCORE);
                    }
                }
                GhostState::Walking => {
                    self.kill_player();
                    return;
                }
            }
        }
    }
}
