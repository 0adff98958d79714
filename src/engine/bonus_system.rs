use crate::constants::{BONUS_LEG_MS, BONUS_SCORE, ITEM_CONTACT_RADIUS};
use crate::types::{BonusView, Vec2};

use super::*;

/// A banana crossing the maze: in from one side, through the centre and
/// out through the mirrored point.
#[derive(Clone, Debug)]
pub(super) struct Bonus {
    id: u64,
    entry: Vec2,
    centre: Vec2,
    exit: Vec2,
    elapsed_ms: u64,
}

impl Bonus {
    fn position(&self) -> Vec2 {
        if self.elapsed_ms < BONUS_LEG_MS {
            let t = self.elapsed_ms as f32 / BONUS_LEG_MS as f32;
            self.entry.lerp(self.centre, t)
        } else {
            let t = (self.elapsed_ms - BONUS_LEG_MS) as f32 / BONUS_LEG_MS as f32;
            self.centre.lerp(self.exit, t)
        }
    }

    fn finished(&self) -> bool {
        self.elapsed_ms >= BONUS_LEG_MS * 2
    }

    pub(super) fn view(&self) -> BonusView {
        let position = self.position();
        BonusView {
            id: self.id,
            x: position.x,
            y: position.y,
        }
    }
}

impl GameEngine {
    pub(super) fn update_bonuses(&mut self, dt_ms: u64) {
        if self.round.phase != RoundPhase::Playing {
            return;
        }
        for bonus in &mut self.bonuses {
            bonus.elapsed_ms = bonus.elapsed_ms.saturating_add(dt_ms);
        }
        self.bonuses.retain(|bonus| !bonus.finished());

        self.bonus_spawn_in_ms = self.bonus_spawn_in_ms.saturating_sub(dt_ms);
        if self.bonus_spawn_in_ms == 0 {
            self.spawn_bonus();
            self.bonus_spawn_in_ms = self.config.bonus_spawn_interval_ms;
        }

        self.resolve_bonus_contacts();
    }

    /// Picks a random side of the maze bounds and a random point one cell
    /// outside it.
    pub(super) fn spawn_bonus(&mut self) {
        let (cx, cy) = self.maze.centre();
        let max_x = (self.maze.width() - 1) as f32;
        let max_y = (self.maze.height() - 1) as f32;
        let entry = match self.rng.pick_index(4) {
            0 => Vec2::new(-1.0, self.rng.range_f32(0.0, max_y)),
            1 => Vec2::new(max_x + 1.0, self.rng.range_f32(0.0, max_y)),
            2 => Vec2::new(self.rng.range_f32(0.0, max_x), -1.0),
            _ => Vec2::new(self.rng.range_f32(0.0, max_x), max_y + 1.0),
        };
        let centre = Vec2::new(cx, cy);
        let exit = centre * 2.0 - entry;
        let id = self.make_id();
        self.bonuses.push(Bonus {
            id,
            entry,
            centre,
            exit,
            elapsed_ms: 0,
        });
        debug!(id, x = entry.x, y = entry.y, "bonus spawned");
    }

    fn resolve_bonus_contacts(&mut self) {
        if self.player.is_respawning() {
            return;
        }
        let position = self.player.position();
        let Some(idx) = self
            .bonuses
            .iter()
            .position(|bonus| bonus.position().distance(position) <= ITEM_CONTACT_RADIUS)
        else {
            return;
        };
        let bonus = self.bonuses.remove(idx);
        self.add_score(BONUS_SCORE);
        self.feedback(FeedbackKind::Banana);
        debug!(id = bonus.id, "bonus eaten");
    }
}

#[cfg(test)]
mod tests {
    use super::Bonus;
    use crate::constants::{BONUS_LEG_MS, TICK_MS};
    use crate::engine::tests::engine_for;
    use crate::events::GameEvent;
    use crate::maze::DEFAULT_LAYOUT;
    use crate::types::{FeedbackKind, Vec2};

    const BOX: &str = "\
#####
#P  #
#####";

    #[test]
    fn first_bonus_spawns_at_round_start_then_every_interval() {
        // No ghosts and nothing to collect, so the round keeps running.
        let mut engine = engine_for(
            "\
#########
#P      #
#       #
#       #
#########",
            None,
        );
        assert!(engine.bonuses.is_empty());
        engine.start_round();
        assert_eq!(engine.bonuses.len(), 1);
        assert_eq!(engine.bonuses[0].id, 1);

        let interval_ticks = engine.config.bonus_spawn_interval_ms / TICK_MS;
        for _ in 0..interval_ticks - 1 {
            engine.step(TICK_MS);
        }
        assert!(engine.bonuses.iter().all(|bonus| bonus.id == 1));
        engine.step(TICK_MS);
        assert!(engine.bonuses.iter().any(|bonus| bonus.id == 2));
    }

    #[test]
    fn bonus_enters_outside_and_crosses_the_centre() {
        let mut engine = engine_for(DEFAULT_LAYOUT, None);
        for _ in 0..32 {
            engine.spawn_bonus();
        }
        let (cx, cy) = engine.maze().centre();
        let width = engine.maze().width() as f32;
        let height = engine.maze().height() as f32;
        for bonus in &engine.bonuses {
            let outside = bonus.entry.x == -1.0
                || bonus.entry.x == width
                || bonus.entry.y == -1.0
                || bonus.entry.y == height;
            assert!(outside, "entry {:?} is not one cell outside", bonus.entry);
            let midpoint = bonus.entry.lerp(bonus.exit, 0.5);
            assert!((midpoint.x - cx).abs() < 1e-4 && (midpoint.y - cy).abs() < 1e-4);
        }
    }

    #[test]
    fn bonus_path_takes_two_legs_then_disappears() {
        let bonus = Bonus {
            id: 1,
            entry: Vec2::new(-1.0, 3.0),
            centre: Vec2::new(10.0, 7.0),
            exit: Vec2::new(21.0, 11.0),
            elapsed_ms: BONUS_LEG_MS,
        };
        assert_eq!(bonus.position(), Vec2::new(10.0, 7.0));
        assert!(!bonus.finished());
        let done = Bonus {
            elapsed_ms: BONUS_LEG_MS * 2,
            ..bonus
        };
        assert!(done.finished());
        assert_eq!(done.position(), Vec2::new(21.0, 11.0));
    }

    #[test]
    fn touching_a_bonus_scores_once() {
        let mut engine = engine_for(BOX, None);
        engine.start_round();
        engine.bonuses.clear();
        engine.drain_events();
        engine.bonuses.push(Bonus {
            id: 9,
            entry: Vec2::new(1.0, 1.0),
            centre: Vec2::new(2.0, 1.0),
            exit: Vec2::new(3.0, 1.0),
            elapsed_ms: 0,
        });

        engine.step(TICK_MS);
        assert_eq!(engine.score(), 100);
        assert!(engine.bonuses.iter().all(|bonus| bonus.id != 9));
        engine.step(TICK_MS);
        assert_eq!(engine.score(), 100);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::Feedback {
            kind: FeedbackKind::Banana
        }));
        assert!(events.contains(&GameEvent::ScoreChanged { total: 100 }));
    }
}
