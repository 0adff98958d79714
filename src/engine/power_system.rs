use super::*;

impl GameEngine {
    /// Starts the power-up window, or restarts it at full length when one is
    /// already running. Every living ghost is scared again, including
    /// recovering ones.
    pub(super) fn start_power_window(&mut self) {
        let restarted = self.power_remaining_ms > 0;
        self.power_remaining_ms = self.config.power_duration_ms;
        for idx in 0..self.ghosts.len() {
            if let Some(change) = self.ghosts[idx].scare() {
                self.apply_state_change(change);
            }
        }
        self.ghost_timer_shown = None;
        self.emit_ghost_timer();
        info!(restarted, duration_ms = self.power_remaining_ms, "power-up window started");
    }

    pub(super) fn update_power_window(&mut self, dt_ms: u64) {
        if self.power_remaining_ms == 0 {
            return;
        }
        self.power_remaining_ms = self.power_remaining_ms.saturating_sub(dt_ms);

        if self.power_remaining_ms == 0 {
            for idx in 0..self.ghosts.len() {
                if let Some(change) = self.ghosts[idx].calm() {
                    self.apply_state_change(change);
                }
            }
            self.ghost_timer_shown = None;
            self.events.push(GameEvent::GhostTimer {
                seconds_remaining: 0.0,
            });
            info!("power-up window expired");
            return;
        }

        if self.power_remaining_ms <= self.config.recovering_window_ms {
            for idx in 0..self.ghosts.len() {
                if let Some(change) = self.ghosts[idx].begin_recovering() {
                    self.apply_state_change(change);
                }
            }
        }
        self.emit_ghost_timer();
    }

    /// Emits the whole-second countdown whenever the displayed value changes.
    fn emit_ghost_timer(&mut self) {
        let shown = self.power_remaining_ms.div_ceil(1000);
        if self.ghost_timer_shown == Some(shown) {
            return;
        }
        self.ghost_timer_shown = Some(shown);
        self.events.push(GameEvent::GhostTimer {
            seconds_remaining: shown as f32,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::TICK_MS;
    use crate::engine::tests::engine_for;
    use crate::events::GameEvent;
    use crate::types::{FeedbackKind, GhostState};

    // Ghosts walk a corridor sealed off from the player.
    const SEALED: &str = "\
#########
#P#.1.2.#
#########";

    fn timer_values(events: &[GameEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|event| match event {
                GameEvent::GhostTimer { seconds_remaining } => Some(*seconds_remaining),
                _ => None,
            })
            .collect()
    }

    fn states(engine: &crate::engine::GameEngine) -> Vec<GhostState> {
        engine.ghosts().iter().map(|ghost| ghost.state()).collect()
    }

    #[test]
    fn window_runs_scared_recovering_then_walking() {
        let mut engine = engine_for(SEALED, None);
        engine.start_round();
        engine.drain_events();

        engine.start_power_window();
        assert_eq!(states(&engine), vec![GhostState::Scared; 2]);
        assert_eq!(engine.ghost_timer_seconds(), 10.0);

        for _ in 0..150 {
            engine.step(TICK_MS);
        }
        assert_eq!(states(&engine), vec![GhostState::Recovering; 2]);
        assert!((engine.ghost_timer_seconds() - 2.5).abs() < 1e-4);

        for _ in 0..50 {
            engine.step(TICK_MS);
        }
        assert_eq!(states(&engine), vec![GhostState::Walking; 2]);
        assert_eq!(engine.ghost_timer_seconds(), 0.0);

        let events = engine.drain_events();
        let timers = timer_values(&events);
        assert_eq!(
            timers,
            vec![10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0]
        );
        assert!(events.contains(&GameEvent::Feedback {
            kind: FeedbackKind::GhostMusicScared
        }));
        assert_eq!(
            events.last(),
            Some(&GameEvent::GhostTimer {
                seconds_remaining: 0.0
            })
        );
    }

    #[test]
    fn restart_while_recovering_rescares_and_resets_countdown() {
        let mut engine = engine_for(SEALED, None);
        engine.start_round();
        engine.start_power_window();
        for _ in 0..160 {
            engine.step(TICK_MS);
        }
        assert_eq!(states(&engine), vec![GhostState::Recovering; 2]);
        engine.drain_events();

        engine.start_power_window();
        assert_eq!(states(&engine), vec![GhostState::Scared; 2]);
        assert_eq!(engine.ghost_timer_seconds(), 10.0);
        let events = engine.drain_events();
        assert_eq!(timer_values(&events), vec![10.0]);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(
                    event,
                    GameEvent::GhostStateChanged {
                        state: GhostState::Scared,
                        ..
                    }
                ))
                .count(),
            2
        );

        // The restarted window runs its full length again.
        for _ in 0..199 {
            engine.step(TICK_MS);
        }
        assert_ne!(states(&engine), vec![GhostState::Walking; 2]);
        engine.step(TICK_MS);
        assert_eq!(states(&engine), vec![GhostState::Walking; 2]);
    }

    #[test]
    fn scared_music_plays_once_per_window() {
        let mut engine = engine_for(SEALED, None);
        engine.start_round();
        engine.start_power_window();
        engine.start_power_window();
        let scared = engine
            .drain_events()
            .into_iter()
            .filter(|event| {
                *event
                    == GameEvent::Feedback {
                        kind: FeedbackKind::GhostMusicScared,
                    }
            })
            .count();
        assert_eq!(scared, 1);
    }

    #[test]
    fn dead_ghost_is_not_rescared() {
        let mut engine = engine_for(SEALED, None);
        engine.start_round();
        engine.start_power_window();
        let change = engine.ghosts[0].kill().expect("scared ghost dies");
        engine.apply_state_change(change);

        engine.start_power_window();
        assert_eq!(engine.ghosts()[0].state(), GhostState::Dead);
        assert_eq!(engine.ghosts()[1].state(), GhostState::Scared);
    }
}
