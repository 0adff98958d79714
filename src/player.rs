//! Player movement: buffered input, one-cell transits and wall rollback.

use crate::constants::{transit_duration_ms, PLAYER_SPEED, PROBE_RANGE};
use crate::maze::Maze;
use crate::spatial::wall_ahead;
use crate::types::{Cell, Direction, PlayerView, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transit {
    from: Cell,
    to: Cell,
    elapsed_ms: u64,
    duration_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A transit toward the neighbouring cell began.
    Started(Direction),
    /// Neither the requested nor the last valid heading is open; the
    /// position was rolled back.
    Blocked,
    /// Nothing requested yet.
    Idle,
}

#[derive(Clone, Debug)]
pub struct Player {
    position: Vec2,
    cell: Cell,
    spawn: Cell,
    requested: Direction,
    current: Direction,
    transit: Option<Transit>,
    speed: f32,
    pub(crate) teleport_cooldown_ms: u64,
    pub(crate) respawn_in_ms: Option<u64>,
}

impl Player {
    pub fn new(spawn: Cell) -> Self {
        Self {
            position: spawn.center(),
            cell: spawn,
            spawn,
            requested: Direction::None,
            current: Direction::None,
            transit: None,
            speed: PLAYER_SPEED,
            teleport_cooldown_ms: 0,
            respawn_in_ms: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Cell the player stands on, or departs from while in transit.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn requested_direction(&self) -> Direction {
        self.requested
    }

    /// Last heading that produced a move.
    pub fn current_direction(&self) -> Direction {
        self.current
    }

    pub fn in_transit(&self) -> bool {
        self.transit.is_some()
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_in_ms.is_some()
    }

    pub fn request(&mut self, dir: Direction) {
        self.requested = dir;
    }

    /// Decides the next one-cell move. Must only be called between transits.
    pub fn try_move(&mut self, maze: &Maze) -> MoveOutcome {
        if self.transit.is_some() {
            return MoveOutcome::Idle;
        }
        let before = self.position;

        if !self.requested.is_none()
            && !wall_ahead(maze, self.position, self.requested, PROBE_RANGE)
        {
            self.current = self.requested;
            return self.start_transit(self.requested);
        }
        if !self.current.is_none() && !wall_ahead(maze, self.position, self.current, PROBE_RANGE) {
            return self.start_transit(self.current);
        }

        self.position = before;
        if self.requested.is_none() && self.current.is_none() {
            return MoveOutcome::Idle;
        }
        MoveOutcome::Blocked
    }

    fn start_transit(&mut self, dir: Direction) -> MoveOutcome {
        self.transit = Some(Transit {
            from: self.cell,
            to: self.cell.step(dir),
            elapsed_ms: 0,
            duration_ms: transit_duration_ms(self.speed),
        });
        MoveOutcome::Started(dir)
    }

    /// Interpolates along the current transit. Returns the destination cell
    /// on the tick the transit completes.
    pub fn advance(&mut self, dt_ms: u64) -> Option<Cell> {
        let transit = self.transit.as_mut()?;
        transit.elapsed_ms = transit.elapsed_ms.saturating_add(dt_ms);
        if transit.elapsed_ms >= transit.duration_ms {
            let arrived = transit.to;
            self.transit = None;
            self.cell = arrived;
            self.position = arrived.center();
            return Some(arrived);
        }
        let t = transit.elapsed_ms as f32 / transit.duration_ms as f32;
        self.position = transit.from.center().lerp(transit.to.center(), t);
        None
    }

    /// Instant relocation; cancels any transit.
    pub fn relocate(&mut self, cell: Cell) {
        self.transit = None;
        self.cell = cell;
        self.position = cell.center();
    }

    /// Back to the spawn cell with no buffered input.
    pub fn respawn(&mut self) {
        self.relocate(self.spawn);
        self.requested = Direction::None;
        self.current = Direction::None;
        self.respawn_in_ms = None;
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            x: self.position.x,
            y: self.position.y,
            dir: self.current,
            requested: self.requested,
            in_transit: self.in_transit(),
            respawning: self.is_respawning(),
        }
    }
}
