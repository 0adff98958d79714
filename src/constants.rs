pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const INITIAL_LIVES: u32 = 3;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const BONUS_SCORE: u32 = 100;
pub const GHOST_SCORE: u32 = 300;

pub const PLAYER_SPEED: f32 = 5.0;
pub const PLAYER_RESPAWN_DELAY_MS: u64 = 1_000;
pub const TELEPORT_COOLDOWN_MS: u64 = 200;

pub const GHOST_WALKING_SPEED: f32 = 4.0;
pub const GHOST_SCARED_SPEED: f32 = 2.0;
pub const GHOST_RECOVERING_SPEED: f32 = 3.0;
pub const GHOST_DEAD_SPEED: f32 = 6.0;
pub const GHOST_RESPAWN_DELAY_MS: u64 = 5_000;
pub const GHOST_HOME_EPSILON: f32 = 0.1;

pub const POWER_DURATION_MS: u64 = 10_000;
pub const RECOVERING_WINDOW_MS: u64 = 3_000;

pub const BONUS_SPAWN_INTERVAL_MS: u64 = 10_000;
/// Time for a bonus item to travel from its entry point to the maze centre,
/// and again from the centre to its exit point.
pub const BONUS_LEG_MS: u64 = 4_250;

/// Length of the wall probe, in cells.
pub const PROBE_RANGE: f32 = 1.0;
pub const PROBE_STEP: f32 = 0.25;

pub const ITEM_CONTACT_RADIUS: f32 = 0.5;
pub const GHOST_CONTACT_RADIUS: f32 = 0.75;

pub fn transit_duration_ms(speed: f32) -> u64 {
    if speed <= 0.0 {
        return u64::MAX;
    }
    (1000.0 / speed).round() as u64
}
