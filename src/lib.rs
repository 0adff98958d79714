pub mod constants;
pub mod engine;
pub mod events;
pub mod ghost;
pub mod high_score;
pub mod maze;
pub mod player;
pub mod rng;
pub mod spatial;
pub mod types;
