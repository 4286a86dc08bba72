//! Moonraid - a wave-based arcade shooter simulation core
//!
//! Core modules:
//! - `sim`: the per-frame game simulation (entities, collision resolution,
//!   wave lifecycle, orientation smoothing)
//!
//! Rendering, audio playback and input-device polling live in the host. The
//! host calls [`sim::Simulation::update`] once per frame with the frame delta,
//! feeds decoded input through the command surface, and reads entity positions
//! back for drawing. Observable side effects (explosions, shots, score pops)
//! reach the host through the [`sim::SimulationListener`] it injects.

pub mod sim;

pub use sim::{NullListener, Simulation, SimulationListener};

/// Game configuration constants
pub mod consts {
    /// Playfield bounds: an axis-aligned box. Aliens advance toward +Z,
    /// where the ship sits near the origin.
    pub const PLAYFIELD_MIN_X: f32 = -14.0;
    pub const PLAYFIELD_MAX_X: f32 = 14.0;
    pub const PLAYFIELD_MIN_Z: f32 = -15.0;
    pub const PLAYFIELD_MAX_Z: f32 = 2.0;

    /// Alien grid dimensions at wave start
    pub const ALIEN_ROWS: u32 = 4;
    pub const ALIEN_COLUMNS: u32 = 8;
    /// Row/column spacing of the grid
    pub const ALIEN_PITCH: f32 = 2.5;
    /// Vertical spawn offsets are drawn from `0..ALIEN_MAX_ALTITUDE`
    pub const ALIEN_MAX_ALTITUDE: u32 = 6;

    pub const ALIEN_RADIUS: f32 = 1.0;
    pub const ALIEN_SPEED: f32 = 1.0;
    /// Points for destroying an alien
    pub const ALIEN_POINTS: u32 = 50;
    /// Points for intercepting an alien shot mid-flight
    pub const INTERCEPT_POINTS: u32 = 10;
    /// Per-frame chance an alien returns fire, scaled by the wave multiplier
    pub const ALIEN_FIRE_CHANCE: f32 = 0.01;

    pub const SHIP_RADIUS: f32 = 1.0;
    pub const SHIP_SPEED: f32 = 20.0;
    pub const SHIP_LIVES: u32 = 3;

    /// Player shots are fast and precise; alien shots are slower but fatter,
    /// which keeps interception feasible without making player fire sloppy.
    pub const PLAYER_SHOT_VELOCITY: f32 = 10.0;
    pub const PLAYER_SHOT_RADIUS: f32 = 0.5;
    pub const ALIEN_SHOT_VELOCITY: f32 = 6.0;
    pub const ALIEN_SHOT_RADIUS: f32 = 1.0;
    /// Cap on concurrently live player shots
    pub const MAX_PLAYER_SHOTS: usize = 8;

    /// Shield block hit radius
    pub const BLOCK_RADIUS: f32 = 0.5;

    /// Lifetime of an explosion animation, seconds
    pub const EXPLOSION_LIVE_TIME: f32 = 1.0;
    /// Speed/fire-rate multiplier gain per cleared wave
    pub const MULTIPLIER_INCREMENT: f32 = 0.1;
    /// Capacity of the orientation smoothing window
    pub const ORIENTATION_WINDOW: usize = 15;
}
