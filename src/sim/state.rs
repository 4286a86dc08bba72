//! Entity records and the owned world aggregate
//!
//! All entity collections live in [`Simulation`] and are mutated only by the
//! per-frame update in `tick`; the renderer reads positions and flags back
//! between frames.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::listener::{NullListener, SimulationListener};
use super::orientation::OrientationFilter;
use crate::consts::*;

/// Movement state of an alien marching the invader pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlienState {
    MoveLeft,
    MoveDown,
    MoveRight,
}

/// One invader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alien {
    pub position: Vec3,
    pub state: AlienState,
    /// Distance accumulated in the current movement leg.
    pub moved_distance: f32,
    /// Which horizontal direction was active before the last descent.
    pub was_last_left: bool,
}

impl Alien {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            state: AlienState::MoveLeft,
            // The grid spawns mid-field, so the first leftward leg only gets
            // half the horizontal quota.
            moved_distance: PLAYFIELD_MAX_X / 2.0,
            was_last_left: true,
        }
    }

    /// March the invader pattern: sideways until the horizontal quota is used
    /// up, then one unit of depth toward the ship, then back the other way.
    ///
    /// The state checks run sequentially on purpose: a leg that ends this
    /// frame lets the descent act in the same call.
    pub fn update(&mut self, delta: f32, multiplier: f32) {
        let step = delta * ALIEN_SPEED * multiplier;
        self.moved_distance += step;
        if self.state == AlienState::MoveLeft {
            self.position.x = (self.position.x - step).max(PLAYFIELD_MIN_X);
            if self.moved_distance > PLAYFIELD_MAX_X {
                self.state = AlienState::MoveDown;
                self.moved_distance = 0.0;
                self.was_last_left = true;
            }
        }
        if self.state == AlienState::MoveRight {
            self.position.x = (self.position.x + step).min(PLAYFIELD_MAX_X);
            if self.moved_distance > PLAYFIELD_MAX_X {
                self.state = AlienState::MoveDown;
                self.moved_distance = 0.0;
                self.was_last_left = false;
            }
        }
        if self.state == AlienState::MoveDown {
            self.position.z += step;
            if self.moved_distance > 1.0 {
                self.state = if self.was_last_left {
                    AlienState::MoveRight
                } else {
                    AlienState::MoveLeft
                };
                self.moved_distance = 0.0;
            }
        }
    }
}

/// The player's ship. Created once per session; position and lives survive
/// wave transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub position: Vec3,
    pub lives: u32,
    /// While set, the ship ignores move and fire commands.
    pub exploding: bool,
    pub explode_time: f32,
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

impl Ship {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            lives: SHIP_LIVES,
            exploding: false,
            explode_time: 0.0,
        }
    }

    /// Advance the explosion countdown; control returns to the player once
    /// the blast animation has run its course.
    pub fn update(&mut self, delta: f32) {
        if self.exploding {
            self.explode_time += delta;
            if self.explode_time > EXPLOSION_LIVE_TIME {
                self.exploding = false;
                self.explode_time = 0.0;
            }
        }
    }
}

/// A static shield block. Destroyed on any shot contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub position: Vec3,
}

impl Block {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }
}

/// Who fired a shot. The owner fixes its speed and hit radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOwner {
    Player,
    Alien,
}

/// A shot in flight along an explicit unit direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RayShot {
    pub position: Vec3,
    /// Unit travel direction.
    pub direction: Vec3,
    pub owner: ShotOwner,
    pub velocity: f32,
    pub radius: f32,
    /// Set once the depth coordinate exits the playfield; the shot is swept
    /// out of its collection in the same update call.
    pub left_field: bool,
}

impl RayShot {
    pub fn new(position: Vec3, direction: Vec3, owner: ShotOwner) -> Self {
        let (velocity, radius) = match owner {
            ShotOwner::Player => (PLAYER_SHOT_VELOCITY, PLAYER_SHOT_RADIUS),
            ShotOwner::Alien => (ALIEN_SHOT_VELOCITY, ALIEN_SHOT_RADIUS),
        };
        Self {
            position,
            direction,
            owner,
            velocity,
            radius,
            left_field: false,
        }
    }

    pub fn update(&mut self, delta: f32) {
        self.position += self.direction * self.velocity * delta;
        if self.position.z > PLAYFIELD_MAX_Z || self.position.z < PLAYFIELD_MIN_Z {
            self.left_field = true;
        }
    }
}

/// A purely visual explosion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub position: Vec3,
    pub elapsed: f32,
}

impl Explosion {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            elapsed: 0.0,
        }
    }

    pub fn update(&mut self, delta: f32) {
        self.elapsed += delta;
    }

    /// Animation progress in `[0, 1)` for sprite-frame selection.
    pub fn progress(&self) -> f32 {
        (self.elapsed / EXPLOSION_LIVE_TIME).clamp(0.0, 1.0 - f32::EPSILON)
    }
}

/// A queued fire command from the input path.
///
/// Input handling may run on a different thread than the frame loop; instead
/// of sharing the shot list under a lock, fire requests queue here and drain
/// at a fixed point inside `update`, which keeps ordering deterministic.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FireCommand {
    /// Screen-tap point; spawns a vertical shot at that point.
    At(Vec3),
    /// Explicit pick ray.
    Ray { origin: Vec3, direction: Vec3 },
}

/// The owned game world: every entity collection, the score/wave counters,
/// the seeded RNG and the injected event listener.
pub struct Simulation {
    pub ship: Ship,
    pub aliens: Vec<Alien>,
    pub blocks: Vec<Block>,
    pub player_shots: Vec<RayShot>,
    pub alien_shots: Vec<RayShot>,
    /// Explosions from ship hits and alien deaths.
    pub explosions: Vec<Explosion>,
    /// Explosions from shot interceptions; kept separate so the renderer can
    /// pick a different sprite.
    pub bomb_explosions: Vec<Explosion>,
    pub score: u32,
    pub wave: u32,
    /// Scales alien speed and fire probability; grows by a fixed increment
    /// per wave and never decreases.
    pub multiplier: f32,
    pub(crate) rng: Pcg32,
    pub(crate) listener: Box<dyn SimulationListener>,
    pub(crate) pending_fire: Vec<FireCommand>,
    orientation: OrientationFilter,
}

impl Simulation {
    /// World with a listener that discards events; tests mostly use this.
    pub fn new(seed: u64) -> Self {
        Self::with_listener(seed, Box::new(NullListener))
    }

    pub fn with_listener(seed: u64, listener: Box<dyn SimulationListener>) -> Self {
        let mut sim = Self {
            ship: Ship::new(),
            aliens: Vec::new(),
            blocks: Vec::new(),
            player_shots: Vec::new(),
            alien_shots: Vec::new(),
            explosions: Vec::new(),
            bomb_explosions: Vec::new(),
            score: 0,
            wave: 1,
            multiplier: 1.0,
            rng: Pcg32::seed_from_u64(seed),
            listener,
            pending_fire: Vec::new(),
            orientation: OrientationFilter::default(),
        };
        sim.spawn_wave();
        sim
    }

    /// Populate the alien grid and shield blocks for the current wave.
    /// Vertical offsets are randomized per alien so the grid shimmers.
    pub(crate) fn spawn_wave(&mut self) {
        for row in 0..ALIEN_ROWS {
            for column in 0..ALIEN_COLUMNS {
                let position = Vec3::new(
                    -PLAYFIELD_MAX_X / 2.0 + column as f32 * ALIEN_PITCH,
                    self.rng.random_range(0..ALIEN_MAX_ALTITUDE) as f32,
                    PLAYFIELD_MIN_Z + row as f32 * ALIEN_PITCH,
                );
                self.aliens.push(Alien::new(position));
            }
        }

        for shield in 0..3 {
            let center_x = -10.0 + shield as f32 * 10.0;
            for (dx, dz) in [(-1.0, -2.0), (-1.0, -3.0), (0.0, -3.0), (1.0, -3.0), (1.0, -2.0)] {
                self.blocks
                    .push(Block::new(Vec3::new(center_x + dx, 0.0, dz)));
            }
        }
    }

    /// Advance the world one frame.
    pub fn update(&mut self, delta: f32) {
        super::tick::update(self, delta);
    }

    //
    // Player input surface
    //

    pub fn move_left(&mut self, delta: f32, scale: f32) {
        if self.ship.exploding {
            return;
        }
        self.ship.position.x =
            (self.ship.position.x - delta * SHIP_SPEED * scale).max(PLAYFIELD_MIN_X);
    }

    pub fn move_right(&mut self, delta: f32, scale: f32) {
        if self.ship.exploding {
            return;
        }
        self.ship.position.x =
            (self.ship.position.x + delta * SHIP_SPEED * scale).min(PLAYFIELD_MAX_X);
    }

    /// Queue a vertical shot at a tap point; drained on the next `update`.
    pub fn fire_at(&mut self, point: Vec3) {
        self.pending_fire.push(FireCommand::At(point));
    }

    /// Queue a directed ray-shot; drained on the next `update`.
    pub fn fire_ray(&mut self, origin: Vec3, direction: Vec3) {
        self.pending_fire.push(FireCommand::Ray { origin, direction });
    }

    /// Feed one raw device attitude sample into the aim filter.
    pub fn update_orientation(&mut self, azimuth: f32, pitch: f32, roll: f32) {
        self.orientation.ingest(azimuth, pitch, roll);
    }

    /// Smoothed camera-aim azimuth, degrees
    pub fn azimuth(&self) -> f32 {
        self.orientation.azimuth()
    }

    /// Smoothed camera-aim pitch, degrees
    pub fn pitch(&self) -> f32 {
        self.orientation.pitch()
    }

    /// Smoothed camera-aim roll, degrees
    pub fn roll(&self) -> f32 {
        self.orientation.roll()
    }
}
