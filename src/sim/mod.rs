//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only (alien fire rolls, wave spawn offsets)
//! - Fixed phase order inside `update`
//! - No rendering, audio or platform dependencies
//!
//! The host injects a [`SimulationListener`] for observable events and reads
//! the entity collections back between frames.

pub mod collision;
pub mod listener;
pub mod orientation;
pub mod state;
pub mod tick;

pub use collision::within;
pub use listener::{NullListener, SimulationListener};
pub use orientation::{Orientation, OrientationFilter};
pub use state::{Alien, AlienState, Block, Explosion, RayShot, Ship, ShotOwner, Simulation};
pub use tick::update;
