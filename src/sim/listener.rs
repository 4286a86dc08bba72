//! Outbound event sink
//!
//! The engine owns no audio or UI resources; it reports observable events
//! through this capability and never blocks on the callee.

/// Fire-and-forget callbacks for audio/score-popup side effects.
///
/// Injected at construction; the engine calls these from inside `update`.
pub trait SimulationListener {
    /// An explosion was spawned (ship hit or alien destroyed).
    fn explosion(&mut self);
    /// A shot was fired, by the player or by an alien.
    fn shot_fired(&mut self);
    /// A player shot intercepted an alien shot.
    fn score_pop(&mut self);
}

/// Listener that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl SimulationListener for NullListener {
    fn explosion(&mut self) {}
    fn shot_fired(&mut self) {}
    fn score_pop(&mut self) {}
}
