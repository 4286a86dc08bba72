//! Proximity tests
//!
//! Every collision in the game reduces to a point/sphere distance check;
//! there is no swept or mesh-based detection.

use glam::Vec3;

/// True when `a` and `b` are closer than `radius`.
#[inline]
pub fn within(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}
