//! Device-orientation smoothing
//!
//! Raw attitude samples from the device are noisy enough to make the camera
//! jitter. A bounded sliding-window average over the most recent samples
//! produces the effective aim signal.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::ORIENTATION_WINDOW;

/// One attitude sample after remapping to the camera's axis convention,
/// angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Angle left or right of the vertical
    pub azimuth: f32,
    /// Angle above or below the horizon
    pub pitch: f32,
    /// Angle about the view direction
    pub roll: f32,
}

/// Bounded moving average over recent device attitude samples.
///
/// The smoothed channels hold their last value while the window is empty;
/// the average is only ever taken over a non-empty window.
#[derive(Debug, Clone)]
pub struct OrientationFilter {
    window: VecDeque<Orientation>,
    capacity: usize,
    azimuth: f32,
    pitch: f32,
    roll: f32,
}

impl Default for OrientationFilter {
    fn default() -> Self {
        Self::new(ORIENTATION_WINDOW)
    }
}

impl OrientationFilter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
            azimuth: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    /// Feed one raw device sample.
    ///
    /// The device reports angles in its own frame; the camera wants them
    /// remapped: azimuth negated, the pitch channel takes the negated roll
    /// offset by -90 degrees, and the roll channel takes the negated pitch.
    /// The mapping must match the device-to-camera convention exactly or the
    /// aim drifts.
    pub fn ingest(&mut self, azimuth: f32, pitch: f32, roll: f32) {
        self.window.push_back(Orientation {
            azimuth: -azimuth,
            pitch: -roll - 90.0,
            roll: -pitch,
        });
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.window.is_empty() {
            return;
        }
        let mut azimuth = 0.0;
        let mut pitch = 0.0;
        let mut roll = 0.0;
        for sample in &self.window {
            azimuth += sample.azimuth;
            pitch += sample.pitch;
            roll += sample.roll;
        }
        let count = self.window.len() as f32;
        self.azimuth = azimuth / count;
        self.pitch = pitch / count;
        self.roll = roll / count;
    }

    /// Smoothed azimuth, degrees
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    /// Smoothed pitch, degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Smoothed roll, degrees
    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
