//! Moonraid headless demo
//!
//! Runs the simulation at a fixed timestep with a scripted player so the
//! whole engine loop can be exercised (and profiled) without a renderer.

use glam::Vec3;
use moonraid::consts::*;
use moonraid::{Simulation, SimulationListener};

/// Forwards simulation events to the log, standing in for the audio layer.
struct LoggingListener;

impl SimulationListener for LoggingListener {
    fn explosion(&mut self) {
        log::debug!("event: explosion");
    }
    fn shot_fired(&mut self) {
        log::debug!("event: shot fired");
    }
    fn score_pop(&mut self) {
        log::debug!("event: score pop");
    }
}

fn main() {
    env_logger::init();

    let seed = 0xC0FFEE;
    let mut sim = Simulation::with_listener(seed, Box::new(LoggingListener));
    log::info!("starting demo run, seed {seed:#x}");

    let dt = 1.0 / 60.0;
    let frames = 60 * 60; // one simulated minute

    for frame in 0..frames {
        // Sweep the ship back and forth across the playfield.
        if (frame / 300) % 2 == 0 {
            sim.move_right(dt, 0.5);
        } else {
            sim.move_left(dt, 0.5);
        }

        // Fire a few times a second at whichever alien leads the pack.
        if frame % 20 == 0 {
            if let Some(target) = sim.aliens.first() {
                let origin = Vec3::new(sim.ship.position.x, 0.0, PLAYFIELD_MAX_Z);
                let direction = target.position - origin;
                sim.fire_ray(origin, direction);
            }
        }

        // Synthesize a gentle device wobble for the aim filter.
        let t = frame as f32 * dt;
        sim.update_orientation(5.0 * t.sin(), 3.0 * (t * 0.7).cos(), 2.0 * t.cos());

        sim.update(dt);

        if sim.ship.lives == 0 {
            log::info!("ship destroyed on frame {frame}");
            break;
        }
    }

    log::info!(
        "demo finished: score {}, wave {}, lives {}, aim ({:.1}, {:.1}, {:.1})",
        sim.score,
        sim.wave,
        sim.ship.lives,
        sim.azimuth(),
        sim.pitch(),
        sim.roll()
    );
}
