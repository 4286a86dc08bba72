//! Per-frame update
//!
//! Phase order is load-bearing: commands drain first, then entities advance,
//! then collisions resolve, then the wave check runs. Collision checks are
//! first-match, not closest-match, and at most one alien dies to player fire
//! per frame; both are deliberate pacing policies, not shortcuts.
//!
//! Removal is always mark-then-sweep or deferred-by-index; nothing mutates a
//! collection while iterating it.

use glam::Vec3;
use rand::Rng;

use super::collision::within;
use super::state::{Explosion, FireCommand, RayShot, ShotOwner, Simulation};
use crate::consts::*;

/// Advance the simulation by `delta` seconds.
///
/// A non-positive delta is a no-op: nothing moves, no dice are rolled, and
/// queued commands stay queued for the next real frame.
pub fn update(sim: &mut Simulation, delta: f32) {
    if delta <= 0.0 {
        return;
    }

    drain_fire_commands(sim);
    sim.ship.update(delta);
    update_aliens(sim, delta);
    update_shots(sim, delta);
    update_explosions(sim, delta);
    check_ship_collision(sim);
    check_alien_collision(sim);
    check_block_collision(sim);
    check_wave_advance(sim);
}

/// Turn queued fire commands into live shots, subject to the live-shot cap
/// and the exploding lockout. Rejection is a policy decision, not an error.
fn drain_fire_commands(sim: &mut Simulation) {
    let pending = std::mem::take(&mut sim.pending_fire);
    for command in pending {
        if sim.ship.exploding {
            log::debug!("fire ignored: ship is exploding");
            continue;
        }
        if sim.player_shots.len() >= MAX_PLAYER_SHOTS {
            log::debug!(
                "fire ignored: {} shots already live",
                sim.player_shots.len()
            );
            continue;
        }
        let shot = match command {
            FireCommand::At(point) => RayShot::new(point, Vec3::NEG_Z, ShotOwner::Player),
            FireCommand::Ray { origin, direction } => {
                RayShot::new(origin, direction.normalize_or_zero(), ShotOwner::Player)
            }
        };
        sim.player_shots.push(shot);
        sim.listener.shot_fired();
    }
}

fn update_aliens(sim: &mut Simulation, delta: f32) {
    for alien in &mut sim.aliens {
        alien.update(delta, sim.multiplier);
    }
}

fn update_shots(sim: &mut Simulation, delta: f32) {
    for shot in sim
        .player_shots
        .iter_mut()
        .chain(sim.alien_shots.iter_mut())
    {
        shot.update(delta);
    }
    sim.player_shots.retain(|shot| !shot.left_field);
    sim.alien_shots.retain(|shot| !shot.left_field);

    // Player shots duel alien shots: first match wins, and a spent player
    // shot takes no further part this frame.
    let mut dead_player = vec![false; sim.player_shots.len()];
    let mut dead_alien = vec![false; sim.alien_shots.len()];
    for (p, shot) in sim.player_shots.iter().enumerate() {
        for (a, enemy) in sim.alien_shots.iter().enumerate() {
            if dead_alien[a] {
                continue;
            }
            if within(enemy.position, shot.position, shot.radius + enemy.radius) {
                dead_player[p] = true;
                dead_alien[a] = true;
                sim.bomb_explosions.push(Explosion::new(enemy.position));
                sim.score += INTERCEPT_POINTS;
                sim.listener.score_pop();
                break;
            }
        }
    }
    sweep(&mut sim.player_shots, &dead_player);
    sweep(&mut sim.alien_shots, &dead_alien);

    // A random alien returns fire, aimed at the origin; later waves fire
    // more often.
    if !sim.aliens.is_empty() && sim.rng.random::<f32>() < ALIEN_FIRE_CHANCE * sim.multiplier {
        let index = sim.rng.random_range(0..sim.aliens.len());
        let position = sim.aliens[index].position;
        let direction = (Vec3::ZERO - position).normalize_or_zero();
        sim.alien_shots
            .push(RayShot::new(position, direction, ShotOwner::Alien));
        sim.listener.shot_fired();
    }
}

/// Drop the entries flagged in `dead`, preserving order.
fn sweep(shots: &mut Vec<RayShot>, dead: &[bool]) {
    let mut index = 0;
    shots.retain(|_| {
        let keep = !dead[index];
        index += 1;
        keep
    });
}

fn update_explosions(sim: &mut Simulation, delta: f32) {
    for explosion in sim
        .explosions
        .iter_mut()
        .chain(sim.bomb_explosions.iter_mut())
    {
        explosion.update(delta);
    }
    sim.explosions.retain(|e| e.elapsed <= EXPLOSION_LIVE_TIME);
    sim.bomb_explosions
        .retain(|e| e.elapsed <= EXPLOSION_LIVE_TIME);
}

fn check_ship_collision(sim: &mut Simulation) {
    // First alien shot to connect costs a life; any others wait for the
    // next frame.
    if let Some(hit) = sim
        .alien_shots
        .iter()
        .position(|shot| within(shot.position, sim.ship.position, SHIP_RADIUS))
    {
        sim.alien_shots.remove(hit);
        sim.ship.lives = sim.ship.lives.saturating_sub(1);
        sim.ship.exploding = true;
        sim.ship.explode_time = 0.0;
        sim.explosions.push(Explosion::new(sim.ship.position));
        sim.listener.explosion();
    }

    // A ramming alien takes itself out with the ship.
    if let Some(hit) = sim
        .aliens
        .iter()
        .position(|alien| within(alien.position, sim.ship.position, SHIP_RADIUS))
    {
        let alien = sim.aliens.remove(hit);
        sim.ship.lives = sim.ship.lives.saturating_sub(1);
        sim.ship.exploding = true;
        sim.ship.explode_time = 0.0;
        sim.explosions.push(Explosion::new(alien.position));
        sim.explosions.push(Explosion::new(sim.ship.position));
        sim.listener.explosion();
    }
}

fn check_alien_collision(sim: &mut Simulation) {
    if sim.player_shots.is_empty() {
        return;
    }

    // Brute force, first match. At most one alien dies per frame; the outer
    // scan stops after the first kill.
    let mut hit = None;
    'aliens: for a in 0..sim.aliens.len() {
        for s in 0..sim.player_shots.len() {
            if within(
                sim.aliens[a].position,
                sim.player_shots[s].position,
                ALIEN_RADIUS,
            ) {
                hit = Some((a, s));
                break 'aliens;
            }
        }
    }

    if let Some((a, s)) = hit {
        let alien = sim.aliens.remove(a);
        sim.player_shots.remove(s);
        sim.explosions.push(Explosion::new(alien.position));
        sim.score += ALIEN_POINTS;
        sim.listener.explosion();
    }
}

fn check_block_collision(sim: &mut Simulation) {
    if sim.blocks.is_empty() {
        return;
    }

    let blocks = &sim.blocks;
    let mut dead_blocks = vec![false; blocks.len()];
    let mut cull = |shots: &mut Vec<RayShot>| {
        shots.retain(|shot| {
            for (b, block) in blocks.iter().enumerate() {
                if !dead_blocks[b] && within(block.position, shot.position, BLOCK_RADIUS) {
                    dead_blocks[b] = true;
                    return false;
                }
            }
            true
        });
    };
    cull(&mut sim.player_shots);
    cull(&mut sim.alien_shots);

    let mut index = 0;
    sim.blocks.retain(|_| {
        let keep = !dead_blocks[index];
        index += 1;
        keep
    });
}

/// Wave advance: fires iff the field is clear of aliens and the ship still
/// has lives. Ship position and lives carry over; everything else resets.
fn check_wave_advance(sim: &mut Simulation) {
    if !sim.aliens.is_empty() || sim.ship.lives == 0 {
        return;
    }

    sim.blocks.clear();
    sim.player_shots.clear();
    sim.alien_shots.clear();
    sim.spawn_wave();
    sim.multiplier += MULTIPLIER_INCREMENT;
    sim.wave += 1;
    log::info!(
        "wave {} cleared; wave {} at multiplier {:.1}",
        sim.wave - 1,
        sim.wave,
        sim.multiplier
    );
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::super::listener::SimulationListener;
    use super::super::state::{Alien, Simulation};
    use super::*;

    /// Counts listener callbacks through shared cells so the test can keep
    /// reading after the box moves into the simulation.
    #[derive(Default)]
    struct CountingListener {
        explosions: Rc<Cell<u32>>,
        shots: Rc<Cell<u32>>,
        pops: Rc<Cell<u32>>,
    }

    impl SimulationListener for CountingListener {
        fn explosion(&mut self) {
            self.explosions.set(self.explosions.get() + 1);
        }
        fn shot_fired(&mut self) {
            self.shots.set(self.shots.get() + 1);
        }
        fn score_pop(&mut self) {
            self.pops.set(self.pops.get() + 1);
        }
    }

    fn counting_sim(seed: u64) -> (Simulation, Rc<Cell<u32>>, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let listener = CountingListener::default();
        let explosions = listener.explosions.clone();
        let shots = listener.shots.clone();
        let pops = listener.pops.clone();
        (
            Simulation::with_listener(seed, Box::new(listener)),
            explosions,
            shots,
            pops,
        )
    }

    #[test]
    fn test_zero_delta_is_a_no_op() {
        let mut sim = Simulation::new(42);
        let ship_x = sim.ship.position.x;
        let alien_positions: Vec<_> = sim.aliens.iter().map(|a| a.position).collect();

        sim.update(0.0);

        assert_eq!(sim.score, 0);
        assert_eq!(sim.wave, 1);
        assert_eq!(sim.ship.lives, SHIP_LIVES);
        assert_eq!(sim.ship.position.x, ship_x);
        assert!(sim.player_shots.is_empty() && sim.alien_shots.is_empty());
        for (alien, expected) in sim.aliens.iter().zip(alien_positions) {
            assert_eq!(alien.position, expected);
        }
    }

    #[test]
    fn test_ship_hit_by_alien_shot() {
        let (mut sim, explosions, _, _) = counting_sim(7);
        sim.alien_shots.push(RayShot::new(
            sim.ship.position,
            Vec3::Z,
            ShotOwner::Alien,
        ));

        sim.update(0.001);

        assert_eq!(sim.ship.lives, SHIP_LIVES - 1);
        assert!(sim.ship.exploding);
        assert_eq!(sim.explosions.len(), 1);
        assert_eq!(sim.explosions[0].position, sim.ship.position);
        assert_eq!(explosions.get(), 1);
        // The offending shot is gone; any survivor is unrelated random fire.
        assert!(
            sim.alien_shots
                .iter()
                .all(|s| !within(s.position, sim.ship.position, SHIP_RADIUS))
        );
    }

    #[test]
    fn test_ramming_alien_spawns_two_explosions() {
        let mut sim = Simulation::new(11);
        sim.aliens.clear();
        sim.aliens.push(Alien::new(sim.ship.position));

        check_ship_collision(&mut sim);

        assert_eq!(sim.ship.lives, SHIP_LIVES - 1);
        assert!(sim.ship.exploding);
        assert!(sim.aliens.is_empty());
        assert_eq!(sim.explosions.len(), 2);
    }

    #[test]
    fn test_fire_rejected_at_shot_cap() {
        let mut sim = Simulation::new(13);
        for i in 0..MAX_PLAYER_SHOTS {
            sim.player_shots.push(RayShot::new(
                Vec3::new(i as f32 - 4.0, 10.0, 0.0),
                Vec3::NEG_Z,
                ShotOwner::Player,
            ));
        }

        sim.fire_at(Vec3::new(0.0, 10.0, 0.0));
        sim.update(0.001);

        assert_eq!(sim.player_shots.len(), MAX_PLAYER_SHOTS);
    }

    #[test]
    fn test_fire_accepted_below_cap() {
        let (mut sim, _, shots_fired, _) = counting_sim(13);
        sim.fire_at(Vec3::new(0.0, 10.0, 0.0));
        sim.update(0.001);
        assert_eq!(sim.player_shots.len(), 1);
        assert!(shots_fired.get() >= 1);
    }

    #[test]
    fn test_fire_rejected_while_exploding() {
        let mut sim = Simulation::new(17);
        sim.ship.exploding = true;
        sim.fire_at(Vec3::new(0.0, 10.0, 0.0));
        sim.update(0.001);
        assert!(sim.player_shots.is_empty());
    }

    #[test]
    fn test_shot_interception() {
        let (mut sim, _, _, pops) = counting_sim(19);
        // Clear the field so only the duel and the wave advance can act.
        sim.aliens.clear();
        let meeting_point = Vec3::new(5.0, 8.0, -5.0);
        sim.player_shots
            .push(RayShot::new(meeting_point, Vec3::NEG_Z, ShotOwner::Player));
        sim.alien_shots
            .push(RayShot::new(meeting_point, Vec3::Z, ShotOwner::Alien));

        sim.update(0.001);

        assert_eq!(sim.bomb_explosions.len(), 1);
        assert_eq!(sim.score, INTERCEPT_POINTS);
        assert_eq!(pops.get(), 1);
        // Both shots died in the duel, then the wave advance swept the field.
        assert!(sim.player_shots.is_empty() && sim.alien_shots.is_empty());
        assert_eq!(sim.wave, 2);
    }

    #[test]
    fn test_left_field_shots_removed_same_frame() {
        let mut sim = Simulation::new(23);
        sim.player_shots.push(RayShot::new(
            Vec3::new(0.0, 10.0, PLAYFIELD_MIN_Z + 0.05),
            Vec3::NEG_Z,
            ShotOwner::Player,
        ));
        sim.alien_shots.push(RayShot::new(
            Vec3::new(5.0, 10.0, PLAYFIELD_MAX_Z - 0.01),
            Vec3::Z,
            ShotOwner::Alien,
        ));

        sim.update(0.01);

        assert!(sim.player_shots.is_empty());
        assert!(sim.alien_shots.iter().all(|s| !s.left_field));
    }

    #[test]
    fn test_single_alien_kill_per_frame() {
        let mut sim = Simulation::new(29);
        sim.aliens.clear();
        sim.aliens.push(Alien::new(Vec3::new(-5.0, 0.0, -5.0)));
        sim.aliens.push(Alien::new(Vec3::new(5.0, 0.0, -5.0)));
        sim.player_shots.push(RayShot::new(
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::NEG_Z,
            ShotOwner::Player,
        ));
        sim.player_shots.push(RayShot::new(
            Vec3::new(5.0, 0.0, -5.0),
            Vec3::NEG_Z,
            ShotOwner::Player,
        ));

        sim.update(0.001);

        // Both pairs overlap, but only the first alien dies this frame.
        assert_eq!(sim.aliens.len(), 1);
        assert_eq!(sim.player_shots.len(), 1);
        assert_eq!(sim.score, ALIEN_POINTS);
        assert_eq!(sim.explosions.len(), 1);
    }

    #[test]
    fn test_block_destroyed_with_shot() {
        let mut sim = Simulation::new(31);
        let block_position = sim.blocks[0].position;
        let block_count = sim.blocks.len();
        sim.player_shots
            .push(RayShot::new(block_position, Vec3::NEG_Z, ShotOwner::Player));

        sim.update(0.001);

        assert_eq!(sim.blocks.len(), block_count - 1);
        assert!(sim.player_shots.is_empty());
    }

    #[test]
    fn test_wave_advance_preserves_ship() {
        let mut sim = Simulation::new(37);
        sim.move_right(0.25, 1.0);
        let ship_x = sim.ship.position.x;
        sim.aliens.clear();
        sim.alien_shots
            .push(RayShot::new(Vec3::new(9.0, 9.0, -9.0), Vec3::Z, ShotOwner::Alien));

        sim.update(0.001);

        assert_eq!(sim.wave, 2);
        assert!((sim.multiplier - (1.0 + MULTIPLIER_INCREMENT)).abs() < 1e-5);
        assert_eq!(sim.aliens.len(), (ALIEN_ROWS * ALIEN_COLUMNS) as usize);
        assert_eq!(sim.blocks.len(), 15);
        assert!(sim.player_shots.is_empty() && sim.alien_shots.is_empty());
        assert_eq!(sim.ship.position.x, ship_x);
        assert_eq!(sim.ship.lives, SHIP_LIVES);
    }

    #[test]
    fn test_no_wave_advance_without_lives() {
        let mut sim = Simulation::new(41);
        sim.aliens.clear();
        sim.ship.lives = 0;

        sim.update(0.001);

        assert!(sim.aliens.is_empty());
        assert_eq!(sim.wave, 1);
        assert!((sim.multiplier - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_exploding_ship_recovers_after_countdown() {
        let mut sim = Simulation::new(43);
        // Empty field with no lives: nothing respawns, nothing fires.
        sim.aliens.clear();
        sim.ship.lives = 0;
        sim.ship.exploding = true;

        for _ in 0..22 {
            sim.update(0.05);
        }

        assert!(!sim.ship.exploding);
    }

    #[test]
    fn test_determinism_across_same_seed() {
        let mut a = Simulation::new(99);
        let mut b = Simulation::new(99);
        for frame in 0..600 {
            if frame % 30 == 0 {
                a.fire_at(Vec3::new(0.0, 2.0, 0.0));
                b.fire_at(Vec3::new(0.0, 2.0, 0.0));
            }
            a.move_left(1.0 / 60.0, 0.5);
            b.move_left(1.0 / 60.0, 0.5);
            a.update(1.0 / 60.0);
            b.update(1.0 / 60.0);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.wave, b.wave);
        assert_eq!(a.aliens.len(), b.aliens.len());
        assert_eq!(a.alien_shots.len(), b.alien_shots.len());
        assert_eq!(a.aliens[0].position, b.aliens[0].position);
    }

    proptest! {
        #[test]
        fn prop_aliens_stay_inside_horizontal_bounds(
            seed in any::<u64>(),
            steps in prop::collection::vec(0.001f32..0.1, 1..200),
        ) {
            let mut sim = Simulation::new(seed);
            for dt in steps {
                sim.update(dt);
                for alien in &sim.aliens {
                    prop_assert!(alien.position.x >= PLAYFIELD_MIN_X);
                    prop_assert!(alien.position.x <= PLAYFIELD_MAX_X);
                }
            }
        }

        #[test]
        fn prop_score_and_wave_never_decrease(
            seed in any::<u64>(),
            steps in prop::collection::vec(0.001f32..0.1, 1..100),
        ) {
            let mut sim = Simulation::new(seed);
            let mut last_score = sim.score;
            let mut last_wave = sim.wave;
            let mut last_multiplier = sim.multiplier;
            for (i, dt) in steps.into_iter().enumerate() {
                if i % 7 == 0 {
                    sim.fire_at(Vec3::new(0.0, 2.0, 0.0));
                }
                sim.update(dt);
                prop_assert!(sim.score >= last_score);
                prop_assert!(sim.wave >= last_wave);
                prop_assert!(sim.multiplier >= last_multiplier);
                last_score = sim.score;
                last_wave = sim.wave;
                last_multiplier = sim.multiplier;
            }
        }
    }
}
