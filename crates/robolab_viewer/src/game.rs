//! Projectile mini-game
//!
//! Projectiles spawn on a ring around the robot and fly toward a jittered
//! point near its base. Each live projectile has exactly one outcome per
//! frame: it keeps flying, expires, or strikes the robot. Clicking one
//! while the game is active destroys it for a point.

use crate::config::GameConfig;
use crate::notify::Notification;
use rand::Rng;
use robolab_3d::{Geometry, NodeId, SceneGraph, StandardMaterial, Transform};
use robolab_core::{BoundingSphere, Color, Ray, Vec3};
use robolab_animation::Countdown;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    Inactive,
    Active,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub node: NodeId,
    pub velocity: Vec3,
    /// Seconds left before the projectile expires
    pub ttl: f32,
    /// Radians per second
    pub spin: f32,
}

enum Outcome {
    Flying,
    Expired,
    Contact,
}

#[derive(Debug)]
pub struct MiniGame {
    phase: GamePhase,
    score: u32,
    life: u32,
    life_max: u32,
    spawn_timer: Countdown,
    projectiles: Vec<Projectile>,
    container: NodeId,
}

impl MiniGame {
    /// Create an inactive game whose projectiles live under `parent`
    pub fn new(scene: &mut SceneGraph, parent: NodeId, config: &GameConfig) -> Self {
        Self {
            phase: GamePhase::Inactive,
            score: 0,
            life: config.life_max,
            life_max: config.life_max,
            spawn_timer: Countdown::new(config.spawn_interval),
            projectiles: Vec::new(),
            container: scene.spawn_group(parent, "projectiles", Transform::IDENTITY),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn life(&self) -> (u32, u32) {
        (self.life, self.life_max)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Reset score and life and begin spawning
    pub fn start(&mut self, scene: &mut SceneGraph, config: &GameConfig, out: &mut Vec<Notification>) {
        self.clear_projectiles(scene);
        self.score = 0;
        self.life_max = config.life_max;
        self.life = config.life_max;
        self.spawn_timer.reset(config.spawn_interval);
        self.phase = GamePhase::Active;
        tracing::info!(life = self.life, "game started");

        out.push(Notification::GameScore { score: 0 });
        out.push(Notification::Life {
            value: self.life,
            max: self.life_max,
        });
    }

    /// Stop spawning and clear projectiles; score and life are kept
    pub fn stop(&mut self, scene: &mut SceneGraph) {
        self.clear_projectiles(scene);
        if self.phase == GamePhase::Active {
            tracing::info!(score = self.score, "game stopped");
        }
        self.phase = GamePhase::Inactive;
    }

    /// One frame of spawning and projectile motion
    ///
    /// `base` is the robot's position on the floor.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        scene: &mut SceneGraph,
        config: &GameConfig,
        rng: &mut R,
        base: Vec3,
        dt: f32,
        out: &mut Vec<Notification>,
    ) {
        if self.phase != GamePhase::Active {
            return;
        }

        if self.spawn_timer.tick(dt) {
            self.spawn(scene, config, rng, base);
            let [lo, hi] = config.interval_jitter;
            self.spawn_timer
                .reset(config.spawn_interval * rng.gen_range(lo..=hi));
        }

        let contact = base + Vec3::new(0.0, config.contact_height, 0.0);
        let mut i = 0;
        while i < self.projectiles.len() {
            let p = &mut self.projectiles[i];
            p.ttl -= dt;
            let outcome = match scene.transform_mut(p.node) {
                Some(t) => {
                    t.position += p.velocity * dt;
                    t.rotation.x += p.spin * dt;
                    t.rotation.y += p.spin * 0.7 * dt;
                    if p.ttl <= 0.0 {
                        Outcome::Expired
                    } else if t.position.distance(contact) <= config.contact_radius {
                        Outcome::Contact
                    } else {
                        Outcome::Flying
                    }
                }
                None => Outcome::Expired,
            };

            match outcome {
                Outcome::Flying => i += 1,
                Outcome::Expired => {
                    let p = self.projectiles.swap_remove(i);
                    scene.despawn(p.node);
                }
                Outcome::Contact => {
                    let p = self.projectiles.swap_remove(i);
                    scene.despawn(p.node);
                    self.life = self.life.saturating_sub(1);
                    tracing::debug!(life = self.life, "projectile hit the robot");
                    out.push(Notification::Life {
                        value: self.life,
                        max: self.life_max,
                    });
                    if self.life == 0 {
                        self.game_over(scene, out);
                        return;
                    }
                }
            }
        }
    }

    /// Destroy the nearest projectile under the ray
    ///
    /// Only active games accept clicks. Returns whether one was hit.
    pub fn click(
        &mut self,
        scene: &mut SceneGraph,
        config: &GameConfig,
        ray: &Ray,
        out: &mut Vec<Notification>,
    ) -> bool {
        if self.phase != GamePhase::Active {
            return false;
        }
        let nearest = self
            .projectiles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let center = scene.transform(p.node)?.position;
                let distance = ray.intersect_sphere(&BoundingSphere::new(center, config.pick_radius))?;
                Some((i, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((index, _)) = nearest else {
            return false;
        };
        let p = self.projectiles.swap_remove(index);
        scene.despawn(p.node);
        self.score += 1;
        tracing::debug!(score = self.score, "projectile intercepted");
        out.push(Notification::GameScore { score: self.score });
        true
    }

    /// Remove every projectile node; used on unmount
    pub fn dispose(&mut self, scene: &mut SceneGraph) {
        self.clear_projectiles(scene);
        self.phase = GamePhase::Inactive;
    }

    fn game_over(&mut self, scene: &mut SceneGraph, out: &mut Vec<Notification>) {
        self.phase = GamePhase::GameOver;
        self.clear_projectiles(scene);
        tracing::info!(score = self.score, "game over");
        out.push(Notification::GameOver { score: self.score });
    }

    fn clear_projectiles(&mut self, scene: &mut SceneGraph) {
        for p in self.projectiles.drain(..) {
            scene.despawn(p.node);
        }
    }

    fn spawn<R: Rng + ?Sized>(&mut self, scene: &mut SceneGraph, config: &GameConfig, rng: &mut R, base: Vec3) {
        let angle = rng.gen_range(0.0..TAU);
        let [h_lo, h_hi] = config.spawn_height;
        let origin = base
            + Vec3::new(
                angle.cos() * config.ring_radius,
                rng.gen_range(h_lo..=h_hi),
                angle.sin() * config.ring_radius,
            );
        let j = config.aim_jitter;
        let aim = base
            + Vec3::new(
                rng.gen_range(-j..=j),
                config.contact_height,
                rng.gen_range(-j..=j),
            );
        let [s_lo, s_hi] = config.projectile_speed;
        let speed = rng.gen_range(s_lo..=s_hi);
        let [r_lo, r_hi] = config.spin_rate;
        let spin = rng.gen_range(r_lo..=r_hi);

        let ttl = origin.distance(aim) / speed + config.ttl_margin;
        let velocity = (aim - origin).normalize() * speed;
        self.insert(scene, config, origin, velocity, ttl, spin);
    }

    fn insert(
        &mut self,
        scene: &mut SceneGraph,
        config: &GameConfig,
        position: Vec3,
        velocity: Vec3,
        ttl: f32,
        spin: f32,
    ) -> NodeId {
        let node = scene.spawn_mesh(
            self.container,
            "projectile",
            Transform::from_position(position),
            Geometry::sphere(config.projectile_radius),
            StandardMaterial::from_hex(0xef4444).with_emissive(Color::from_hex(0xf87171), 0.5),
        );
        self.projectiles.push(Projectile {
            node,
            velocity,
            ttl,
            spin,
        });
        node
    }

    /// Place a projectile directly, bypassing the spawner
    #[cfg(test)]
    pub(crate) fn inject_projectile(
        &mut self,
        scene: &mut SceneGraph,
        config: &GameConfig,
        position: Vec3,
        velocity: Vec3,
        ttl: f32,
    ) -> NodeId {
        self.insert(scene, config, position, velocity, ttl, 0.0)
    }
}
