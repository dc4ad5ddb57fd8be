use glam::{Mat4, Vec3};
use seascape_common::Sampler;
use seascape_render::{FrameRenderer, MeshDraw};

use crate::config::{ConfigError, ParticleSystemConfig};

/// Hard bound on particles created by one frame, whatever the rate.
pub const MAX_SPAWN_PER_FRAME: usize = 65_536;

/// A live particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds left before the particle is culled.
    pub remaining_lifetime: f32,
}

/// Owns the particle pool and advances it once per frame.
///
/// The pool is unordered: culling may move survivors around, and no
/// particle has an identity beyond its slot in the current frame.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    config: ParticleSystemConfig,
    /// Unit emission axis.
    direction: Vec3,
    /// Fixed axis for the polar tilt, perpendicular to `direction`.
    perpendicular: Vec3,
    particles: Vec<Particle>,
    sampler: Sampler,
}

impl ParticleSystem {
    pub fn new(config: ParticleSystemConfig, sampler: Sampler) -> Result<Self, ConfigError> {
        config.validate()?;
        let direction = config.direction.normalize();
        let perpendicular = direction
            .cross(direction + Vec3::new(1.0, 0.0, 1.0))
            .try_normalize()
            .unwrap_or_else(|| direction.any_orthonormal_vector());
        tracing::debug!(
            spawn_rate = config.spawn_rate,
            lifetime = config.lifetime,
            "particle system created"
        );
        Ok(Self {
            config,
            direction,
            perpendicular,
            particles: Vec::new(),
            sampler,
        })
    }

    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Axis the cone tilt rotates about.
    pub fn perpendicular(&self) -> Vec3 {
        self.perpendicular
    }

    /// Particles a frame of length `dt` spawns, before any capacity limit.
    pub fn spawn_count(&self, dt: f32) -> usize {
        let n = (self.config.spawn_rate * dt).floor();
        if n.is_finite() && n > 0.0 {
            n as usize
        } else {
            0
        }
    }

    /// Advance one frame: cull, advect, draw survivors, then spawn.
    ///
    /// `model` places the emitter origin in world space.
    pub fn update<R: FrameRenderer + ?Sized>(&mut self, dt: f32, model: Mat4, renderer: &mut R) {
        self.cull(dt);
        self.advect(dt);
        self.render(renderer);
        self.spawn(dt, model);
    }

    fn cull(&mut self, dt: f32) {
        let before = self.particles.len();
        self.particles.retain_mut(|p| {
            p.remaining_lifetime -= dt;
            p.remaining_lifetime >= 0.0
        });
        let culled = before - self.particles.len();
        if culled > 0 {
            tracing::trace!(culled, "particles expired");
        }
    }

    fn advect(&mut self, dt: f32) {
        let drag = self.config.drag;
        for p in &mut self.particles {
            p.position += p.velocity * dt;
            p.velocity -= drag * p.velocity * dt;
        }
    }

    fn render<R: FrameRenderer + ?Sized>(&self, renderer: &mut R) {
        for p in &self.particles {
            renderer.draw_mesh(MeshDraw {
                shader: self.config.shader,
                mesh: self.config.shape,
                model: Mat4::from_translation(p.position),
            });
        }
    }

    fn spawn(&mut self, dt: f32, model: Mat4) {
        let mut count = self.spawn_count(dt);
        if count > MAX_SPAWN_PER_FRAME {
            tracing::warn!(
                wanted = count,
                limit = MAX_SPAWN_PER_FRAME,
                "spawn count clamped"
            );
            count = MAX_SPAWN_PER_FRAME;
        }
        if let Some(max) = self.config.max_particles {
            let room = max.saturating_sub(self.particles.len());
            if count > room {
                tracing::trace!(wanted = count, room, "particle pool full");
                count = room;
            }
        }
        if count == 0 {
            return;
        }

        let cfg = &self.config;
        let origin = model.transform_point3(cfg.origin);
        let min_lifetime = cfg.lifetime - cfg.lifetime_deviation;
        let max_lifetime = cfg.lifetime + cfg.lifetime_deviation;

        self.particles.reserve(count);
        for _ in 0..count {
            let position = self.sampler.jitter(origin, cfg.position_deviation);
            let heading =
                self.sampler
                    .cone_direction(self.direction, self.perpendicular, cfg.max_angle);
            let speed = self
                .sampler
                .gaussian(cfg.initial_speed, cfg.initial_speed_deviation);
            let remaining_lifetime = self.sampler.uniform_inclusive(min_lifetime, max_lifetime);
            self.particles.push(Particle {
                position,
                velocity: heading * speed,
                remaining_lifetime,
            });
        }
        tracing::trace!(spawned = count, alive = self.particles.len(), "particles spawned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seascape_common::{MeshHandle, ShaderHandle};
    use seascape_render::DrawRecorder;

    fn config() -> ParticleSystemConfig {
        ParticleSystemConfig {
            origin: Vec3::ZERO,
            position_deviation: Vec3::ZERO,
            spawn_rate: 0.0,
            direction: Vec3::Y,
            max_angle: 0.3,
            initial_speed: 2.0,
            initial_speed_deviation: 0.0,
            drag: 0.0,
            lifetime: 1.0,
            lifetime_deviation: 0.0,
            shape: MeshHandle(7),
            shader: ShaderHandle::LAMBERT,
            max_particles: None,
        }
    }

    fn system(cfg: ParticleSystemConfig) -> ParticleSystem {
        ParticleSystem::new(cfg, Sampler::seeded(42)).unwrap()
    }

    fn particle(lifetime: f32, velocity: Vec3) -> Particle {
        Particle {
            position: Vec3::ZERO,
            velocity,
            remaining_lifetime: lifetime,
        }
    }

    #[test]
    fn expired_particles_are_culled() {
        let mut ps = system(config());
        let lifetimes = [0.05, 0.1, 0.2, 0.5, 0.0999];
        ps.particles = lifetimes
            .iter()
            .map(|&l| particle(l, Vec3::ZERO))
            .collect();

        let dt = 0.1;
        ps.update(dt, Mat4::IDENTITY, &mut DrawRecorder::new());

        let mut expected: Vec<f32> = lifetimes
            .iter()
            .filter(|&&l| l >= dt)
            .map(|&l| l - dt)
            .collect();
        let mut remaining: Vec<f32> = ps.particles().iter().map(|p| p.remaining_lifetime).collect();
        expected.sort_by(f32::total_cmp);
        remaining.sort_by(f32::total_cmp);
        assert_eq!(remaining, expected);
    }

    #[test]
    fn advect_uses_velocity_before_drag() {
        let mut ps = system(ParticleSystemConfig {
            drag: 0.5,
            ..config()
        });
        ps.particles = vec![particle(10.0, Vec3::new(1.0, 0.0, 0.0))];
        ps.update(0.1, Mat4::IDENTITY, &mut DrawRecorder::new());

        let p = ps.particles()[0];
        assert!((p.position.x - 0.1).abs() < 1e-6);
        assert!((p.velocity.x - 0.95).abs() < 1e-6);
    }

    #[test]
    fn zero_drag_keeps_velocity() {
        let mut ps = system(config());
        let v = Vec3::new(0.3, -1.7, 2.2);
        ps.particles = vec![particle(10.0, v); 4];
        for _ in 0..10 {
            ps.update(0.016, Mat4::IDENTITY, &mut DrawRecorder::new());
        }
        for p in ps.particles() {
            assert_eq!(p.velocity, v);
        }
    }

    #[test]
    fn spawn_count_is_seed_independent() {
        for seed in 0..5 {
            let cfg = ParticleSystemConfig {
                spawn_rate: 37.5,
                position_deviation: Vec3::splat(0.2),
                initial_speed_deviation: 0.3,
                lifetime_deviation: 0.2,
                ..config()
            };
            let mut ps = ParticleSystem::new(cfg, Sampler::seeded(seed)).unwrap();
            ps.update(0.1, Mat4::IDENTITY, &mut DrawRecorder::new());
            assert_eq!(ps.len(), 3);
        }
    }

    #[test]
    fn degenerate_rate_or_delta_spawns_nothing() {
        for (rate, dt) in [(0.0, 0.1), (-10.0, 0.1), (50.0, 0.0), (50.0, -0.5), (5.0, 0.1)] {
            let mut ps = system(ParticleSystemConfig {
                spawn_rate: rate,
                ..config()
            });
            ps.update(dt, Mat4::IDENTITY, &mut DrawRecorder::new());
            assert!(ps.is_empty(), "rate {rate} dt {dt} spawned");
        }
    }

    #[test]
    fn new_particles_are_drawn_next_frame() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 100.0,
            ..config()
        });
        let mut recorder = DrawRecorder::new();
        ps.update(0.05, Mat4::IDENTITY, &mut recorder);
        assert_eq!(ps.len(), 5);
        assert_eq!(recorder.mesh_draws().len(), 0);

        recorder.clear();
        ps.update(0.05, Mat4::IDENTITY, &mut recorder);
        assert_eq!(recorder.draws_of(MeshHandle(7)).count(), 5);
        for (draw, p) in recorder.mesh_draws().iter().zip(ps.particles()) {
            assert_eq!(draw.shader, ShaderHandle::LAMBERT);
            assert_eq!(draw.model, Mat4::from_translation(p.position));
        }
    }

    #[test]
    fn spawn_origin_follows_model_transform() {
        let mut ps = system(ParticleSystemConfig {
            origin: Vec3::new(1.0, 0.0, 0.0),
            spawn_rate: 10.0,
            ..config()
        });
        let model = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        ps.update(0.1, model, &mut DrawRecorder::new());
        assert_eq!(ps.len(), 1);
        assert_eq!(ps.particles()[0].position, Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn spawn_velocity_inside_cone() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 1000.0,
            direction: Vec3::new(0.0, 3.0, 0.0),
            ..config()
        });
        ps.update(0.5, Mat4::IDENTITY, &mut DrawRecorder::new());
        assert_eq!(ps.len(), 500);
        for p in ps.particles() {
            assert!((p.velocity.length() - 2.0).abs() < 1e-4);
            assert!(p.velocity.angle_between(Vec3::Y) <= 0.3 + 1e-3);
        }
    }

    #[test]
    fn spawn_lifetimes_in_range() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 1000.0,
            lifetime: 2.0,
            lifetime_deviation: 0.5,
            ..config()
        });
        ps.update(0.2, Mat4::IDENTITY, &mut DrawRecorder::new());
        assert_eq!(ps.len(), 200);
        for p in ps.particles() {
            assert!((1.5..=2.5).contains(&p.remaining_lifetime));
        }
    }

    #[test]
    fn spawn_jitter_spreads_positions() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 1000.0,
            position_deviation: Vec3::new(1.0, 0.0, 1.0),
            ..config()
        });
        ps.update(0.5, Mat4::IDENTITY, &mut DrawRecorder::new());
        let mean = ps.particles().iter().map(|p| p.position).sum::<Vec3>() / ps.len() as f32;
        assert!(mean.length() < 0.2);
        assert!(ps.particles().iter().all(|p| p.position.y == 0.0));
        assert!(ps.particles().iter().any(|p| p.position.x.abs() > 0.5));
    }

    #[test]
    fn same_seed_same_particles() {
        let cfg = ParticleSystemConfig {
            spawn_rate: 60.0,
            position_deviation: Vec3::splat(0.1),
            initial_speed_deviation: 0.5,
            lifetime_deviation: 0.3,
            drag: 0.4,
            ..config()
        };
        let mut a = ParticleSystem::new(cfg.clone(), Sampler::seeded(9)).unwrap();
        let mut b = ParticleSystem::new(cfg, Sampler::seeded(9)).unwrap();
        for _ in 0..30 {
            a.update(0.02, Mat4::IDENTITY, &mut DrawRecorder::new());
            b.update(0.02, Mat4::IDENTITY, &mut DrawRecorder::new());
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn pool_reaches_steady_state() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 100.0,
            lifetime: 1.0,
            lifetime_deviation: 0.0,
            ..config()
        });
        let mut recorder = DrawRecorder::new();
        for _ in 0..150 {
            ps.update(0.01, Mat4::IDENTITY, &mut recorder);
        }
        assert!((90..=110).contains(&ps.len()), "pool size {}", ps.len());
    }

    #[test]
    fn capacity_limits_pool() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 1000.0,
            lifetime: 10.0,
            max_particles: Some(25),
            ..config()
        });
        for _ in 0..5 {
            ps.update(0.1, Mat4::IDENTITY, &mut DrawRecorder::new());
        }
        assert_eq!(ps.len(), 25);
    }

    #[test]
    fn runaway_rate_is_clamped_per_frame() {
        let mut ps = system(ParticleSystemConfig {
            spawn_rate: 1e20,
            ..config()
        });
        assert!(ps.spawn_count(0.016) > MAX_SPAWN_PER_FRAME);
        ps.update(0.016, Mat4::IDENTITY, &mut DrawRecorder::new());
        assert_eq!(ps.len(), MAX_SPAWN_PER_FRAME);
    }

    #[test]
    fn smoke_preset_emits_at_display_rates() {
        for hz in [60.0f32, 144.0] {
            let cfg = ParticleSystemConfig::smoke(Vec3::ZERO, MeshHandle(0), ShaderHandle::LAMBERT);
            let cap = cfg.max_particles.unwrap();
            let mut ps = system(cfg);
            let dt = 1.0 / hz;
            assert!(ps.spawn_count(dt) >= 1, "{hz} Hz spawns nothing");
            let mut recorder = DrawRecorder::new();
            for _ in 0..(hz as usize * 4) {
                ps.update(dt, Mat4::IDENTITY, &mut recorder);
            }
            assert!(!ps.is_empty());
            assert!(ps.len() < cap, "{hz} Hz pool hit the cap");
        }
    }

    #[test]
    fn perpendicular_is_orthogonal_unit() {
        for dir in [Vec3::Y, Vec3::new(1.0, 2.0, -0.5), Vec3::new(1.0, 0.0, 1.0)] {
            let ps = system(ParticleSystemConfig {
                direction: dir,
                ..config()
            });
            let perp = ps.perpendicular();
            assert!((perp.length() - 1.0).abs() < 1e-5);
            assert!(perp.dot(dir.normalize()).abs() < 1e-5);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ParticleSystemConfig {
            position_deviation: Vec3::new(-0.1, 0.0, 0.0),
            ..config()
        };
        assert!(ParticleSystem::new(cfg, Sampler::seeded(1)).is_err());
    }
}
