use glam::Vec3;
use seascape_common::{MeshHandle, ShaderHandle};

/// Errors from validating a particle system configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("emission direction must be non-zero")]
    ZeroDirection,
}

/// Immutable parameters of a particle system.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystemConfig {
    /// Emission point in model space.
    pub origin: Vec3,
    /// Per-axis standard deviation of the spawn position.
    pub position_deviation: Vec3,
    /// Particles per second.
    pub spawn_rate: f32,
    /// Base emission direction. Normalized on construction.
    pub direction: Vec3,
    /// Cone half-angle in radians.
    pub max_angle: f32,
    pub initial_speed: f32,
    pub initial_speed_deviation: f32,
    /// Fraction of velocity lost per second.
    pub drag: f32,
    /// Base lifetime in seconds.
    pub lifetime: f32,
    /// Half-width of the uniform lifetime range.
    pub lifetime_deviation: f32,
    /// Mesh drawn for every particle.
    pub shape: MeshHandle,
    pub shader: ShaderHandle,
    /// Upper bound on live particles. `None` leaves the pool unbounded.
    pub max_particles: Option<usize>,
}

impl ParticleSystemConfig {
    /// Chimney smoke: slow upward puffs with wide jitter.
    ///
    /// The rate keeps at least one spawn per frame down to 144 Hz; the cap
    /// sits above the steady-state pool of `rate * (lifetime + deviation)`.
    pub fn smoke(origin: Vec3, shape: MeshHandle, shader: ShaderHandle) -> Self {
        Self {
            origin,
            position_deviation: Vec3::new(0.15, 0.05, 0.15),
            spawn_rate: 240.0,
            direction: Vec3::Y,
            max_angle: 0.35,
            initial_speed: 2.5,
            initial_speed_deviation: 0.4,
            drag: 0.6,
            lifetime: 2.0,
            lifetime_deviation: 0.5,
            shape,
            shader,
            max_particles: Some(1024),
        }
    }

    /// Check the configuration. Deviations, cone angle and drag must be
    /// non-negative, every value finite and the direction non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vectors = [
            ("origin", self.origin),
            ("position_deviation", self.position_deviation),
            ("direction", self.direction),
        ];
        for (field, v) in vectors {
            for value in v.to_array() {
                if !value.is_finite() {
                    return Err(ConfigError::NotFinite { field, value });
                }
            }
        }

        let scalars = [
            ("spawn_rate", self.spawn_rate),
            ("max_angle", self.max_angle),
            ("initial_speed", self.initial_speed),
            ("initial_speed_deviation", self.initial_speed_deviation),
            ("drag", self.drag),
            ("lifetime", self.lifetime),
            ("lifetime_deviation", self.lifetime_deviation),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let non_negative = [
            ("position_deviation.x", self.position_deviation.x),
            ("position_deviation.y", self.position_deviation.y),
            ("position_deviation.z", self.position_deviation.z),
            ("max_angle", self.max_angle),
            ("initial_speed_deviation", self.initial_speed_deviation),
            ("drag", self.drag),
            ("lifetime_deviation", self.lifetime_deviation),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.direction.length_squared() == 0.0 {
            return Err(ConfigError::ZeroDirection);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoke() -> ParticleSystemConfig {
        ParticleSystemConfig::smoke(Vec3::ZERO, MeshHandle(0), ShaderHandle::LAMBERT)
    }

    #[test]
    fn smoke_preset_is_valid() {
        assert_eq!(smoke().validate(), Ok(()));
    }

    #[test]
    fn negative_deviation_rejected() {
        let cfg = ParticleSystemConfig {
            lifetime_deviation: -0.1,
            ..smoke()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative {
                field: "lifetime_deviation",
                ..
            })
        ));

        let cfg = ParticleSystemConfig {
            position_deviation: Vec3::new(0.0, -1.0, 0.0),
            ..smoke()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative {
                field: "position_deviation.y",
                ..
            })
        ));
    }

    #[test]
    fn zero_direction_rejected() {
        let cfg = ParticleSystemConfig {
            direction: Vec3::ZERO,
            ..smoke()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDirection));
    }

    #[test]
    fn non_finite_rejected() {
        let cfg = ParticleSystemConfig {
            spawn_rate: f32::NAN,
            ..smoke()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotFinite {
                field: "spawn_rate",
                ..
            })
        ));
    }

    #[test]
    fn negative_spawn_rate_is_allowed() {
        let cfg = ParticleSystemConfig {
            spawn_rate: -5.0,
            ..smoke()
        };
        assert!(cfg.validate().is_ok());
    }
}
