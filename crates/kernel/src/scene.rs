use glam::{Mat4, Vec3};
use seascape_common::TAU;
use seascape_input::RotationRates;
use serde::{Deserialize, Serialize};

use crate::camera::OrbitCamera;

/// Fixed scene parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Pitch is clamped to `[-max_pitch, max_pitch]`.
    pub max_pitch: f32,
    /// Wheel spin speed in radians per second.
    pub wheel_speed: f32,
    /// Simulation time wraps back by this many seconds once exceeded.
    pub max_time: f32,
    /// Water phase per second of simulation time.
    pub wave_frequency: f32,
    /// Offset inside the ship bobbing sine, `sin(bob_offset - phase)`.
    pub bob_offset: f32,
    /// How deep the ship sits below its bobbing line.
    pub ship_draft: f32,
    /// Vertical lift of the water surface.
    pub water_lift: f32,
    /// Point the wheel turns around, in ship space.
    pub wheel_pivot: Vec3,
    /// Name of the mesh that gets the wheel transform.
    pub wheel_mesh: String,
    /// Point the camera orbits around.
    pub focus: Vec3,
    /// Distance from the focus to the camera.
    pub camera_distance: f32,
    /// Smoke emitter position, in ship space.
    pub chimney: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.2,
            wheel_speed: TAU / 8.0,
            max_time: 255.0,
            wave_frequency: 0.5,
            bob_offset: 100.0,
            ship_draft: 0.4,
            water_lift: 0.25,
            wheel_pivot: Vec3::new(4.7, 0.0, 0.0),
            wheel_mesh: "kolo".into(),
            focus: Vec3::new(0.0, 1.0, 0.0),
            camera_distance: 29.0,
            chimney: Vec3::new(0.0, 6.0, 0.0),
        }
    }
}

/// Per-frame scene state: camera angles, wheel angle and simulation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneState {
    config: SceneConfig,
    pitch: f32,
    yaw: f32,
    wheel_angle: f32,
    time: f32,
}

impl SceneState {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn wheel_angle(&self) -> f32 {
        self.wheel_angle
    }

    /// Elapsed simulation time, wrapped.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance angles and time by one frame.
    pub fn advance(&mut self, dt: f32, rates: RotationRates) {
        let max_pitch = self.config.max_pitch;
        self.pitch = (self.pitch + rates.pitch * dt).clamp(-max_pitch, max_pitch);

        self.yaw += rates.yaw * dt;
        if self.yaw > TAU {
            self.yaw -= TAU;
        } else if self.yaw < -TAU {
            self.yaw += TAU;
        }

        self.wheel_angle += self.config.wheel_speed * dt;
        if self.wheel_angle > TAU {
            self.wheel_angle -= TAU;
        }

        self.time += dt;
        if self.time > self.config.max_time {
            self.time -= self.config.max_time;
            tracing::debug!(time = self.time, "simulation time wrapped");
        }
    }

    /// Phase fed to the water field.
    pub fn phase(&self) -> f32 {
        self.config.wave_frequency * self.time
    }

    /// Ship transform: bobs with the waves.
    pub fn root_model(&self) -> Mat4 {
        let bob = (self.config.bob_offset - self.phase()).sin() - self.config.ship_draft;
        Mat4::from_translation(Vec3::new(0.0, bob, 0.0))
    }

    pub fn water_model(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.config.water_lift, 0.0))
    }

    pub fn wheel_model(&self) -> Mat4 {
        self.root_model() * rotate_about(self.config.wheel_pivot, self.wheel_angle, Vec3::Z)
    }

    /// Transform for a named scene mesh.
    pub fn mesh_model(&self, name: &str) -> Mat4 {
        if name == self.config.wheel_mesh {
            self.wheel_model()
        } else {
            self.root_model()
        }
    }

    pub fn camera(&self, aspect: f32) -> OrbitCamera {
        OrbitCamera {
            focus: self.config.focus,
            distance: self.config.camera_distance,
            pitch: self.pitch,
            yaw: self.yaw,
            aspect,
            ..OrbitCamera::default()
        }
    }
}

/// Rotation by `angle` around `axis` through `pivot`.
pub fn rotate_about(pivot: Vec3, angle: f32, axis: Vec3) -> Mat4 {
    Mat4::from_translation(pivot)
        * Mat4::from_axis_angle(axis.normalize(), angle)
        * Mat4::from_translation(-pivot)
}
