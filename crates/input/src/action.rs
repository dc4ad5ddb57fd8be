use serde::{Deserialize, Serialize};

/// Angular speed applied while a rotation key is held (radians per second).
pub const ROTATION_SPEED: f32 = std::f32::consts::PI;

/// Keys that drive the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A single key transition reported by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub key: Key,
    pub state: KeyState,
}

impl InputEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
        }
    }
}

/// Current rotation speeds of the scene camera.
///
/// `pitch` drives the tilt angle (up/down keys), `yaw` the spin around the
/// vertical axis (left/right keys).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationRates {
    pub pitch: f32,
    pub yaw: f32,
}

impl RotationRates {
    /// Apply one key transition and return the resulting rates.
    pub fn apply(self, event: InputEvent) -> Self {
        let next = match (event.state, event.key) {
            (KeyState::Pressed, Key::Left) => Self {
                yaw: -ROTATION_SPEED,
                ..self
            },
            (KeyState::Pressed, Key::Right) => Self {
                yaw: ROTATION_SPEED,
                ..self
            },
            (KeyState::Pressed, Key::Up) => Self {
                pitch: -ROTATION_SPEED,
                ..self
            },
            (KeyState::Pressed, Key::Down) => Self {
                pitch: ROTATION_SPEED,
                ..self
            },
            (KeyState::Released, Key::Left | Key::Right) => Self { yaw: 0.0, ..self },
            (KeyState::Released, Key::Up | Key::Down) => Self { pitch: 0.0, ..self },
        };
        tracing::trace!(?event, pitch = next.pitch, yaw = next.yaw, "rotation rates");
        next
    }

    pub fn is_idle(&self) -> bool {
        self.pitch == 0.0 && self.yaw == 0.0
    }
}
