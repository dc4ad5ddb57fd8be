use glam::{Mat4, Vec3};

/// Camera orbiting a focus point.
///
/// `pitch` tilts the camera away from straight overhead, `yaw` swings it
/// around the vertical axis through the focus.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::new(0.0, 1.0, 0.0),
            distance: 29.0,
            pitch: 0.0,
            yaw: 0.0,
            fov: 50.0_f32.to_radians(),
            aspect: 1.0,
            near: 1.0,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    /// Horizontal direction the camera is swung towards.
    fn heading(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(0.0, self.pitch.cos(), 0.0) + self.heading() * self.pitch.sin();
        self.focus + offset * self.distance
    }

    /// Up vector for the view. Straight overhead the world up is parallel to
    /// the view direction, so the heading takes its place.
    pub fn up(&self) -> Vec3 {
        if self.pitch.sin().abs() < 1e-4 {
            -self.heading()
        } else {
            Vec3::Y
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.focus, self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
