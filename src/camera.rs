use std::f32::consts::PI;

use glam::{Mat4, Vec3};

/// Default vantage of the normal view.
pub const NORMAL_VANTAGE: Vec3 = Vec3::new(0.0, 10.0, 30.0);
/// Vantage used while the parallax barrier is active.
pub const PARALLAX_VANTAGE: Vec3 = Vec3::new(0.0, 0.0, 50.0);

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: NORMAL_VANTAGE,
            target: Vec3::ZERO,
            fov_y: 75f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoParams {
    pub eye_separation: f32,
    pub focal_length: f32,
}

impl StereoParams {
    /// Off-axis (left, right) view-projections for a parallax barrier pair.
    pub fn eye_view_projs(&self, camera: &PerspectiveCamera) -> [Mat4; 2] {
        let half = self.eye_separation * 0.5;
        let near = camera.near;
        let ymax = near * (camera.fov_y * 0.5).tan();
        let xmax = ymax * camera.aspect;
        let shift = half * near / self.focal_length.max(1e-4);
        let view = camera.view();

        let left = frustum_rh_gl(-xmax + shift, xmax + shift, -ymax, ymax, near, camera.far)
            * Mat4::from_translation(Vec3::new(half, 0.0, 0.0))
            * view;
        let right = frustum_rh_gl(-xmax - shift, xmax - shift, -ymax, ymax, near, camera.far)
            * Mat4::from_translation(Vec3::new(-half, 0.0, 0.0))
            * view;
        [left, right]
    }
}

fn frustum_rh_gl(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
    Mat4::from_cols_array(&[
        2.0 * n / (r - l), 0.0, 0.0, 0.0,
        0.0, 2.0 * n / (t - b), 0.0, 0.0,
        (r + l) / (r - l), (t + b) / (t - b), -(f + n) / (f - n), -1.0,
        0.0, 0.0, -2.0 * f * n / (f - n), 0.0,
    ])
}

/// Orbit-style controller around `target` with damping, auto-rotation and
/// distance limits. Angles follow the usual convention: `phi` from +Y,
/// `theta` around Y starting at +Z.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    /// Set by the quality policy; caps `auto_rotate_speed` for good.
    pub rotate_speed_cap: Option<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    zoom: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed_cap: None,
            min_distance: 10.0,
            max_distance: 500.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            zoom: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn effective_rotate_speed(&self) -> f32 {
        match self.rotate_speed_cap {
            Some(cap) => self.auto_rotate_speed.min(cap),
            None => self.auto_rotate_speed,
        }
    }

    /// Pointer drag, in radians.
    pub fn rotate(&mut self, left: f32, up: f32) {
        self.delta_theta -= left;
        self.delta_phi -= up;
    }

    /// Wheel zoom; values above 1 move away from the target.
    pub fn dolly(&mut self, factor: f32) {
        if factor > 0.0 {
            self.zoom *= factor;
        }
    }

    /// Discards pending motion so a freshly set vantage is not nudged.
    pub fn settle(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.zoom = 1.0;
    }

    /// Advances damping/auto-rotation one frame and writes the camera pose.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        if self.auto_rotate {
            self.delta_theta -= 2.0 * PI / 60.0 / 60.0 * self.effective_rotate_speed();
        }
        if self.enable_damping {
            theta += self.delta_theta * self.damping_factor;
            phi += self.delta_phi * self.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }
        phi = phi.clamp(1e-6, PI - 1e-6);
        radius = (radius * self.zoom).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        camera.position = self.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.zoom = 1.0;
    }
}

/// Gentle bob applied on top of the orbit while auto-rotation is on.
#[derive(Debug, Clone, Default)]
pub struct CameraFloat {
    applied: Vec3,
}

impl CameraFloat {
    pub fn apply(&mut self, camera: &mut PerspectiveCamera, time_s: f32) {
        let bob = Vec3::new((time_s * 0.3).cos() * 5.0, (time_s * 0.5).sin() * 10.0, 0.0);
        camera.position += bob - self.applied;
        self.applied = bob;
    }

    pub fn reset(&mut self) {
        self.applied = Vec3::ZERO;
    }
}
