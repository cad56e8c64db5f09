use nalgebra_glm as glm;

use super::pose::{CameraPose, Orientation};
use super::{CameraController, DragSession};
use crate::model::ModelBounds;
use crate::settings::CameraSettings;

/// Polar-angle margin keeping the camera off the poles, where the up vector
/// degenerates.
const PHI_EPS: f32 = 0.01;

/// Zoom step and radius bounds as fractions of the starting distance, so the
/// wheel feels the same regardless of model scale.
const ZOOM_STEP_FRACTION: f32 = 0.08;
const MIN_ZOOM_FRACTION: f32 = 0.25;
const MAX_ZOOM_FRACTION: f32 = 4.0;

/// Spherical-coordinate orbit around the loaded model's center. The pivot is
/// unset until the asset resolves; until then every input is a no-op.
pub struct OrbitController {
    pivot: Option<glm::Vec3>,
    radius: f32,
    theta: f32,
    phi: f32,
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
    drag_sensitivity: f32,
    auto_rotate: bool,
    auto_rotate_speed: f32,
    drag: DragSession,
    pose: CameraPose,
}

impl OrbitController {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            pivot: None,
            radius: 10.0,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,
            min_zoom: 1.0,
            max_zoom: 100.0,
            zoom_step: 1.0,
            drag_sensitivity: settings.drag_sensitivity,
            auto_rotate: settings.auto_rotate,
            auto_rotate_speed: settings.auto_rotate_speed,
            drag: DragSession::default(),
            pose: CameraPose {
                position: glm::vec3(0.0, 0.0, 10.0),
                orientation: Orientation::LookAt(glm::vec3(0.0, 0.0, 0.0)),
            },
        }
    }

    /// Seat the orbit on a pivot at the given starting distance. The camera
    /// starts level (phi = pi/2) behind the pivot on its +Z axis.
    pub fn attach(&mut self, pivot: glm::Vec3, initial_radius: f32) {
        self.pivot = Some(pivot);
        self.radius = initial_radius;
        self.theta = 0.0;
        self.phi = std::f32::consts::FRAC_PI_2;
        self.zoom_step = initial_radius * ZOOM_STEP_FRACTION;
        self.min_zoom = initial_radius * MIN_ZOOM_FRACTION;
        self.max_zoom = initial_radius * MAX_ZOOM_FRACTION;
        self.update_pose();
    }

    fn update_pose(&mut self) {
        let Some(pivot) = self.pivot else { return };
        self.pose.position = pivot + spherical_offset(self.radius, self.theta, self.phi);
        self.pose.orientation = Orientation::LookAt(pivot);
    }
}

/// Spherical to Cartesian offset, physics convention: phi is the polar angle
/// from +Y, theta the azimuth around it.
fn spherical_offset(radius: f32, theta: f32, phi: f32) -> glm::Vec3 {
    glm::vec3(
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
        radius * phi.sin() * theta.cos(),
    )
}

impl CameraController for OrbitController {
    fn initialize(&mut self, bounds: &ModelBounds) {
        self.attach(bounds.center, bounds.view_distance());
    }

    fn on_pointer_down(&mut self, x: f64, y: f64) {
        self.drag.begin(x, y);
    }

    fn on_pointer_move(&mut self, x: f64, y: f64) {
        let Some((dx, dy)) = self.drag.advance(x, y) else {
            return;
        };
        if self.pivot.is_none() {
            return;
        }
        self.theta -= dx as f32 * self.drag_sensitivity;
        self.phi -= dy as f32 * self.drag_sensitivity;
        self.phi = self.phi.clamp(PHI_EPS, std::f32::consts::PI - PHI_EPS);
        self.update_pose();
    }

    fn on_pointer_up(&mut self) {
        self.drag.end();
    }

    fn on_wheel(&mut self, delta: f32) {
        if self.pivot.is_none() || delta == 0.0 {
            return;
        }
        // One fixed step per notch; the magnitude of the delta only picks the
        // direction.
        self.radius = (self.radius + delta.signum() * self.zoom_step)
            .clamp(self.min_zoom, self.max_zoom);
        self.update_pose();
    }

    fn tick(&mut self, dt: f32) {
        if self.auto_rotate && !self.drag.active() && self.pivot.is_some() {
            self.theta += self.auto_rotate_speed * dt;
            self.update_pose();
        }
    }

    fn pose(&self) -> &CameraPose {
        &self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    const TOL: f32 = 1e-5;

    fn attached() -> OrbitController {
        let mut controller = OrbitController::new(&CameraSettings::default());
        controller.attach(glm::vec3(0.0, 0.0, 0.0), 10.0);
        controller
    }

    fn position(controller: &OrbitController) -> glm::Vec3 {
        controller.pose().position
    }

    #[test]
    fn starts_level_behind_pivot() {
        let controller = attached();
        let p = position(&controller);
        assert!((p.x).abs() < TOL);
        assert!((p.y).abs() < TOL);
        assert!((p.z - 10.0).abs() < TOL);
        match controller.pose().orientation {
            Orientation::LookAt(target) => assert!(glm::length(&target) < TOL),
            Orientation::YawPitch { .. } => panic!("orbit must aim at the pivot"),
        }
    }

    #[test]
    fn drag_follows_the_spherical_formula() {
        let mut controller = attached();
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_move(100.0, 0.0);

        // 100 px at 0.005 rad/px, subtracted
        assert!((controller.theta + 0.5).abs() < TOL);
        let expected = spherical_offset(10.0, -0.5, FRAC_PI_2);
        let p = position(&controller);
        assert!(glm::length(&(p - expected)) < TOL);
    }

    #[test]
    fn phi_stays_clamped_under_arbitrarily_large_drags() {
        let mut controller = attached();
        controller.on_pointer_down(0.0, 0.0);
        for step in 1..200 {
            controller.on_pointer_move(0.0, f64::from(step) * 100.0);
            assert!(controller.phi >= PHI_EPS && controller.phi <= PI - PHI_EPS);
        }
        // Dragging the pointer down decreases phi; pinned at the margin, not
        // flipped through the pole.
        assert!((controller.phi - PHI_EPS).abs() < TOL);
    }

    #[test]
    fn wheel_saturates_at_the_zoom_bounds() {
        let mut controller = attached();
        for _ in 0..100 {
            controller.on_wheel(1.0);
        }
        assert!((controller.radius - controller.max_zoom).abs() < TOL);
        for _ in 0..200 {
            controller.on_wheel(-1.0);
        }
        assert!((controller.radius - controller.min_zoom).abs() < TOL);
    }

    #[test]
    fn zero_wheel_delta_is_ignored() {
        let mut controller = attached();
        let before = controller.radius;
        controller.on_wheel(0.0);
        assert_eq!(controller.radius, before);
    }

    #[test]
    fn spherical_round_trip_recovers_the_angles() {
        let (radius, theta, phi) = (7.0_f32, 2.3_f32, 1.1_f32);
        let offset = spherical_offset(radius, theta, phi);

        let r = glm::length(&offset);
        let recovered_phi = (offset.y / r).acos();
        let recovered_theta = offset.x.atan2(offset.z).rem_euclid(TAU);

        assert!((r - radius).abs() < TOL);
        assert!((recovered_phi - phi).abs() < TOL);
        assert!((recovered_theta - theta.rem_euclid(TAU)).abs() < TOL);
    }

    #[test]
    fn move_without_pointer_down_changes_nothing() {
        let mut controller = attached();
        let before = position(&controller);
        controller.on_pointer_move(500.0, 500.0);
        assert!(glm::length(&(position(&controller) - before)) < TOL);
        assert!((controller.theta).abs() < TOL);
    }

    #[test]
    fn move_after_pointer_up_changes_nothing() {
        let mut controller = attached();
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_up();
        let before = position(&controller);
        controller.on_pointer_move(500.0, 500.0);
        assert!(glm::length(&(position(&controller) - before)) < TOL);
    }

    #[test]
    fn input_before_attach_is_suppressed() {
        let mut controller = OrbitController::new(&CameraSettings::default());
        let before = position(&controller);
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_move(300.0, 300.0);
        controller.on_wheel(1.0);
        controller.tick(0.016);
        assert!(glm::length(&(position(&controller) - before)) < TOL);
    }

    #[test]
    fn auto_rotate_advances_only_while_idle() {
        let mut settings = CameraSettings::default();
        settings.auto_rotate = true;
        settings.auto_rotate_speed = 0.5;
        let mut controller = OrbitController::new(&settings);
        controller.attach(glm::vec3(0.0, 0.0, 0.0), 10.0);

        controller.tick(0.5);
        assert!((controller.theta - 0.25).abs() < TOL);

        controller.on_pointer_down(0.0, 0.0);
        controller.tick(0.5);
        assert!((controller.theta - 0.25).abs() < TOL);

        controller.on_pointer_up();
        controller.tick(0.5);
        assert!((controller.theta - 0.5).abs() < TOL);
    }

    #[test]
    fn tick_without_auto_rotate_is_a_no_op() {
        let mut controller = attached();
        controller.tick(1.0);
        assert!((controller.theta).abs() < TOL);
    }
}
