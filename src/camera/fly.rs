use nalgebra_glm as glm;

use super::pose::{CameraPose, Orientation, forward_from, world_up};
use super::{CameraController, DragSession};
use crate::model::ModelBounds;
use crate::settings::CameraSettings;

/// Keeps pitch strictly inside +-pi/2 so the view never inverts.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Below this length a direction is considered degenerate and skipped.
const DEGENERATE_EPS: f32 = 1e-6;

/// First-person camera: drag to look, WASD to walk, wheel to dolly along the
/// view direction. Walking is decoupled from pitch: forward/backward always
/// move in the horizontal plane, so looking up or down never changes speed.
pub struct FlyController {
    position: glm::Vec3,
    yaw: f32,
    pitch: f32,
    forward_key: bool,
    backward_key: bool,
    left_key: bool,
    right_key: bool,
    look_sensitivity: f32,
    move_speed: f32,
    dolly_sensitivity: f32,
    drag: DragSession,
    pose: CameraPose,
}

impl FlyController {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            position: glm::vec3(0.0, 0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            forward_key: false,
            backward_key: false,
            left_key: false,
            right_key: false,
            look_sensitivity: settings.look_sensitivity,
            move_speed: settings.move_speed,
            dolly_sensitivity: settings.dolly_sensitivity,
            drag: DragSession::default(),
            pose: CameraPose {
                position: glm::vec3(0.0, 0.0, 0.0),
                orientation: Orientation::YawPitch { yaw: 0.0, pitch: 0.0 },
            },
        }
    }

    fn update_pose(&mut self) {
        self.pose.position = self.position;
        self.pose.orientation = Orientation::YawPitch {
            yaw: self.yaw,
            pitch: self.pitch,
        };
    }

    fn any_movement_key(&self) -> bool {
        self.forward_key || self.backward_key || self.left_key || self.right_key
    }
}

impl CameraController for FlyController {
    fn initialize(&mut self, bounds: &ModelBounds) {
        // Level with the model center, backed off along +Z, facing it.
        self.position = bounds.center + glm::vec3(0.0, 0.0, bounds.view_distance());
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.update_pose();
    }

    fn on_pointer_down(&mut self, x: f64, y: f64) {
        self.drag.begin(x, y);
    }

    fn on_pointer_move(&mut self, x: f64, y: f64) {
        let Some((dx, dy)) = self.drag.advance(x, y) else {
            return;
        };
        // Yaw wraps freely; pitch clamps on the absolute target so repeated
        // deltas at the limit cannot drift past it.
        self.yaw -= dx as f32 * self.look_sensitivity;
        self.pitch = (self.pitch - dy as f32 * self.look_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_pose();
    }

    fn on_pointer_up(&mut self) {
        self.drag.end();
    }

    fn on_wheel(&mut self, delta: f32) {
        // Dolly along the full view direction. No distance clamp; there is no
        // pivot to stay near.
        let forward = forward_from(self.yaw, self.pitch);
        self.position += forward * (-delta * self.dolly_sensitivity);
        self.update_pose();
    }

    fn on_key(&mut self, key: &str, pressed: bool) {
        match key.to_ascii_lowercase().as_str() {
            "w" => self.forward_key = pressed,
            "s" => self.backward_key = pressed,
            "a" => self.left_key = pressed,
            "d" => self.right_key = pressed,
            _ => {}
        }
    }

    fn tick(&mut self, dt: f32) {
        if !self.any_movement_key() {
            return;
        }

        let forward = forward_from(self.yaw, self.pitch);
        let step = self.move_speed * dt;

        // Looking straight up or down leaves no horizontal component;
        // forward/backward motion is suppressed for the tick instead of
        // normalizing a zero vector.
        let mut horizontal = glm::vec3(forward.x, 0.0, forward.z);
        let horizontal_len = glm::length(&horizontal);
        horizontal = if horizontal_len > DEGENERATE_EPS {
            horizontal / horizontal_len
        } else {
            glm::vec3(0.0, 0.0, 0.0)
        };

        let right_raw = glm::cross(&forward, &world_up());
        let right = if glm::length(&right_raw) > DEGENERATE_EPS {
            glm::normalize(&right_raw)
        } else {
            // Forward parallel to world up: fall back to the yaw-derived
            // horizontal right.
            glm::vec3(self.yaw.cos(), 0.0, -self.yaw.sin())
        };

        if self.forward_key {
            self.position += horizontal * step;
        }
        if self.backward_key {
            self.position -= horizontal * step;
        }
        if self.right_key {
            self.position += right * step;
        }
        if self.left_key {
            self.position -= right * step;
        }
        self.update_pose();
    }

    fn pose(&self) -> &CameraPose {
        &self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const TOL: f32 = 1e-5;

    fn controller() -> FlyController {
        FlyController::new(&CameraSettings::default())
    }

    fn assert_vec_eq(actual: glm::Vec3, expected: glm::Vec3) {
        assert!(
            glm::length(&(actual - expected)) < TOL,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn forward_key_walks_along_negative_z() {
        let mut fly = controller();
        fly.move_speed = 2.0;
        fly.on_key("w", true);
        fly.tick(0.5);
        assert_vec_eq(fly.position, glm::vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn strafe_uses_the_right_vector() {
        let mut fly = controller();
        fly.move_speed = 2.0;
        fly.on_key("d", true);
        fly.tick(0.5);
        assert_vec_eq(fly.position, glm::vec3(1.0, 0.0, 0.0));

        fly.on_key("d", false);
        fly.on_key("a", true);
        fly.tick(1.0);
        assert_vec_eq(fly.position, glm::vec3(-1.0, 0.0, 0.0));
    }

    #[test]
    fn walking_ignores_pitch() {
        let mut fly = controller();
        fly.move_speed = 2.0;
        fly.pitch = 0.8;
        fly.on_key("w", true);
        fly.tick(0.5);
        // Full speed in the horizontal plane, no vertical drift.
        assert_vec_eq(fly.position, glm::vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn keys_are_case_insensitive_and_unknown_keys_are_ignored() {
        let mut fly = controller();
        fly.on_key("W", true);
        assert!(fly.forward_key);
        fly.on_key("q", true);
        fly.on_key("Escape", true);
        assert!(!fly.backward_key && !fly.left_key && !fly.right_key);
        fly.on_key("w", false);
        assert!(!fly.forward_key);
    }

    #[test]
    fn tick_without_movement_keys_is_a_no_op() {
        let mut fly = controller();
        fly.tick(1.0);
        assert_vec_eq(fly.position, glm::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn pitch_pins_exactly_at_the_limit() {
        let mut fly = controller();
        fly.on_pointer_down(0.0, 0.0);
        // Drag the pointer upward far past the limit, in many increments.
        for step in 1..100 {
            fly.on_pointer_move(0.0, f64::from(step) * -50.0);
        }
        assert_eq!(fly.pitch, PITCH_LIMIT);

        // One 10 px drag back down moves off the limit by exactly the step,
        // proving no hidden overshoot accumulated. The last sample above was
        // y = 99 * -50.
        fly.on_pointer_move(0.0, 99.0 * -50.0 + 10.0);
        assert!((fly.pitch - (PITCH_LIMIT - 10.0 * 0.005)).abs() < TOL);
    }

    #[test]
    fn vertical_look_suppresses_walking_without_nan() {
        let mut fly = controller();
        fly.move_speed = 2.0;
        fly.pitch = FRAC_PI_2; // straight up, past what drag allows
        fly.on_key("w", true);
        fly.tick(0.5);
        assert!(fly.position.x.is_finite());
        assert!(fly.position.y.is_finite());
        assert!(fly.position.z.is_finite());
        assert_vec_eq(fly.position, glm::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn strafe_still_works_while_looking_straight_up() {
        let mut fly = controller();
        fly.move_speed = 2.0;
        fly.pitch = FRAC_PI_2;
        fly.on_key("d", true);
        fly.tick(0.5);
        // The yaw-derived fallback keeps the right vector horizontal.
        assert_vec_eq(fly.position, glm::vec3(1.0, 0.0, 0.0));
    }

    #[test]
    fn yaw_wraps_without_any_clamp() {
        let mut fly = controller();
        fly.on_pointer_down(0.0, 0.0);
        fly.on_pointer_move(5000.0, 0.0);
        // 5000 px * 0.005 rad/px = 25 rad, far past a full turn.
        assert!((fly.yaw + 25.0).abs() < TOL);
    }

    #[test]
    fn wheel_dollies_along_the_view_direction() {
        let mut fly = controller();
        fly.dolly_sensitivity = 0.5;
        // Scroll up (negative delta) dollies forward.
        fly.on_wheel(-2.0);
        assert_vec_eq(fly.position, glm::vec3(0.0, 0.0, -1.0));
        // Scroll down backs away again.
        fly.on_wheel(2.0);
        assert_vec_eq(fly.position, glm::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn look_before_pointer_down_is_a_no_op() {
        let mut fly = controller();
        fly.on_pointer_move(300.0, 300.0);
        assert_eq!(fly.yaw, 0.0);
        assert_eq!(fly.pitch, 0.0);
    }

    #[test]
    fn initialize_faces_the_model_center() {
        let mut fly = controller();
        let bounds = ModelBounds {
            center: glm::vec3(1.0, 2.0, 3.0),
            size: glm::vec3(4.0, 2.0, 2.0),
        };
        fly.initialize(&bounds);
        // 1.5x the largest extent, backed off along +Z.
        assert_vec_eq(fly.position, glm::vec3(1.0, 2.0, 9.0));
        assert_eq!(fly.yaw, 0.0);
        assert_eq!(fly.pitch, 0.0);
    }
}
