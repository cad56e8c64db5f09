mod fly;
mod orbit;
mod pose;

pub use fly::FlyController;
pub use orbit::OrbitController;
pub use pose::{CameraPose, Orientation};

use serde::{Deserialize, Serialize};

use crate::model::ModelBounds;

/// Which camera strategy a viewer session runs. Exactly one per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Orbit,
    Fly,
}

/// Mouse/keyboard camera strategy behind which orbit and fly are selected at
/// construction time. Pointer coordinates are window pixels; wheel deltas are
/// sign-normalized so positive means scroll down / away (zoom out, dolly
/// back).
pub trait CameraController {
    /// Seat the camera against the loaded model's bounds. Called once, after
    /// the asset load resolves.
    fn initialize(&mut self, bounds: &ModelBounds);

    fn on_pointer_down(&mut self, x: f64, y: f64);

    fn on_pointer_move(&mut self, x: f64, y: f64);

    /// Ends the drag; idempotent, also used for pointer-leave.
    fn on_pointer_up(&mut self);

    fn on_wheel(&mut self, delta: f32);

    fn on_key(&mut self, _key: &str, _pressed: bool) {}

    fn tick(&mut self, dt: f32);

    fn pose(&self) -> &CameraPose;
}

/// Transient pointer-drag state shared by both controllers. While inactive,
/// pointer-move samples are discarded.
#[derive(Debug, Default)]
pub struct DragSession {
    active: bool,
    last_x: f64,
    last_y: f64,
}

impl DragSession {
    pub fn begin(&mut self, x: f64, y: f64) {
        self.active = true;
        self.last_x = x;
        self.last_y = y;
    }

    pub fn end(&mut self) {
        self.active = false;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Pointer delta since the last sample, or None while no drag is active.
    pub fn advance(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.active {
            return None;
        }
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_without_begin_yields_nothing() {
        let mut drag = DragSession::default();
        assert!(drag.advance(10.0, 20.0).is_none());
    }

    #[test]
    fn delta_accumulates_from_begin_point() {
        let mut drag = DragSession::default();
        drag.begin(100.0, 100.0);
        assert_eq!(drag.advance(103.0, 98.0), Some((3.0, -2.0)));
        assert_eq!(drag.advance(103.0, 98.0), Some((0.0, 0.0)));
    }

    #[test]
    fn end_is_idempotent_and_stops_deltas() {
        let mut drag = DragSession::default();
        drag.begin(0.0, 0.0);
        drag.end();
        drag.end();
        assert!(!drag.active());
        assert!(drag.advance(5.0, 5.0).is_none());
    }
}
