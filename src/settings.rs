use crate::CONFY_APP_NAME;
use crate::camera::CameraMode;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub mode: CameraMode,
    /// Orbit drag, radians per pixel.
    pub drag_sensitivity: f32,
    /// Fly look, radians per pixel.
    pub look_sensitivity: f32,
    /// Fly translation, world units per second.
    pub move_speed: f32,
    /// Fly wheel dolly, world units per scroll notch.
    pub dolly_sensitivity: f32,
    pub auto_rotate: bool,
    /// Radians per second while auto-rotate is on and no drag is active.
    pub auto_rotate_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            mode: CameraMode::Orbit,
            drag_sensitivity: 0.005,
            look_sensitivity: 0.005,
            move_speed: 2.0,
            dolly_sensitivity: 0.5,
            auto_rotate: false,
            auto_rotate_speed: 0.5,
        }
    }
}

impl CameraSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "camera").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub show_grid: bool,
    pub show_bounding_box: bool,
    pub far_plane: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_bounding_box: false,
            far_plane: 1000.0,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingSettings {
    pub ambient_color: [f32; 3],
    /// Direction toward the sun; normalized at use.
    pub sun_direction: [f32; 3],
    pub sun_color: [f32; 3],
    /// Applied to point-light intensities found in the asset. glTF stores
    /// candela; the renderer works in a unit-less scale.
    pub point_intensity_scale: f32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_color: [0.25, 0.25, 0.25],
            sun_direction: [1.0, 1.0, 1.0],
            sun_color: [1.0, 1.0, 1.0],
            point_intensity_scale: 0.001,
        }
    }
}

impl LightingSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "lighting").unwrap_or_default()
    }
}

// Aggregate struct for convenience
pub struct Settings {
    pub camera: CameraSettings,
    pub display: DisplaySettings,
    pub lighting: LightingSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            camera: CameraSettings::load(),
            display: DisplaySettings::load(),
            lighting: LightingSettings::load(),
        }
    }
}
