use nalgebra_glm as glm;

/// World up axis shared by both camera models.
pub fn world_up() -> glm::Vec3 {
    glm::vec3(0.0, 1.0, 0.0)
}

/// Unit view direction for a yaw/pitch pair. Yaw 0, pitch 0 faces -Z; yaw
/// rotates about the world vertical, pitch about the camera's own horizontal
/// axis, in that order, so no roll accumulates.
pub fn forward_from(yaw: f32, pitch: f32) -> glm::Vec3 {
    glm::vec3(
        -yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
}

/// How the camera is aimed: orbit keeps a fixed look-at target, fly carries
/// free angles.
#[derive(Debug, Clone, Copy)]
pub enum Orientation {
    LookAt(glm::Vec3),
    YawPitch { yaw: f32, pitch: f32 },
}

/// Camera pose handed to the renderer once per frame. Owned and mutated by
/// the active controller; the renderer only reads it.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub position: glm::Vec3,
    pub orientation: Orientation,
}

impl CameraPose {
    pub fn view_matrix(&self) -> glm::Mat4 {
        let center = match self.orientation {
            Orientation::LookAt(target) => target,
            Orientation::YawPitch { yaw, pitch } => self.position + forward_from(yaw, pitch),
        };
        glm::look_at(&self.position, &center, &world_up())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_faces_negative_z_at_rest() {
        let f = forward_from(0.0, 0.0);
        assert!((f.x).abs() < 1e-6);
        assert!((f.y).abs() < 1e-6);
        assert!((f.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn forward_is_unit_length() {
        let f = forward_from(1.3, -0.7);
        assert!((glm::length(&f) - 1.0).abs() < 1e-6);
    }
}
