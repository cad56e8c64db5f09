/// Point light pulled out of the asset. World-space position; intensity is
/// already multiplied by the configured scale at import time.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}
