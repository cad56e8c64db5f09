use nalgebra_glm as glm;

/// Keyframe interpolation mode. Cubic-spline channels from the asset are
/// reduced to linear over their spline vertices at import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

#[derive(Debug, Clone)]
pub enum ChannelValues {
    Translations(Vec<glm::Vec3>),
    Rotations(Vec<glm::Quat>),
    Scales(Vec<glm::Vec3>),
}

/// One animated node property with its keyframe track. `times` is strictly
/// increasing and matches `values` in length.
#[derive(Debug, Clone)]
pub struct Channel {
    pub node_index: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}
