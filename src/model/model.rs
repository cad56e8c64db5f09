use super::{AnimationClip, Mesh, ModelBounds, Node, PointLight};

/// A fully imported asset, decoupled from both the parser and the GPU.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub lights: Vec<PointLight>,
    pub animations: Vec<AnimationClip>,
    /// None when the scene carries no geometry; camera seating and grid
    /// generation are skipped in that case.
    pub bounds: Option<ModelBounds>,
}
