/// One drawable primitive. Vertices are in the owning node's local space;
/// the renderer applies node transforms when it uploads or animates.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub node_index: usize,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Material base-color factor, baked per vertex.
    pub color: [f32; 4],
}
