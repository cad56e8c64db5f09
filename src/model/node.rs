use nalgebra_glm as glm;

/// Scene-graph node: local TRS plus a parent link. Parents may appear at any
/// index relative to their children.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Node {
    pub fn local_matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&self.rotation)
            * glm::scaling(&self.scale)
    }
}

/// Global transform per node, composed through the parent chain. Each node is
/// resolved once; already-computed parents are reused.
pub fn global_transforms(nodes: &[Node]) -> Vec<glm::Mat4> {
    let mut cache: Vec<Option<glm::Mat4>> = vec![None; nodes.len()];
    for index in 0..nodes.len() {
        resolve(index, nodes, &mut cache);
    }
    cache
        .into_iter()
        .map(|m| m.unwrap_or_else(glm::Mat4::identity))
        .collect()
}

fn resolve(index: usize, nodes: &[Node], cache: &mut Vec<Option<glm::Mat4>>) -> glm::Mat4 {
    if let Some(cached) = cache[index] {
        return cached;
    }
    let local = nodes[index].local_matrix();
    let global = match nodes[index].parent {
        // Self-parented nodes would recurse forever; treat them as roots.
        Some(parent) if parent != index => resolve(parent, nodes, cache) * local,
        _ => local,
    };
    cache[index] = Some(global);
    global
}
