use nalgebra_glm as glm;

use crate::model::{ModelBounds, Node, global_transforms};

/// Union of all primitive extents in world space. None when the scene has no
/// geometry, in which case camera seating is skipped.
pub fn compute(document: &gltf::Document, nodes: &[Node]) -> Option<ModelBounds> {
    let globals = global_transforms(nodes);
    let boxes = document.nodes().filter_map(|node| {
        let mesh = node.mesh()?;
        let global = globals.get(node.index()).copied()?;
        Some(
            mesh.primitives()
                .map(move |primitive| {
                    let bb = primitive.bounding_box();
                    (global, bb.min, bb.max)
                })
                .collect::<Vec<_>>(),
        )
    });
    union_boxes(boxes.flatten())
}

/// Fold transformed boxes into one axis-aligned hull. Each box contributes
/// its 8 corners after transformation, so rotated boxes stay covered.
fn union_boxes(
    boxes: impl Iterator<Item = (glm::Mat4, [f32; 3], [f32; 3])>,
) -> Option<ModelBounds> {
    let mut overall_min = [f32::INFINITY; 3];
    let mut overall_max = [f32::NEG_INFINITY; 3];
    let mut has_geometry = false;

    for (matrix, min, max) in boxes {
        // Inverted extents mean the accessor carried no usable min/max.
        if min[0] > max[0] || min[1] > max[1] || min[2] > max[2] {
            continue;
        }
        for corner in box_corners(min, max) {
            let world = matrix * glm::vec4(corner[0], corner[1], corner[2], 1.0);
            for axis in 0..3 {
                overall_min[axis] = overall_min[axis].min(world[axis]);
                overall_max[axis] = overall_max[axis].max(world[axis]);
            }
        }
        has_geometry = true;
    }

    if !has_geometry {
        return None;
    }

    let min = glm::vec3(overall_min[0], overall_min[1], overall_min[2]);
    let max = glm::vec3(overall_max[0], overall_max[1], overall_max[2]);
    Some(ModelBounds {
        center: (min + max) * 0.5,
        size: max - min,
    })
}

fn box_corners(min: [f32; 3], max: [f32; 3]) -> [[f32; 3]; 8] {
    [
        [min[0], min[1], min[2]],
        [max[0], min[1], min[2]],
        [min[0], max[1], min[2]],
        [max[0], max[1], min[2]],
        [min[0], min[1], max[2]],
        [max[0], min[1], max[2]],
        [min[0], max[1], max[2]],
        [max[0], max[1], max[2]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-5;

    #[test]
    fn unions_translated_boxes() {
        let unit = ([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        let boxes = vec![
            (glm::Mat4::identity(), unit.0, unit.1),
            (glm::translation(&glm::vec3(5.0, 0.0, 0.0)), unit.0, unit.1),
        ];
        let bounds = union_boxes(boxes.into_iter()).unwrap();
        assert!(glm::length(&(bounds.center - glm::vec3(2.5, 0.0, 0.0))) < TOL);
        assert!(glm::length(&(bounds.size - glm::vec3(7.0, 2.0, 2.0))) < TOL);
    }

    #[test]
    fn rotation_swaps_the_covered_extents() {
        // A long X box rotated a quarter turn about Y covers Z instead.
        let rotation = glm::rotation(std::f32::consts::FRAC_PI_2, &glm::vec3(0.0, 1.0, 0.0));
        let boxes = vec![(rotation, [-4.0, -1.0, -1.0], [4.0, 1.0, 1.0])];
        let bounds = union_boxes(boxes.into_iter()).unwrap();
        assert!((bounds.size.x - 2.0).abs() < 1e-4);
        assert!((bounds.size.z - 8.0).abs() < 1e-4);
    }

    #[test]
    fn invalid_extents_are_skipped() {
        let boxes = vec![(glm::Mat4::identity(), [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0])];
        assert!(union_boxes(boxes.into_iter()).is_none());
    }

    #[test]
    fn no_geometry_yields_no_bounds() {
        assert!(union_boxes(std::iter::empty()).is_none());
    }
}
