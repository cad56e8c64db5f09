// Flattens a parsed glTF document into the viewer's own model structs.
// Buffer decoding stays in the gltf crate; this module only walks the
// document and re-shapes the data.

use nalgebra_glm as glm;

use crate::model::{
    AnimationClip, Channel, ChannelValues, Interpolation, Mesh, MeshVertex, Model, Node,
    PointLight, global_transforms,
};

use super::bounds;

pub fn build_model(
    source: &str,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    point_intensity_scale: f32,
) -> Model {
    let nodes = collect_nodes(document);
    let meshes = collect_meshes(document, buffers);
    let lights = collect_point_lights(document, &nodes, point_intensity_scale);
    let animations = collect_animations(document, buffers);
    let bounds = bounds::compute(document, &nodes);

    let name = document
        .default_scene()
        .and_then(|scene| scene.name())
        .unwrap_or(source)
        .to_string();

    Model {
        name,
        meshes,
        nodes,
        lights,
        animations,
        bounds,
    }
}

fn collect_nodes(document: &gltf::Document) -> Vec<Node> {
    let mut parents: Vec<Option<usize>> = vec![None; document.nodes().len()];
    for node in document.nodes() {
        for child in node.children() {
            parents[child.index()] = Some(node.index());
        }
    }

    document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            Node {
                name: node.name().unwrap_or_default().to_string(),
                parent: parents[node.index()],
                translation: glm::vec3(translation[0], translation[1], translation[2]),
                // glTF stores quaternions as xyzw
                rotation: glm::Quat::new(rotation[3], rotation[0], rotation[1], rotation[2]),
                scale: glm::vec3(scale[0], scale[1], scale[2]),
            }
        })
        .collect()
}

fn collect_meshes(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Mesh> {
    let mut meshes = Vec::new();

    for node in document.nodes() {
        let Some(mesh) = node.mesh() else { continue };
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let Some(positions) = reader.read_positions() else {
                log::warn!(
                    "primitive without positions in mesh '{}', skipping",
                    mesh.name().unwrap_or_default()
                );
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(normals) => normals.collect(),
                None => flat_normals(&positions, &indices),
            };

            let color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, position)| MeshVertex {
                    position: *position,
                    normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    color,
                })
                .collect();

            meshes.push(Mesh {
                node_index: node.index(),
                vertices,
                indices,
            });
        }
    }

    meshes
}

/// Per-vertex normals accumulated from face normals, for primitives that ship
/// without a NORMAL accessor. Area-weighted by the unnormalized cross
/// product.
fn flat_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![glm::vec3(0.0, 0.0, 0.0); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = glm::vec3(positions[a][0], positions[a][1], positions[a][2]);
        let pb = glm::vec3(positions[b][0], positions[b][1], positions[b][2]);
        let pc = glm::vec3(positions[c][0], positions[c][1], positions[c][2]);
        let face_normal = glm::cross(&(pb - pa), &(pc - pa));
        accumulated[a] += face_normal;
        accumulated[b] += face_normal;
        accumulated[c] += face_normal;
    }

    accumulated
        .into_iter()
        .map(|n| {
            if glm::length(&n) > 1e-8 {
                let n = glm::normalize(&n);
                [n.x, n.y, n.z]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

fn collect_point_lights(
    document: &gltf::Document,
    nodes: &[Node],
    intensity_scale: f32,
) -> Vec<PointLight> {
    let globals = global_transforms(nodes);
    let mut lights = Vec::new();

    for node in document.nodes() {
        let Some(light) = node.light() else { continue };
        if !matches!(light.kind(), gltf::khr_lights_punctual::Kind::Point) {
            continue;
        }
        let Some(global) = globals.get(node.index()) else {
            continue;
        };
        let position = global * glm::vec4(0.0, 0.0, 0.0, 1.0);
        let intensity = light.intensity() * intensity_scale;
        log::info!(
            "point light '{}': intensity {} scaled to {}",
            node.name().unwrap_or_default(),
            light.intensity(),
            intensity
        );
        lights.push(PointLight {
            position: [position.x, position.y, position.z],
            color: light.color(),
            intensity,
        });
    }

    lights
}

fn collect_animations(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Vec<AnimationClip> {
    document
        .animations()
        .enumerate()
        .map(|(clip_index, animation)| {
            let mut channels = Vec::new();
            let mut duration = 0.0_f32;

            for channel in animation.channels() {
                let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
                let Some(inputs) = reader.read_inputs() else {
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                if times.is_empty() {
                    continue;
                }

                let cubic = matches!(
                    channel.sampler().interpolation(),
                    gltf::animation::Interpolation::CubicSpline
                );
                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Step => Interpolation::Step,
                    // Cubic-spline tracks are reduced to linear over their
                    // spline vertices.
                    _ => Interpolation::Linear,
                };

                let values = match reader.read_outputs() {
                    Some(gltf::animation::util::ReadOutputs::Translations(iter)) => {
                        let values = spline_vertices(
                            iter.map(|t| glm::vec3(t[0], t[1], t[2])).collect(),
                            cubic,
                        );
                        ChannelValues::Translations(values)
                    }
                    Some(gltf::animation::util::ReadOutputs::Rotations(iter)) => {
                        let values = spline_vertices(
                            iter.into_f32()
                                .map(|r| glm::Quat::new(r[3], r[0], r[1], r[2]))
                                .collect(),
                            cubic,
                        );
                        ChannelValues::Rotations(values)
                    }
                    Some(gltf::animation::util::ReadOutputs::Scales(iter)) => {
                        let values = spline_vertices(
                            iter.map(|s| glm::vec3(s[0], s[1], s[2])).collect(),
                            cubic,
                        );
                        ChannelValues::Scales(values)
                    }
                    // Morph targets are not animated here.
                    _ => continue,
                };

                duration = duration.max(times[times.len() - 1]);
                channels.push(Channel {
                    node_index: channel.target().node().index(),
                    interpolation,
                    times,
                    values,
                });
            }

            AnimationClip {
                name: animation
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("clip {clip_index}")),
                duration,
                channels,
            }
        })
        .collect()
}

/// Cubic-spline outputs carry (in-tangent, vertex, out-tangent) triplets per
/// keyframe; keep the vertex.
fn spline_vertices<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if !cubic {
        return values;
    }
    values
        .chunks_exact(3)
        .map(|triplet| triplet[1])
        .collect()
}
