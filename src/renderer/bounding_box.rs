use wgpu::util::DeviceExt;

use crate::model::ModelBounds;
use crate::renderer::line_vertex::LineVertex;
use crate::renderer::renderer::Renderer;

const BBOX_COLOR: [f32; 3] = [1.0, 1.0, 0.0];

impl Renderer {
    /// Wireframe box around the model bounds, 12 edges as a line list.
    pub fn generate_bounding_box_lines(&mut self, bounds: &ModelBounds) {
        let min = bounds.min();
        let max = bounds.max();

        let corners = [
            // Bottom face (y = min.y)
            [min.x, min.y, min.z],
            [max.x, min.y, min.z],
            [max.x, min.y, max.z],
            [min.x, min.y, max.z],
            // Top face (y = max.y)
            [min.x, max.y, min.z],
            [max.x, max.y, min.z],
            [max.x, max.y, max.z],
            [min.x, max.y, max.z],
        ];

        let mut vertices = Vec::with_capacity(24);

        // Bottom face edges
        for i in 0..4 {
            let next = (i + 1) % 4;
            vertices.push(LineVertex {
                position: corners[i],
                color: BBOX_COLOR,
            });
            vertices.push(LineVertex {
                position: corners[next],
                color: BBOX_COLOR,
            });
        }

        // Top face edges
        for i in 0..4 {
            let next = 4 + (i + 1) % 4;
            vertices.push(LineVertex {
                position: corners[4 + i],
                color: BBOX_COLOR,
            });
            vertices.push(LineVertex {
                position: corners[next],
                color: BBOX_COLOR,
            });
        }

        // Vertical edges connecting bottom to top
        for i in 0..4 {
            vertices.push(LineVertex {
                position: corners[i],
                color: BBOX_COLOR,
            });
            vertices.push(LineVertex {
                position: corners[i + 4],
                color: BBOX_COLOR,
            });
        }

        self.bounding_box_vertex_buffer =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Bounding Box Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
        self.num_bounding_box_vertices = vertices.len() as u32;

        log::debug!(
            "bounding box: center {:?}, size {:?}",
            bounds.center,
            bounds.size
        );
    }
}
