mod bounding_box;
mod line_vertex;
mod render;
mod renderer;
mod vertex;

pub use renderer::Renderer;
