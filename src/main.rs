use winit::event_loop::{ControlFlow, EventLoop};

mod animation;
mod app;
mod asset;
mod camera;
mod error;
mod model;
mod renderer;
mod settings;

use crate::app::handler::AppHandler;
use crate::camera::CameraMode;

pub const CONFY_APP_NAME: &str = "gltfvis-rs";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse command line arguments: an optional camera-mode flag and the
    // asset path or URL.
    let mut asset_source = None;
    let mut mode_override = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--orbit" => mode_override = Some(CameraMode::Orbit),
            "--fly" => mode_override = Some(CameraMode::Fly),
            _ => asset_source = Some(arg),
        }
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler {
        app: None,
        asset_source,
        mode_override,
        runtime: tokio::runtime::Runtime::new()?,
    };

    event_loop.run_app(&mut handler)?;

    Ok(())
}
