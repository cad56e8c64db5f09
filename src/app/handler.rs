use std::sync::Arc;
use tokio::runtime::Runtime;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::app::app::App;
use crate::asset;
use crate::camera::CameraMode;
use crate::settings::Settings;

pub struct AppHandler {
    pub app: Option<App>,
    pub asset_source: Option<String>,
    pub mode_override: Option<CameraMode>,
    pub runtime: Runtime,
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("GltfVis-RS - glTF Model Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0));

            let window = event_loop.create_window(window_attrs).unwrap();

            let settings = Settings::load();
            let mode = self.mode_override.unwrap_or(settings.camera.mode);

            // The load is kicked off before the app exists; its events queue
            // up in the channel until the frame loop drains them.
            let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
            match &self.asset_source {
                Some(source) => asset::spawn_load(
                    self.runtime.handle(),
                    source.clone(),
                    settings.lighting.point_intensity_scale,
                    sender,
                ),
                None => log::warn!("no asset given; rendering an empty scene"),
            }

            let app = self
                .runtime
                .block_on(App::new(Arc::new(window), settings, mode, receiver))
                .unwrap();

            self.app = Some(app);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            if let Err(e) = app.frame() {
                log::error!("render error: {e:?}");
            }
            app.window.request_redraw();
        }
    }
}
