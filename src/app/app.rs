use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;
use winit::window::Window;

use crate::animation::AnimationPlayer;
use crate::asset::AssetEvent;
use crate::camera::{CameraController, CameraMode, FlyController, OrbitController};
use crate::error::ViewerError;
use crate::model::{Model, global_transforms};
use crate::renderer::Renderer;
use crate::settings::Settings;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

/// One viewer session: window, renderer, the active camera controller, and
/// the channel the background asset load reports into.
pub struct App {
    pub window: Arc<Window>,
    renderer: Renderer,
    controller: Box<dyn CameraController>,
    animation: AnimationPlayer,
    model: Option<Model>,
    asset_events: UnboundedReceiver<AssetEvent>,
    settings: Settings,
    current_cursor_pos: (f64, f64),
    last_frame: Instant,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        settings: Settings,
        mode: CameraMode,
        asset_events: UnboundedReceiver<AssetEvent>,
    ) -> Result<Self, ViewerError> {
        let mut renderer = Renderer::new(&window).await?;
        renderer.update_lighting(&settings.lighting, &[]);

        let controller: Box<dyn CameraController> = match mode {
            CameraMode::Orbit => Box::new(OrbitController::new(&settings.camera)),
            CameraMode::Fly => Box::new(FlyController::new(&settings.camera)),
        };
        log::info!("camera mode: {mode:?}");

        Ok(Self {
            window,
            renderer,
            controller,
            animation: AnimationPlayer::new(),
            model: None,
            asset_events,
            settings,
            current_cursor_pos: (0.0, 0.0),
            last_frame: Instant::now(),
        })
    }

    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> EventResponse {
        let mut repaint = false;

        match event {
            winit::event::WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            winit::event::WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == winit::event::ElementState::Pressed;
                match &event.logical_key {
                    winit::keyboard::Key::Named(winit::keyboard::NamedKey::Escape) => {
                        return EventResponse {
                            repaint: false,
                            exit: true,
                        };
                    }
                    winit::keyboard::Key::Character(text) => {
                        self.controller.on_key(text.as_str(), pressed);
                    }
                    _ => {}
                }
            }
            winit::event::WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                repaint = true;
            }
            winit::event::WindowEvent::MouseInput { state, button, .. } => {
                if *button == winit::event::MouseButton::Left {
                    if *state == winit::event::ElementState::Pressed {
                        let (x, y) = self.current_cursor_pos;
                        self.controller.on_pointer_down(x, y);
                    } else {
                        self.controller.on_pointer_up();
                    }
                }
            }
            winit::event::WindowEvent::CursorMoved { position, .. } => {
                self.current_cursor_pos = (position.x, position.y);
                self.controller.on_pointer_move(position.x, position.y);
                repaint = true;
            }
            winit::event::WindowEvent::CursorLeft { .. } => {
                self.controller.on_pointer_up();
            }
            winit::event::WindowEvent::MouseWheel { delta, .. } => {
                // Normalize to the browser-style convention the controllers
                // expect: positive = scroll down / away.
                let delta = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => -*y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) * 0.05,
                };
                self.controller.on_wheel(delta);
                repaint = true;
            }
            _ => {}
        }

        EventResponse {
            repaint,
            exit: false,
        }
    }

    /// One animation frame: drain asset events, advance controller and
    /// animation by the measured delta, draw.
    pub fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.drain_asset_events();

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.controller.tick(dt);

        if let Some(model) = &mut self.model {
            if self
                .animation
                .update(dt, &model.animations, &mut model.nodes)
            {
                let globals = global_transforms(&model.nodes);
                self.renderer.update_animation(&globals);
            }
        }

        self.renderer.render(
            self.controller.pose(),
            self.settings.display.show_grid,
            self.settings.display.show_bounding_box,
            self.settings.display.far_plane,
        )
    }

    fn drain_asset_events(&mut self) {
        while let Ok(event) = self.asset_events.try_recv() {
            match event {
                AssetEvent::Progress(fraction) => {
                    log::debug!("asset load {:.0}%", fraction * 100.0);
                }
                AssetEvent::Loaded(model) => self.install_model(*model),
                AssetEvent::Failed(message) => {
                    // Non-fatal: the scene keeps rendering with no model and
                    // the camera stays unseated.
                    log::error!("asset load failed: {message}");
                }
            }
        }
    }

    fn install_model(&mut self, model: Model) {
        log::info!(
            "loaded model '{}': {} meshes, {} nodes, {} point lights, {} animations",
            model.name,
            model.meshes.len(),
            model.nodes.len(),
            model.lights.len(),
            model.animations.len()
        );

        self.renderer.upload_model(&model);
        self.renderer
            .update_lighting(&self.settings.lighting, &model.lights);

        if let Some(bounds) = model.bounds {
            self.controller.initialize(&bounds);
            self.renderer.regenerate_grid(&bounds);
            self.renderer.generate_bounding_box_lines(&bounds);
        } else {
            log::warn!("model has no geometry; camera left at its default pose");
        }

        self.animation.init_from_model(&model);
        self.model = Some(model);
    }
}
