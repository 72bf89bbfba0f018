//! Viewer application implementing winit ApplicationHandler
//!
//! Buffers input between frames; each redraw ticks the clock, feeds the
//! buffered events to the camera, draws the scene and presents.

use crate::scene::Scene;
use anyhow::Context;
use glam::Vec3;
use std::sync::Arc;
use strata_core::StrataConfig;
use strata_render::{create_backend, RenderBackend, RenderContext};
use strata_runtime::{CameraEvent, FrameClock, FreeCamera, InputState};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

/// Pixel-delta scroll is converted to notches at this many pixels each
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

pub struct ViewerApp {
    config: StrataConfig,
    scene: Scene,

    clock: FrameClock,
    input: InputState,
    camera: FreeCamera,

    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    backend: Box<dyn RenderBackend>,

    /// Left button held: pointer drives the camera
    look_engaged: bool,
    /// Unbounded pointer position accumulated from raw motion while grabbed
    virtual_pointer: (f64, f64),

    error: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(config: StrataConfig, scene: Scene) -> Self {
        let clock = FrameClock::with_report_interval(config.render.fps_report_interval);
        let camera = FreeCamera::from_config(&config.camera);
        let backend = create_backend(config.render.backend);
        Self {
            config,
            scene,
            clock,
            input: InputState::new(),
            camera,
            window: None,
            render_context: None,
            backend,
            look_engaged: false,
            virtual_pointer: (0.0, 0.0),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_config = &self.config.window;
        let window_attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );

        if window_config.fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let render_context =
            pollster::block_on(RenderContext::new(window.clone(), window_config))
                .context("Failed to initialize renderer")?;

        self.camera.set_aspect(render_context.aspect_ratio());
        self.backend
            .upload(&render_context, &self.scene.mesh_data())
            .context("Failed to upload mesh")?;

        self.window = Some(window);
        self.render_context = Some(render_context);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn engage_look(&mut self) {
        if let Some(window) = &self.window {
            // Try locked first, then confined
            let _ = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            window.set_cursor_visible(false);
        }
        self.look_engaged = true;
        self.input.push(CameraEvent::Engaged);
    }

    fn release_look(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.look_engaged = false;
        self.input.push(CameraEvent::Released);
    }

    fn toggle_vertex_mode(&mut self, event_loop: &ActiveEventLoop) {
        let Scene::Heightmap(terrain) = &mut self.scene else {
            return;
        };
        let mode = terrain.toggle_mode();
        tracing::info!("Vertex mode: {}", mode);

        let Some(context) = &self.render_context else {
            return;
        };
        let uploaded = self.backend.upload(context, &self.scene.mesh_data());
        if let Err(e) = uploaded {
            self.fail(event_loop, anyhow::Error::new(e).context("Failed to upload mesh"));
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();

        for event in self.input.drain_events() {
            self.camera.apply(event);
        }
        let camera_frame = self
            .camera
            .update(dt as f32, self.input.held_keys(), Vec3::Z);

        let Some(context) = &mut self.render_context else {
            return;
        };
        let matrices = self
            .scene
            .matrices(&camera_frame, self.clock.total_time, context.aspect_ratio());

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost or outdated, reconfiguring");
                context.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("Surface out of memory"));
                return;
            }
            Err(e) => {
                tracing::warn!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(e) = self.backend.draw(context, &matrices, &view) {
            tracing::error!("Render error: {}", e);
        }

        output.present();

        if let Some(report) = self.clock.end_frame() {
            tracing::info!(
                "{} frames, average {:.1} fps ({} backend)",
                report.frames,
                report.average_fps,
                self.backend.kind()
            );
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                    self.camera.set_aspect(context.aspect_ratio());
                }
            }

            WindowEvent::Focused(false) => {
                self.input.release_all();
                if self.look_engaged {
                    self.release_look();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => {
                        match key_code {
                            KeyCode::Escape => {
                                event_loop.exit();
                                return;
                            }
                            KeyCode::KeyM if !event.repeat => self.toggle_vertex_mode(event_loop),
                            _ => {}
                        }
                        self.input.process_key_down(key_code);
                    }
                    ElementState::Released => {
                        self.input.process_key_up(key_code);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if !self.scene.uses_camera() {
                    return;
                }
                match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => self.engage_look(),
                    (MouseButton::Left, ElementState::Released) => self.release_look(),
                    (MouseButton::Right, ElementState::Pressed) => {
                        self.input.push(CameraEvent::Snapped)
                    }
                    _ => {}
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                // While grabbed the camera is fed from raw motion instead
                if !self.look_engaged {
                    self.virtual_pointer = (position.x, position.y);
                    self.input.push(CameraEvent::PointerMoved {
                        x: position.x,
                        y: position.y,
                    });
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_SCROLL_LINE,
                };
                self.input.push(CameraEvent::Scrolled { y });
            }

            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if !self.look_engaged {
            return;
        }

        if let DeviceEvent::MouseMotion { delta } = event {
            self.virtual_pointer.0 += delta.0;
            self.virtual_pointer.1 += delta.1;
            self.input.push(CameraEvent::PointerMoved {
                x: self.virtual_pointer.0,
                y: self.virtual_pointer.1,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
