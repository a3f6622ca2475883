use std::{
    sync::Arc,
    time::Instant
};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{
        ElementState,
        MouseButton,
        WindowEvent
    },
    event_loop::{
        ActiveEventLoop,
        ControlFlow,
        EventLoop
    },
    keyboard::{
        KeyCode,
        PhysicalKey
    },
    window::{
        Window,
        WindowId
    }
};

use crate::game::{
    input::Key,
    math::Vector2F,
    world::World
};
use crate::rendering::{
    renderer::{
        Renderer,
        RendererError
    },
    RenderBatch
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Event loop failed, reason='{0}'")]
    EventLoopError(#[from] winit::error::EventLoopError),

    #[error("Window creation failed, reason='{0}'")]
    WindowError(#[from] winit::error::OsError),

    #[error(transparent)]
    RendererError(#[from] RendererError),
}

/// Frame driver: owns the window, the renderer and the [`World`], runs one
/// whole pipeline pass per redraw. The elapsed wall time between redraws is
/// measured and handed to the update pass, never assumed constant.
pub struct GameApp {
    title: String,
    initial_size: PhysicalSize<u32>,
    renderer: Option<Renderer>,
    world: World,
    batch: RenderBatch,
    last_frame: Option<Instant>,
}

impl GameApp {
    pub fn new<S: AsRef<str>>(title: S, width: u32, height: u32, world: World) -> Self {
        Self {
            title: title.as_ref().to_string(),
            initial_size: PhysicalSize::new(width, height),
            renderer: None,
            world,
            batch: RenderBatch::new(),
            last_frame: None,
        }
    }

    /// Run until the window closes. Vsync plus `ControlFlow::Poll` keeps
    /// the pipeline near the display rate (~60 Hz on common displays).
    pub fn run(mut self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| (now - last).as_secs_f32())
            .unwrap_or(1.0 / 60.0);
        self.last_frame = Some(now);

        self.world.input.begin_frame();
        self.world.tick(dt);

        self.batch.clear();
        self.world.render(&mut self.batch);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.batch);
            renderer.get_window().request_redraw();
        }
    }
}

fn map_key(key: PhysicalKey) -> Option<Key> {
    match key {
        PhysicalKey::Code(KeyCode::ArrowUp) => Some(Key::Up),
        PhysicalKey::Code(KeyCode::ArrowDown) => Some(Key::Down),
        PhysicalKey::Code(KeyCode::ArrowLeft) => Some(Key::Left),
        PhysicalKey::Code(KeyCode::ArrowRight) => Some(Key::Right),
        PhysicalKey::Code(KeyCode::KeyW) => Some(Key::W),
        PhysicalKey::Code(KeyCode::KeyA) => Some(Key::A),
        PhysicalKey::Code(KeyCode::KeyS) => Some(Key::S),
        PhysicalKey::Code(KeyCode::KeyD) => Some(Key::D),
        PhysicalKey::Code(KeyCode::Space) => Some(Key::Space),
        PhysicalKey::Code(KeyCode::Escape) => Some(Key::Escape),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<Key> {
    match button {
        MouseButton::Left => Some(Key::MouseLeft),
        MouseButton::Right => Some(Key::MouseRight),
        _ => None,
    }
}

impl ApplicationHandler for GameApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Window creation failed: {err}");
                event_loop.exit();
                return;
            },
        };

        match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
            },
            Err(err) => {
                log::error!("Renderer creation failed: {err}");
                event_loop.exit();
                return;
            },
        }

        let size = window.inner_size();
        self.world
            .viewport
            .update_window_size(size.width as f32, size.height as f32);
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, clearing scene");
                self.world.clear();
                event_loop.exit();
            },
            WindowEvent::RedrawRequested => {
                self.frame();
            },
            WindowEvent::Resized(size) => {
                // Reconfigures the surface. No re-render here, this event
                // is always followed by a redraw request.
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
                self.world
                    .viewport
                    .update_window_size(size.width as f32, size.height as f32);
            },
            WindowEvent::KeyboardInput { device_id: _, event, is_synthetic: _ } => {
                if let Some(key) = map_key(event.physical_key) {
                    match event.state {
                        ElementState::Pressed => self.world.input.record_down(key),
                        ElementState::Released => self.world.input.record_up(key),
                    }
                }
            },
            WindowEvent::CursorMoved { device_id: _, position } => {
                self.world
                    .input
                    .record_pointer(Vector2F::new(position.x as f32, position.y as f32));
            },
            WindowEvent::MouseInput { device_id: _, state, button } => {
                if let Some(key) = map_mouse_button(button) {
                    match state {
                        ElementState::Pressed => self.world.input.record_down(key),
                        ElementState::Released => self.world.input.record_up(key),
                    }
                }
            },
            _ => (),
        }
    }
}
