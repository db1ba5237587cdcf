use std::{sync::Arc, time::Duration};

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

use crate::{
    color::Color,
    config::EngineConfig,
    error::StartupError,
    input::{InputState, Key},
    math::Rect,
    platform::{Platform, PlatformEvent},
    render::{Frame, Renderer},
};

/// [`Platform`] backed by a winit window and the wgpu renderer.
///
/// Events are pumped without blocking at the start of each frame, so the
/// frame loop stays an ordinary `loop` instead of a winit callback. The
/// window and GPU resources are released when this is dropped.
pub struct WinitPlatform {
    // Declared first so an unfinished frame is dropped before the surface.
    frame: Option<Frame>,
    // Set when the surface refused a frame; cleared by `present`.
    frame_skipped: bool,
    renderer: Renderer,
    input: InputState,
    window: Arc<Window>,
    event_loop: EventLoop<()>,
}

impl WinitPlatform {
    /// Create the event loop, the window and the renderer.
    pub fn open(config: &EngineConfig) -> Result<Self, StartupError> {
        let event_loop = EventLoop::new()?;

        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        let viewport = config.viewport();
        window_attributes.inner_size =
            Some(LogicalSize::new(viewport.width, viewport.height).into());
        window_attributes.resizable = false;
        #[allow(deprecated)]
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let renderer = Renderer::new(window.clone(), config.vsync)?;
        log::info!(
            "Opened {}x{} window \"{}\"",
            viewport.width,
            viewport.height,
            config.title
        );

        Ok(Self {
            frame: None,
            frame_skipped: false,
            renderer,
            input: InputState::new(),
            window,
            event_loop,
        })
    }

    /// The frame currently being drawn, begun on first use.
    ///
    /// `None` means the surface skipped this frame; drawing becomes a no-op
    /// until the next present so the loop returns to polling events.
    fn current_frame(&mut self) -> Result<Option<(&mut Renderer, &mut Frame)>> {
        if self.frame.is_none() && !self.frame_skipped {
            self.frame = self.renderer.begin_frame()?;
            self.frame_skipped = self.frame.is_none();
        }
        match self.frame.as_mut() {
            Some(frame) => Ok(Some((&mut self.renderer, frame))),
            None => Ok(None),
        }
    }
}

impl Platform for WinitPlatform {
    fn poll_events(&mut self) -> Result<Vec<PlatformEvent>> {
        let mut collector = EventCollector {
            input: &mut self.input,
            events: Vec::new(),
            resized: None,
        };
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut collector);

        let EventCollector {
            mut events, resized, ..
        } = collector;

        if let Some(size) = resized {
            self.renderer.set_scale_factor(self.window.scale_factor());
            self.renderer.resize(size);
            let viewport = self.renderer.viewport();
            events.push(PlatformEvent::Resized {
                width: viewport.width,
                height: viewport.height,
            });
        }

        if let PumpStatus::Exit(code) = status {
            log::debug!("Event loop exited with code {code}");
            events.push(PlatformEvent::CloseRequested);
        }

        Ok(events)
    }

    fn key_down(&self, key: Key) -> bool {
        self.input.is_key_down(key)
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        match self.current_frame()? {
            Some((renderer, frame)) => renderer.clear(frame, color),
            None => Ok(()),
        }
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        match self.current_frame()? {
            Some((renderer, frame)) => renderer.draw_rect(frame, rect, color),
            None => Ok(()),
        }
    }

    fn present(&mut self) -> Result<()> {
        self.frame_skipped = false;
        match self.frame.take() {
            Some(frame) => self.renderer.end_frame(frame),
            None => Ok(()),
        }
    }
}

/// Gathers one pump's worth of window events.
struct EventCollector<'a> {
    input: &'a mut InputState,
    events: Vec<PlatformEvent>,
    resized: Option<winit::dpi::PhysicalSize<u32>>,
}

impl ApplicationHandler for EventCollector<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.events.push(PlatformEvent::CloseRequested),
            WindowEvent::KeyboardInput { event, .. } => self.input.handle_key(&event),
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::Resized(size) => self.resized = Some(size),
            _ => {}
        }
    }
}
