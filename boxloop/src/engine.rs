use anyhow::{Context, Result};

use crate::{
    config::EngineConfig,
    platform::{Platform, PlatformEvent},
    window::WinitPlatform,
};

/// Main entrypoint for running a boxloop game.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine instance with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config = self.config.with_title(title);
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config = self.config.with_size(width, height);
        self
    }

    /// Enable or disable vertical sync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config = self.config.with_vsync(vsync);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open the window and run `game` until the window is closed.
    ///
    /// The window and GPU resources are released before this returns.
    pub fn run<G: Game>(self, mut game: G) -> Result<()> {
        let mut platform =
            WinitPlatform::open(&self.config).context("failed to start graphics")?;

        let stats = run_loop(&mut platform, &mut game)?;
        log::info!("Window closed after {} frames", stats.frames);
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait implemented by user code to hook into the frame loop.
pub trait Game {
    /// Called once before the first frame.
    fn init(&mut self, _platform: &mut dyn Platform) -> Result<()> {
        Ok(())
    }

    /// Update game state. Called once per frame before drawing.
    fn update(&mut self, platform: &dyn Platform) -> Result<()>;

    /// Draw the current frame. The loop presents it afterwards.
    fn draw(&mut self, platform: &mut dyn Platform) -> Result<()>;
}

/// Counters reported when the loop finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames presented.
    pub frames: u64,
}

/// Run frames on `platform` until a close event arrives.
///
/// Each frame drains events, lets the game update and draw, then
/// presents. A close event ends the loop before anything else happens in
/// that frame.
pub fn run_loop<G: Game + ?Sized>(platform: &mut dyn Platform, game: &mut G) -> Result<FrameStats> {
    game.init(platform)?;

    let mut stats = FrameStats::default();
    loop {
        let mut close_requested = false;
        for event in platform.poll_events()? {
            match event {
                PlatformEvent::CloseRequested => close_requested = true,
                PlatformEvent::Resized { width, height } => {
                    log::debug!("Viewport resized to {width}x{height}");
                }
            }
        }
        if close_requested {
            break;
        }

        game.update(platform)?;
        game.draw(platform)?;
        platform.present()?;
        stats.frames += 1;
    }

    Ok(stats)
}
