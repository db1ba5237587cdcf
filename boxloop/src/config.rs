use glam::{IVec2, UVec2};

use crate::{color::Color, math::Viewport};

/// Configuration values for the window and runtime behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "boxloop".into(),
            width: 800,
            height: 600,
            vsync: true,
        }
    }
}

impl EngineConfig {
    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable vertical sync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

/// Layout and look of the box scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    /// Top-left corner of the box on the first frame.
    pub start: IVec2,
    pub box_size: UVec2,
    /// Units moved per frame along each held axis.
    pub speed: i32,
    pub box_color: Color,
    pub background: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            start: IVec2::new(100, 100),
            box_size: UVec2::new(50, 50),
            speed: 5,
            box_color: Color::BLUE,
            background: Color::WHITE,
        }
    }
}

impl SceneConfig {
    #[must_use]
    pub fn with_start(mut self, x: i32, y: i32) -> Self {
        self.start = IVec2::new(x, y);
        self
    }

    #[must_use]
    pub fn with_box_size(mut self, width: u32, height: u32) -> Self {
        self.box_size = UVec2::new(width, height);
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, box_color: Color, background: Color) -> Self {
        self.box_color = box_color;
        self.background = background;
        self
    }
}
