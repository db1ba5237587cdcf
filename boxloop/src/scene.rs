use anyhow::Result;
use glam::{IVec2, UVec2};

use crate::{
    color::Color,
    config::SceneConfig,
    engine::Game,
    input::{AxisBinding, Key},
    math::Rect,
    platform::Platform,
};

/// A solid box that moves a fixed number of units per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingBox {
    pub position: IVec2,
    pub size: UVec2,
    pub speed: i32,
    pub color: Color,
}

impl MovingBox {
    pub fn new(position: IVec2, size: UVec2, speed: i32, color: Color) -> Self {
        Self {
            position,
            size,
            speed,
            color,
        }
    }

    /// Per-frame displacement for the held keys.
    ///
    /// Each axis is `-speed`, `0` or `speed`; opposing keys cancel.
    pub fn delta(&self, key_down: impl Fn(Key) -> bool) -> IVec2 {
        IVec2::new(
            AxisBinding::HORIZONTAL.value(&key_down).saturating_mul(self.speed),
            AxisBinding::VERTICAL.value(&key_down).saturating_mul(self.speed),
        )
    }

    /// Move by one frame's worth of input. Position is not clamped to the
    /// viewport, so the box can leave it entirely; it only stops at the
    /// `i32` limits.
    pub fn step(&mut self, key_down: impl Fn(Key) -> bool) {
        let delta = self.delta(key_down);
        self.position = IVec2::new(
            self.position.x.saturating_add(delta.x),
            self.position.y.saturating_add(delta.y),
        );
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }
}

/// The whole demo: one box on a plain background.
#[derive(Clone, Debug)]
pub struct BoxScene {
    mover: MovingBox,
    background: Color,
}

impl BoxScene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            mover: MovingBox::new(config.start, config.box_size, config.speed, config.box_color),
            background: config.background,
        }
    }

    pub fn position(&self) -> IVec2 {
        self.mover.position
    }

    pub fn mover(&self) -> &MovingBox {
        &self.mover
    }

    pub fn background(&self) -> Color {
        self.background
    }
}

impl Default for BoxScene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Game for BoxScene {
    fn init(&mut self, _platform: &mut dyn Platform) -> Result<()> {
        log::info!(
            "Box starts at ({}, {}), {}x{}, {} units/frame",
            self.mover.position.x,
            self.mover.position.y,
            self.mover.size.x,
            self.mover.size.y,
            self.mover.speed
        );
        Ok(())
    }

    fn update(&mut self, platform: &dyn Platform) -> Result<()> {
        self.mover.step(|key| platform.key_down(key));
        Ok(())
    }

    fn draw(&mut self, platform: &mut dyn Platform) -> Result<()> {
        platform.clear(self.background)?;
        platform.draw_rect(self.mover.rect(), self.mover.color)?;
        Ok(())
    }
}
