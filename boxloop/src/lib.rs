//! boxloop - a tiny winit + wgpu frame loop.
//!
//! The loop talks to the window through the [`Platform`] trait, so the
//! scene logic can be driven by a fake platform in tests.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod math;
pub mod platform;
pub mod render;
pub mod scene;
pub mod window;

pub use crate::color::Color;
pub use crate::config::{EngineConfig, SceneConfig};
pub use crate::engine::{run_loop, Engine, FrameStats, Game};
pub use crate::error::StartupError;
pub use crate::input::{AxisBinding, InputState, Key};
pub use crate::math::{Rect, Viewport};
pub use crate::platform::{Platform, PlatformEvent};
pub use crate::render::{Frame, Renderer};
pub use crate::scene::{BoxScene, MovingBox};
pub use crate::window::WinitPlatform;
pub use glam::{IVec2, UVec2};
