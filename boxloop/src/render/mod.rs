mod wgpu_backend;

pub use wgpu_backend::{Frame, Renderer};
