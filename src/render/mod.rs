mod native;
mod shared;

pub use native::{RenderInitError, Renderer};
pub use shared::{parse_backends, OPENGL_TO_WGPU};
