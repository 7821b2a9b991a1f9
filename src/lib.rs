//! Colored cube viewed through a keyboard-driven orbit camera.
//!
//! The camera rig, input mapping, frame timing and mesh data live here and
//! can be exercised without a window. The binary wires them to winit and
//! the wgpu [`Renderer`].

pub mod app;
pub mod camera;
pub mod clock;
pub mod input;
pub mod mesh;
pub mod render;

pub use app::{describe_rig, simulate_headless, FrameOutcome, MatrixSink, OrbitDemo};
pub use camera::{CameraRig, Control, Controls};
pub use clock::{Clock, FrameTime, FrameTimer, ManualClock, SystemClock};
pub use input::{BindingError, InputState, KeyBindings, KeyCode, KeySource, NamedKey};
pub use mesh::{Mesh, MeshError, Vertex};
pub use render::{parse_backends, RenderInitError, Renderer};
