use glam::{Mat4, Vec3};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::clock::FrameTime;

/// Units per second applied to radius and height while a control is held.
pub const ORBIT_SPEED: f32 = 3.0;
pub const INITIAL_RADIUS: f32 = 5.0;
pub const INITIAL_HEIGHT: f32 = 0.0;
pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const ASPECT_RATIO: f32 = 4.0 / 3.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// A single logical camera control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Raise,
    Lower,
    Widen,
    Narrow,
    Reset,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Raise,
        Control::Lower,
        Control::Widen,
        Control::Narrow,
        Control::Reset,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let control = match name.trim().to_ascii_lowercase().as_str() {
            "raise" | "up" => Control::Raise,
            "lower" | "down" => Control::Lower,
            "widen" | "out" => Control::Widen,
            "narrow" | "in" => Control::Narrow,
            "reset" => Control::Reset,
            _ => return None,
        };
        Some(control)
    }

    pub fn name(self) -> &'static str {
        match self {
            Control::Raise => "raise",
            Control::Lower => "lower",
            Control::Widen => "widen",
            Control::Narrow => "narrow",
            Control::Reset => "reset",
        }
    }
}

/// Pressed state of every camera control for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub raise: bool,
    pub lower: bool,
    pub widen: bool,
    pub narrow: bool,
    pub reset: bool,
}

impl Controls {
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns a copy with `control` held.
    pub fn with(mut self, control: Control) -> Self {
        self.set(control, true);
        self
    }

    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Raise => self.raise = held,
            Control::Lower => self.lower = held,
            Control::Widen => self.widen = held,
            Control::Narrow => self.narrow = held,
            Control::Reset => self.reset = held,
        }
    }

    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Raise => self.raise,
            Control::Lower => self.lower,
            Control::Widen => self.widen,
            Control::Narrow => self.narrow,
            Control::Reset => self.reset,
        }
    }

    pub fn any(&self) -> bool {
        Control::ALL.iter().any(|control| self.is_held(*control))
    }
}

impl FromIterator<Control> for Controls {
    fn from_iter<I: IntoIterator<Item = Control>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Controls::with)
    }
}

/// Camera orbiting a fixed center point.
///
/// Radius and height are driven by the held [`Controls`]; the angle around
/// the center follows total wall-clock time, so the camera keeps circling
/// even when no key is pressed.
#[derive(Debug, Clone)]
pub struct CameraRig {
    center: Vec3,
    radius: f32,
    height: f32,
    speed: f32,
    position: Vec3,
    view: Mat4,
    projection: Mat4,
    model: Mat4,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl CameraRig {
    /// Creates a rig at the initial radius and height around `center`.
    pub fn new(center: Vec3) -> Self {
        let mut rig = Self {
            center,
            radius: INITIAL_RADIUS,
            height: INITIAL_HEIGHT,
            speed: ORBIT_SPEED,
            position: center,
            view: Mat4::IDENTITY,
            projection: Mat4::perspective_rh_gl(
                FIELD_OF_VIEW_DEGREES.to_radians(),
                ASPECT_RATIO,
                NEAR_PLANE,
                FAR_PLANE,
            ),
            model: Mat4::IDENTITY,
        };
        rig.position = rig.orbit_position(0.0);
        rig.view = Mat4::look_at_rh(rig.position, rig.center, Vec3::Y);
        rig
    }

    /// Applies one frame of input and returns the `(view, projection)` pair.
    ///
    /// Deltas are applied in the order raise, lower, widen, narrow; reset
    /// wins over all of them when held.
    pub fn advance(&mut self, frame: FrameTime, controls: Controls) -> (Mat4, Mat4) {
        let step = (frame.elapsed * f64::from(self.speed)) as f32;
        if controls.raise {
            self.height += step;
        }
        if controls.lower {
            self.height -= step;
        }
        if controls.widen {
            self.radius += step;
        }
        if controls.narrow {
            self.radius -= step;
        }
        if controls.reset {
            self.reset();
        }

        self.position = self.orbit_position(frame.total);
        self.view = Mat4::look_at_rh(self.position, self.center, Vec3::Y);
        trace!(
            "rig t={:.3} dt={:.4} radius={:.3} height={:.3} position={}",
            frame.total,
            frame.elapsed,
            self.radius,
            self.height,
            self.position
        );
        (self.view, self.projection)
    }

    /// Snaps radius and height back to their initial values.
    pub fn reset(&mut self) {
        if self.radius != INITIAL_RADIUS || self.height != INITIAL_HEIGHT {
            debug!(
                "camera reset from radius={:.3} height={:.3}",
                self.radius, self.height
            );
        }
        self.radius = INITIAL_RADIUS;
        self.height = INITIAL_HEIGHT;
    }

    /// Point on the orbit for the given total time in seconds.
    pub fn orbit_position(&self, total_time: f64) -> Vec3 {
        let radius = f64::from(self.radius);
        self.center
            + Vec3::new(
                (radius * total_time.cos()) as f32,
                self.height,
                (radius * total_time.sin()) as f32,
            )
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Camera position computed by the latest [`CameraRig::advance`].
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Combined projection * view * model matrix for the vertex shader.
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}
