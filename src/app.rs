use glam::Mat4;
use log::{debug, info};

use crate::camera::{CameraRig, Control};
use crate::clock::{Clock, FrameTimer, ManualClock};
use crate::input::{InputState, KeyBindings, KeySource};

/// Receiver for the combined model-view-projection matrix of a frame.
pub trait MatrixSink {
    fn submit_mvp(&mut self, mvp: Mat4);
}

impl MatrixSink for Vec<Mat4> {
    fn submit_mvp(&mut self, mvp: Mat4) {
        self.push(mvp);
    }
}

/// What the caller should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Quit,
}

/// Per-frame driver tying the clock, keyboard and camera rig together.
#[derive(Debug, Clone, Default)]
pub struct OrbitDemo {
    rig: CameraRig,
    timer: FrameTimer,
    bindings: KeyBindings,
    frames: u64,
}

impl OrbitDemo {
    pub fn new(rig: CameraRig, bindings: KeyBindings) -> Self {
        Self {
            rig,
            timer: FrameTimer::new(),
            bindings,
            frames: 0,
        }
    }

    /// Runs one frame: samples time and keys, advances the rig and hands
    /// the resulting MVP to `sink`.
    pub fn frame(
        &mut self,
        clock: &impl Clock,
        keys: &impl KeySource,
        sink: &mut impl MatrixSink,
    ) -> FrameOutcome {
        let frame_time = self.timer.tick(clock.now());
        let controls = self.bindings.controls(keys);
        self.rig.advance(frame_time, controls);
        sink.submit_mvp(self.rig.mvp());
        self.frames += 1;

        if self.bindings.wants_quit(keys) {
            FrameOutcome::Quit
        } else {
            FrameOutcome::Continue
        }
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Drives `demo` for `frames` fixed steps of `frame_time` seconds with the
/// given controls held for the whole run. Frame `i` sees total time
/// `i * frame_time`.
pub fn simulate_headless(
    demo: &mut OrbitDemo,
    frames: u64,
    frame_time: f64,
    held: &[Control],
    sink: &mut impl MatrixSink,
) -> FrameOutcome {
    let clock = ManualClock::new(0.0);
    let input = InputState::new();
    for control in held {
        input.set_key_down(demo.bindings().key_for(*control));
    }
    debug!("headless run: {frames} frame(s), step {frame_time}s, held {held:?}");

    for index in 0..frames {
        clock.set(index as f64 * frame_time);
        if demo.frame(&clock, &input, sink) == FrameOutcome::Quit {
            info!("quit key held; stopping after frame {}", index + 1);
            return FrameOutcome::Quit;
        }
    }
    FrameOutcome::Continue
}

/// One-line summary of the rig used when the demo exits.
pub fn describe_rig(rig: &CameraRig) -> String {
    let position = rig.position();
    format!(
        "Final camera: radius={:.2} height={:.2} position=({:.2}, {:.2}, {:.2})",
        rig.radius(),
        rig.height(),
        position.x,
        position.y,
        position.z
    )
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::camera::{INITIAL_HEIGHT, INITIAL_RADIUS, ORBIT_SPEED};
    use crate::input::{KeyCode, NamedKey};

    #[test]
    fn first_frame_keeps_initial_state() {
        let mut demo = OrbitDemo::default();
        let clock = ManualClock::new(3.0);
        let input = InputState::new();
        input.set_key_down(KeyCode::Named(NamedKey::Right));
        let mut sink = Vec::new();

        assert_eq!(demo.frame(&clock, &input, &mut sink), FrameOutcome::Continue);
        assert_eq!(demo.rig().radius(), INITIAL_RADIUS);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0], demo.rig().mvp());
    }

    #[test]
    fn held_keys_apply_between_frames() {
        let mut demo = OrbitDemo::default();
        let clock = ManualClock::new(0.0);
        let input = InputState::new();
        let mut sink = Vec::new();
        demo.frame(&clock, &input, &mut sink);

        input.set_key_down(KeyCode::Named(NamedKey::Up));
        clock.advance(0.5);
        demo.frame(&clock, &input, &mut sink);
        assert!((demo.rig().height() - ORBIT_SPEED * 0.5).abs() < 1e-5);
        assert_eq!(demo.frames(), 2);
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut demo = OrbitDemo::default();
        let clock = ManualClock::new(0.0);
        let input = InputState::new();
        input.set_key_down(KeyCode::Named(NamedKey::Escape));
        assert_eq!(
            demo.frame(&clock, &input, &mut Vec::new()),
            FrameOutcome::Quit
        );
    }

    #[test]
    fn headless_widen_accumulates_elapsed_time() {
        let mut demo = OrbitDemo::default();
        let mut sink = Vec::new();
        let outcome = simulate_headless(&mut demo, 10, 0.1, &[Control::Widen], &mut sink);
        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(sink.len(), 10);
        assert!((demo.rig().radius() - (INITIAL_RADIUS + ORBIT_SPEED * 0.9)).abs() < 1e-4);
        assert_eq!(demo.rig().height(), INITIAL_HEIGHT);
    }

    #[test]
    fn headless_reset_wins() {
        let mut demo = OrbitDemo::default();
        simulate_headless(
            &mut demo,
            5,
            0.2,
            &[Control::Raise, Control::Reset],
            &mut Vec::new(),
        );
        assert_eq!(demo.rig().radius(), INITIAL_RADIUS);
        assert_eq!(demo.rig().height(), INITIAL_HEIGHT);
    }

    #[test]
    fn headless_honours_rebound_keys() {
        let mut bindings = KeyBindings::default();
        bindings.apply_override("lower=S").unwrap();
        let mut demo = OrbitDemo::new(CameraRig::new(Vec3::ZERO), bindings);
        simulate_headless(&mut demo, 3, 0.5, &[Control::Lower], &mut Vec::new());
        assert!((demo.rig().height() + ORBIT_SPEED).abs() < 1e-4);
    }

    #[test]
    fn describe_rig_formats_two_decimals() {
        let rig = CameraRig::default();
        assert_eq!(
            describe_rig(&rig),
            "Final camera: radius=5.00 height=0.00 position=(5.00, 0.00, 0.00)"
        );
    }
}
