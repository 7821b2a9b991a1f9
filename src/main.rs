use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, error, info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use orbit_cube::{
    describe_rig, parse_backends, simulate_headless, CameraRig, Control, FrameOutcome,
    InputState, KeyBindings, KeyCode, MatrixSink, Mesh, NamedKey, OrbitDemo, Renderer,
    SystemClock,
};

const USAGE: &str = "Usage: orbit-cube [--headless] [--frames N] [--frame-time SECS] \
[--hold CONTROL[,CONTROL...]] [--bind CONTROL=KEY]... [--backend primary|gl|vulkan|metal|dx12|all]";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        println!("Controls: Up/Down raise and lower, Right/Left widen and narrow, Space resets, Escape quits.");
        return Ok(());
    }

    let demo = OrbitDemo::new(CameraRig::new(Vec3::ZERO), options.bindings.clone());
    if options.headless {
        return run_headless(demo, &options);
    }

    match run_interactive(demo.clone(), &options) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --headless mode (set DISPLAY or WAYLAND_DISPLAY to enable rendering)."
            );
            run_headless(demo, &options)
        }
        Err(err) => Err(err),
    }
}

fn run_headless(mut demo: OrbitDemo, options: &CliOptions) -> Result<()> {
    let mut last = LastMvp::default();
    simulate_headless(
        &mut demo,
        options.frames,
        options.frame_time,
        &options.hold,
        &mut last,
    );
    if let Some(mvp) = last.0 {
        debug!("final mvp: {mvp}");
    }
    println!(
        "Simulated {} frame(s) at {:.3}s per frame",
        demo.frames(),
        options.frame_time
    );
    println!("{}", describe_rig(demo.rig()));
    Ok(())
}

fn run_interactive(demo: OrbitDemo, options: &CliOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = OrbitApp {
        demo,
        backends: options.backends,
        input: InputState::new(),
        clock: SystemClock::new(),
        renderer: None,
        last_error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error.take() {
        return Err(err);
    }
    info!("rendered {} frame(s)", app.demo.frames());
    println!("{}", describe_rig(app.demo.rig()));
    Ok(())
}

/// Keeps only the most recent matrix from a headless run.
#[derive(Default)]
struct LastMvp(Option<Mat4>);

impl MatrixSink for LastMvp {
    fn submit_mvp(&mut self, mvp: Mat4) {
        self.0 = Some(mvp);
    }
}

struct OrbitApp {
    demo: OrbitDemo,
    backends: wgpu::Backends,
    input: InputState,
    clock: SystemClock,
    renderer: Option<Renderer>,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            stage,
            message: panic_message(panic),
        }
    }

    fn from_error(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl ApplicationHandler for OrbitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                renderer.window().request_redraw();
                self.renderer = Some(renderer);
            }
            Err(err) => {
                self.last_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.renderer.as_ref().map(Renderer::window_id) != Some(window_id) {
            return;
        }
        if let Err(err) = self.process_event(event_loop, event) {
            error!("{err:?}");
            self.last_error = Some(err);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

impl OrbitApp {
    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> Result<Renderer> {
        let attributes = Window::default_attributes()
            .with_title("Orbit Cube")
            .with_inner_size(LogicalSize::new(1024.0, 768.0));
        let window = event_loop
            .create_window(attributes)
            .map_err(|err| WindowInitError::from_error("window", err))?;
        let renderer = block_on(Renderer::new(
            Arc::new(window),
            &Mesh::colored_cube(),
            self.backends,
        ))
        .context("failed to initialize renderer")?;
        Ok(renderer)
    }

    fn process_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) -> Result<()> {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(&event),
            WindowEvent::RedrawRequested => self.redraw(event_loop)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.input.set_key_down(key),
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        if self.demo.frame(&self.clock, &self.input, &mut *renderer) == FrameOutcome::Quit {
            info!("quit key pressed");
            event_loop.exit();
            return Ok(());
        }
        match renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
            }
            #[allow(unreachable_patterns)]
            Err(err) => {
                warn!("failed to acquire surface texture: {err}");
            }
        }
        Ok(())
    }
}

fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Enter => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Backspace => KeyCode::Named(NamedKey::Backspace),
        Key::Home => KeyCode::Named(NamedKey::Home),
        Key::End => KeyCode::Named(NamedKey::End),
        Key::PageUp => KeyCode::Named(NamedKey::PageUp),
        Key::PageDown => KeyCode::Named(NamedKey::PageDown),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        Key::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        Key::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        Key::AltRight => KeyCode::Named(NamedKey::RightAlt),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::Digit3 => KeyCode::Digit(3),
        Key::Digit4 => KeyCode::Digit(4),
        Key::Digit5 => KeyCode::Digit(5),
        Key::Digit6 => KeyCode::Digit(6),
        Key::Digit7 => KeyCode::Digit(7),
        Key::Digit8 => KeyCode::Digit(8),
        Key::Digit9 => KeyCode::Digit(9),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyB => KeyCode::Character('B'),
        Key::KeyC => KeyCode::Character('C'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyE => KeyCode::Character('E'),
        Key::KeyF => KeyCode::Character('F'),
        Key::KeyG => KeyCode::Character('G'),
        Key::KeyH => KeyCode::Character('H'),
        Key::KeyI => KeyCode::Character('I'),
        Key::KeyJ => KeyCode::Character('J'),
        Key::KeyK => KeyCode::Character('K'),
        Key::KeyL => KeyCode::Character('L'),
        Key::KeyM => KeyCode::Character('M'),
        Key::KeyN => KeyCode::Character('N'),
        Key::KeyO => KeyCode::Character('O'),
        Key::KeyP => KeyCode::Character('P'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyT => KeyCode::Character('T'),
        Key::KeyU => KeyCode::Character('U'),
        Key::KeyV => KeyCode::Character('V'),
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyX => KeyCode::Character('X'),
        Key::KeyY => KeyCode::Character('Y'),
        Key::KeyZ => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        _ => return None,
    })
}

struct CliOptions {
    help: bool,
    headless: bool,
    frames: u64,
    frame_time: f64,
    hold: Vec<Control>,
    bindings: KeyBindings,
    backends: wgpu::Backends,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            help: false,
            headless: false,
            frames: 120,
            frame_time: 1.0 / 60.0,
            hold: Vec::new(),
            bindings: KeyBindings::default(),
            backends: wgpu::Backends::PRIMARY,
        }
    }
}

impl CliOptions {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => options.help = true,
                "--headless" => options.headless = true,
                "--frames" => {
                    let value = required_value(&mut args, "--frames")?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count `{value}`"))?;
                }
                "--frame-time" => {
                    let value = required_value(&mut args, "--frame-time")?;
                    let seconds: f64 = value
                        .parse()
                        .with_context(|| format!("invalid frame time `{value}`"))?;
                    if !seconds.is_finite() || seconds < 0.0 {
                        bail!("frame time must be a non-negative number of seconds, got {value}");
                    }
                    options.frame_time = seconds;
                }
                "--hold" => {
                    let value = required_value(&mut args, "--hold")?;
                    for name in value.split(',').filter(|name| !name.trim().is_empty()) {
                        let control = Control::from_name(name).ok_or_else(|| {
                            anyhow!(
                                "unknown control `{}`; expected raise, lower, widen, narrow or reset",
                                name.trim()
                            )
                        })?;
                        options.hold.push(control);
                    }
                }
                "--bind" => {
                    let value = required_value(&mut args, "--bind")?;
                    options.bindings.apply_override(&value)?;
                }
                "--backend" => {
                    let value = required_value(&mut args, "--backend")?;
                    options.backends = parse_backends(&value)
                        .ok_or_else(|| anyhow!("unknown backend `{value}`"))?;
                }
                other => {
                    bail!("Unknown argument: {other}. {USAGE}");
                }
            }
        }
        Ok(options)
    }
}

fn required_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}
