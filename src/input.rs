use std::collections::HashSet;

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::camera::{Control, Controls};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "LeftShift" | "LShift" => LeftShift,
        "RightShift" | "RShift" => RightShift,
        "LeftCtrl" | "LControl" => LeftCtrl,
        "RightCtrl" | "RControl" => RightCtrl,
        "LeftAlt" | "LAlt" => LeftAlt,
        "RightAlt" | "RAlt" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-printable keys the demo can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Anything that can answer whether a key is currently held.
pub trait KeySource {
    fn is_key_down(&self, key: KeyCode) -> bool;
}

/// Set of currently pressed keys, fed by window events.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn clear(&self) {
        self.keys.write().clear();
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn is_key_down_by_name(&self, name: &str) -> bool {
        KeyCode::from_name(name).is_some_and(|key| self.is_key_down(key))
    }
}

impl KeySource for InputState {
    fn is_key_down(&self, key: KeyCode) -> bool {
        InputState::is_key_down(self, key)
    }
}

/// Mapping from keys to camera controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub raise: KeyCode,
    pub lower: KeyCode,
    pub widen: KeyCode,
    pub narrow: KeyCode,
    pub reset: KeyCode,
    pub quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            raise: KeyCode::Named(NamedKey::Up),
            lower: KeyCode::Named(NamedKey::Down),
            widen: KeyCode::Named(NamedKey::Right),
            narrow: KeyCode::Named(NamedKey::Left),
            reset: KeyCode::Named(NamedKey::Space),
            quit: KeyCode::Named(NamedKey::Escape),
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, control: Control) -> KeyCode {
        match control {
            Control::Raise => self.raise,
            Control::Lower => self.lower,
            Control::Widen => self.widen,
            Control::Narrow => self.narrow,
            Control::Reset => self.reset,
        }
    }

    pub fn bind(&mut self, control: Control, key: KeyCode) {
        debug!("binding {} to {key:?}", control.name());
        let slot = match control {
            Control::Raise => &mut self.raise,
            Control::Lower => &mut self.lower,
            Control::Widen => &mut self.widen,
            Control::Narrow => &mut self.narrow,
            Control::Reset => &mut self.reset,
        };
        *slot = key;
    }

    /// Applies a `control=Key` override such as `raise=W` or `quit=Q`.
    pub fn apply_override(&mut self, binding: &str) -> Result<(), BindingError> {
        let (control, key) = binding
            .split_once('=')
            .ok_or_else(|| BindingError::Malformed(binding.to_string()))?;
        let key = KeyCode::from_name(key.trim())
            .ok_or_else(|| BindingError::UnknownKey(key.trim().to_string()))?;
        if control.trim().eq_ignore_ascii_case("quit") {
            debug!("binding quit to {key:?}");
            self.quit = key;
            return Ok(());
        }
        let control = Control::from_name(control)
            .ok_or_else(|| BindingError::UnknownControl(control.trim().to_string()))?;
        self.bind(control, key);
        Ok(())
    }

    /// Samples the held state of every control from `keys`.
    pub fn controls(&self, keys: &impl KeySource) -> Controls {
        Control::ALL
            .into_iter()
            .filter(|control| keys.is_key_down(self.key_for(*control)))
            .collect()
    }

    pub fn wants_quit(&self, keys: &impl KeySource) -> bool {
        keys.is_key_down(self.quit)
    }
}

/// Reasons a key binding override can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("binding `{0}` must look like control=Key")]
    Malformed(String),
    #[error("unknown control `{0}`; expected raise, lower, widen, narrow, reset or quit")]
    UnknownControl(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            KeyCode::from_name("Space"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("a"), Some(KeyCode::Character('A')));
        assert_eq!(KeyCode::from_name("7"), Some(KeyCode::Digit(7)));
        assert_eq!(KeyCode::from_name("F12"), Some(KeyCode::Function(12)));
        assert_eq!(KeyCode::from_name("F99"), None);
        assert_eq!(KeyCode::from_name("Banana"), None);
    }

    #[test]
    fn input_state_tracks_keys() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        assert!(state.is_key_down_by_name("Space"));
        state.set_key_up(KeyCode::Named(NamedKey::Space));
        assert!(!state.is_key_down_by_name("Space"));
    }

    #[test]
    fn clear_releases_everything() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Up));
        state.set_key_down(KeyCode::Character('W'));
        state.clear();
        assert!(!state.is_key_down_by_name("Up"));
        assert!(!state.is_key_down_by_name("w"));
    }

    #[test]
    fn default_bindings_use_arrows_and_space() {
        let bindings = KeyBindings::default();
        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Up));
        state.set_key_down(KeyCode::Named(NamedKey::Left));

        let controls = bindings.controls(&state);
        assert!(controls.raise);
        assert!(controls.narrow);
        assert!(!controls.lower && !controls.widen && !controls.reset);
        assert!(!bindings.wants_quit(&state));

        state.set_key_down(KeyCode::Named(NamedKey::Escape));
        assert!(bindings.wants_quit(&state));
    }

    #[test]
    fn overrides_rebind_controls() {
        let mut bindings = KeyBindings::default();
        bindings.apply_override("raise=W").unwrap();
        bindings.apply_override("quit = q").unwrap();
        assert_eq!(bindings.key_for(Control::Raise), KeyCode::Character('W'));
        assert_eq!(bindings.quit, KeyCode::Character('Q'));

        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Up));
        assert!(!bindings.controls(&state).raise);
        state.set_key_down(KeyCode::Character('W'));
        assert!(bindings.controls(&state).raise);
    }

    #[test]
    fn bad_overrides_are_rejected() {
        let mut bindings = KeyBindings::default();
        assert_eq!(
            bindings.apply_override("raise"),
            Err(BindingError::Malformed("raise".to_string()))
        );
        assert_eq!(
            bindings.apply_override("spin=W"),
            Err(BindingError::UnknownControl("spin".to_string()))
        );
        assert_eq!(
            bindings.apply_override("raise=Banana"),
            Err(BindingError::UnknownKey("Banana".to_string()))
        );
        assert_eq!(bindings, KeyBindings::default());
    }
}
