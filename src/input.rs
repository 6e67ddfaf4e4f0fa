// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

//! Control-event model and desktop input injection.
//!
//! Inbound data-channel frames are parsed into typed control events and
//! replayed through an [`InputSink`]. Anything malformed - unknown
//! type/subtype tags, wrong field types, unknown key names - is dropped
//! without side effects. Injection failures are logged and dropped as
//! well; a bad event must never take the host down.

use serde::Deserialize;

/// Host screen dimensions used to scale normalized mouse coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenSize {
    /// Scale normalized coordinates into absolute pixel coordinates.
    ///
    /// Inputs are clamped to [0, 1] before scaling and the result is
    /// clamped to the addressable range, so out-of-range coordinates land
    /// on the nearest screen edge.
    pub fn scale(&self, x_norm: f64, y_norm: f64) -> (i32, i32) {
        let x = (x_norm.clamp(0.0, 1.0) * self.width as f64).round() as i32;
        let y = (y_norm.clamp(0.0, 1.0) * self.height as f64).round() as i32;
        (
            x.clamp(0, self.width as i32 - 1),
            y.clamp(0, self.height as i32 - 1),
        )
    }
}

/// One control event received from the relay.
///
/// The wire form tags events with `type` and `subtype` string fields;
/// they deserialize directly into this tagged union.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlEvent {
    /// Pointer movement, button, or wheel event
    Mouse(MouseEvent),
    /// Key press or release event
    Keyboard(KeyboardEvent),
}

/// Pointer events, tagged by `subtype` on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "subtype", rename_all = "lowercase")]
pub enum MouseEvent {
    /// Absolute move with coordinates normalized to [0, 1]
    #[serde(rename = "mousemove")]
    Move {
        /// Horizontal position as a fraction of screen width
        x_norm: f64,
        /// Vertical position as a fraction of screen height
        y_norm: f64,
    },
    /// Button press or release
    #[serde(rename = "mousebutton")]
    Button {
        /// Which button changed state
        button: MouseButton,
        /// Press or release
        action: ButtonAction,
    },
    /// Vertical wheel scroll
    Wheel {
        /// Scroll amount in wheel notches
        delta: f64,
    },
}

/// Keyboard events, tagged by `subtype` on the wire.
///
/// Subtypes other than `keydown` and `keyup` fail to parse and the event
/// is dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "subtype", rename_all = "lowercase")]
pub enum KeyboardEvent {
    /// Key pressed
    #[serde(rename = "keydown")]
    KeyDown {
        /// Wire name of the key
        key: String,
    },
    /// Key released
    #[serde(rename = "keyup")]
    KeyUp {
        /// Wire name of the key
        key: String,
    },
}

/// Mouse buttons addressable over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

/// Button state change direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// Press
    Down,
    /// Release
    Up,
}

/// A key that can be injected on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A literal character key
    Char(char),
    /// Return/enter
    Enter,
    /// Space bar
    Space,
    /// Tab
    Tab,
    /// Backspace
    Backspace,
    /// Escape
    Escape,
    /// Shift modifier
    Shift,
    /// Control modifier
    Control,
    /// Alt modifier
    Alt,
    /// Caps lock
    CapsLock,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Delete
    Delete,
    /// Home
    Home,
    /// End
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Function key F1-F12
    F(u8),
}

/// Map a wire key name onto an injectable key.
///
/// Single characters inject as literal keys; everything else goes through
/// the named-key table. Unknown names yield `None` and the event is
/// dropped by the caller.
pub fn map_key(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Char(c));
    }

    match name.to_ascii_lowercase().as_str() {
        "enter" => Some(Key::Enter),
        "space" => Some(Key::Space),
        "tab" => Some(Key::Tab),
        "backspace" => Some(Key::Backspace),
        "esc" | "escape" => Some(Key::Escape),
        "shift" => Some(Key::Shift),
        "ctrl" => Some(Key::Control),
        "alt" => Some(Key::Alt),
        "capslock" => Some(Key::CapsLock),
        "up" => Some(Key::Up),
        "down" => Some(Key::Down),
        "left" => Some(Key::Left),
        "right" => Some(Key::Right),
        "delete" => Some(Key::Delete),
        "home" => Some(Key::Home),
        "end" => Some(Key::End),
        "pageup" => Some(Key::PageUp),
        "pagedown" => Some(Key::PageDown),
        name => match name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=12).contains(&n) => Some(Key::F(n)),
            _ => None,
        },
    }
}

/// Parse one inbound frame, returning `None` for anything malformed.
pub fn parse_event(raw: &str) -> Option<ControlEvent> {
    serde_json::from_str(raw).ok()
}

/// Abstraction over the OS input-injection backend.
///
/// The production implementation is [`Injector`]; tests substitute a
/// recording sink.
pub trait InputSink {
    /// Move the pointer to absolute pixel coordinates.
    fn mouse_move(&mut self, x: i32, y: i32);
    /// Press or release a mouse button.
    fn mouse_button(&mut self, button: MouseButton, action: ButtonAction);
    /// Scroll the vertical wheel by `delta` notches.
    fn wheel(&mut self, delta: i32);
    /// Press or release a key.
    fn key(&mut self, key: Key, down: bool);
}

/// Replays parsed control events onto an [`InputSink`].
pub struct Replayer<S> {
    screen: ScreenSize,
    sink: S,
}

impl<S: InputSink> Replayer<S> {
    /// Build a replayer for the given screen geometry and sink.
    pub fn new(screen: ScreenSize, sink: S) -> Replayer<S> {
        Replayer { screen, sink }
    }

    /// Apply one event to the sink.
    ///
    /// Events that survive parsing but fail validation here (unknown key
    /// names) are dropped.
    pub fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Mouse(MouseEvent::Move { x_norm, y_norm }) => {
                let (x, y) = self.screen.scale(x_norm, y_norm);
                self.sink.mouse_move(x, y);
            }
            ControlEvent::Mouse(MouseEvent::Button { button, action }) => {
                self.sink.mouse_button(button, action);
            }
            ControlEvent::Mouse(MouseEvent::Wheel { delta }) => {
                self.sink.wheel(delta as i32);
            }
            ControlEvent::Keyboard(KeyboardEvent::KeyDown { key }) => {
                if let Some(key) = map_key(&key) {
                    self.sink.key(key, true);
                }
            }
            ControlEvent::Keyboard(KeyboardEvent::KeyUp { key }) => {
                if let Some(key) = map_key(&key) {
                    self.sink.key(key, false);
                }
            }
        }
    }
}

#[cfg(feature = "input")]
mod injector {
    use super::{ButtonAction, InputSink, Key, MouseButton, ScreenSize};
    use enigo::{
        Axis, Button, Coordinate, Direction, Enigo, Keyboard as _, Mouse as _, Settings,
    };
    use log::error;

    /// [`InputSink`] backed by the OS input-injection library.
    pub struct Injector {
        enigo: Enigo,
    }

    impl Injector {
        /// Open a connection to the OS injection backend.
        pub fn new() -> Result<Injector, enigo::NewConError> {
            Ok(Injector {
                enigo: Enigo::new(&Settings::default())?,
            })
        }

        /// Dimensions of the primary display.
        pub fn screen_size(&self) -> Result<ScreenSize, enigo::InputError> {
            let (width, height) = self.enigo.main_display()?;
            Ok(ScreenSize {
                width: width as u32,
                height: height as u32,
            })
        }
    }

    impl InputSink for Injector {
        fn mouse_move(&mut self, x: i32, y: i32) {
            if let Err(err) = self.enigo.move_mouse(x, y, Coordinate::Abs) {
                error!("mouse move injection failed: {}", err);
            }
        }

        fn mouse_button(&mut self, button: MouseButton, action: ButtonAction) {
            let button = match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
                MouseButton::Middle => Button::Middle,
            };
            let direction = match action {
                ButtonAction::Down => Direction::Press,
                ButtonAction::Up => Direction::Release,
            };
            if let Err(err) = self.enigo.button(button, direction) {
                error!("mouse button injection failed: {}", err);
            }
        }

        fn wheel(&mut self, delta: i32) {
            if let Err(err) = self.enigo.scroll(delta, Axis::Vertical) {
                error!("mouse wheel injection failed: {}", err);
            }
        }

        fn key(&mut self, key: Key, down: bool) {
            let direction = if down {
                Direction::Press
            } else {
                Direction::Release
            };
            if let Err(err) = self.enigo.key(translate(key), direction) {
                error!("keyboard injection failed: {}", err);
            }
        }
    }

    fn translate(key: Key) -> enigo::Key {
        match key {
            Key::Char(c) => enigo::Key::Unicode(c),
            Key::Enter => enigo::Key::Return,
            Key::Space => enigo::Key::Space,
            Key::Tab => enigo::Key::Tab,
            Key::Backspace => enigo::Key::Backspace,
            Key::Escape => enigo::Key::Escape,
            Key::Shift => enigo::Key::Shift,
            Key::Control => enigo::Key::Control,
            Key::Alt => enigo::Key::Alt,
            Key::CapsLock => enigo::Key::CapsLock,
            Key::Up => enigo::Key::UpArrow,
            Key::Down => enigo::Key::DownArrow,
            Key::Left => enigo::Key::LeftArrow,
            Key::Right => enigo::Key::RightArrow,
            Key::Delete => enigo::Key::Delete,
            Key::Home => enigo::Key::Home,
            Key::End => enigo::Key::End,
            Key::PageUp => enigo::Key::PageUp,
            Key::PageDown => enigo::Key::PageDown,
            Key::F(1) => enigo::Key::F1,
            Key::F(2) => enigo::Key::F2,
            Key::F(3) => enigo::Key::F3,
            Key::F(4) => enigo::Key::F4,
            Key::F(5) => enigo::Key::F5,
            Key::F(6) => enigo::Key::F6,
            Key::F(7) => enigo::Key::F7,
            Key::F(8) => enigo::Key::F8,
            Key::F(9) => enigo::Key::F9,
            Key::F(10) => enigo::Key::F10,
            Key::F(11) => enigo::Key::F11,
            Key::F(_) => enigo::Key::F12,
        }
    }
}

#[cfg(feature = "input")]
pub use injector::Injector;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Action {
        Move(i32, i32),
        Button(MouseButton, ButtonAction),
        Wheel(i32),
        Key(Key, bool),
    }

    #[derive(Default)]
    struct RecordingSink {
        actions: Vec<Action>,
    }

    impl InputSink for RecordingSink {
        fn mouse_move(&mut self, x: i32, y: i32) {
            self.actions.push(Action::Move(x, y));
        }

        fn mouse_button(&mut self, button: MouseButton, action: ButtonAction) {
            self.actions.push(Action::Button(button, action));
        }

        fn wheel(&mut self, delta: i32) {
            self.actions.push(Action::Wheel(delta));
        }

        fn key(&mut self, key: Key, down: bool) {
            self.actions.push(Action::Key(key, down));
        }
    }

    fn replayer() -> Replayer<RecordingSink> {
        Replayer::new(
            ScreenSize {
                width: 1920,
                height: 1080,
            },
            RecordingSink::default(),
        )
    }

    #[test]
    fn mousemove_clamps_before_scaling() {
        let mut replayer = replayer();
        let event =
            parse_event(r#"{"type":"mouse","subtype":"mousemove","x_norm":1.5,"y_norm":0.5}"#)
                .unwrap();
        replayer.apply(event);
        // x_norm clamps to 1.0, scales to 1920, then clamps to width-1.
        assert_eq!(replayer.sink.actions, vec![Action::Move(1919, 540)]);
    }

    #[test]
    fn mousemove_negative_lands_on_origin() {
        let mut replayer = replayer();
        let event =
            parse_event(r#"{"type":"mouse","subtype":"mousemove","x_norm":-0.2,"y_norm":-3.0}"#)
                .unwrap();
        replayer.apply(event);
        assert_eq!(replayer.sink.actions, vec![Action::Move(0, 0)]);
    }

    #[test]
    fn mousemove_in_range_scales() {
        let mut replayer = replayer();
        let event =
            parse_event(r#"{"type":"mouse","subtype":"mousemove","x_norm":0.25,"y_norm":0.5}"#)
                .unwrap();
        replayer.apply(event);
        assert_eq!(replayer.sink.actions, vec![Action::Move(480, 540)]);
    }

    #[test]
    fn mousemove_with_wrong_field_type_dropped() {
        assert_eq!(
            parse_event(r#"{"type":"mouse","subtype":"mousemove","x_norm":"half","y_norm":0.5}"#),
            None
        );
    }

    #[test]
    fn mouse_button_press_and_release() {
        let mut replayer = replayer();
        for raw in [
            r#"{"type":"mouse","subtype":"mousebutton","button":"left","action":"down"}"#,
            r#"{"type":"mouse","subtype":"mousebutton","button":"left","action":"up"}"#,
        ] {
            replayer.apply(parse_event(raw).unwrap());
        }
        assert_eq!(
            replayer.sink.actions,
            vec![
                Action::Button(MouseButton::Left, ButtonAction::Down),
                Action::Button(MouseButton::Left, ButtonAction::Up),
            ]
        );
    }

    #[test]
    fn unknown_mouse_button_dropped() {
        assert_eq!(
            parse_event(r#"{"type":"mouse","subtype":"mousebutton","button":"x1","action":"down"}"#),
            None
        );
    }

    #[test]
    fn wheel_scrolls_by_delta() {
        let mut replayer = replayer();
        let event = parse_event(r#"{"type":"mouse","subtype":"wheel","delta":-3}"#).unwrap();
        replayer.apply(event);
        assert_eq!(replayer.sink.actions, vec![Action::Wheel(-3)]);
    }

    #[test]
    fn keydown_named_key() {
        let mut replayer = replayer();
        let event = parse_event(r#"{"type":"keyboard","subtype":"keydown","key":"enter"}"#).unwrap();
        replayer.apply(event);
        assert_eq!(replayer.sink.actions, vec![Action::Key(Key::Enter, true)]);
    }

    #[test]
    fn keyup_single_character() {
        let mut replayer = replayer();
        let event = parse_event(r#"{"type":"keyboard","subtype":"keyup","key":"a"}"#).unwrap();
        replayer.apply(event);
        assert_eq!(
            replayer.sink.actions,
            vec![Action::Key(Key::Char('a'), false)]
        );
    }

    #[test]
    fn unknown_keyboard_subtype_ignored() {
        // Subtypes outside keydown/keyup must produce no injected action.
        assert_eq!(
            parse_event(r#"{"type":"keyboard","subtype":"keypress","key":"a"}"#),
            None
        );
    }

    #[test]
    fn unknown_key_name_produces_no_action() {
        let mut replayer = replayer();
        let event =
            parse_event(r#"{"type":"keyboard","subtype":"keydown","key":"hyperdrive"}"#).unwrap();
        replayer.apply(event);
        assert!(replayer.sink.actions.is_empty());
    }

    #[test]
    fn unknown_event_type_dropped() {
        assert_eq!(parse_event(r#"{"type":"gamepad","subtype":"button"}"#), None);
        assert_eq!(parse_event("not even json"), None);
    }

    #[test]
    fn key_name_table() {
        assert_eq!(map_key("esc"), Some(Key::Escape));
        assert_eq!(map_key("escape"), Some(Key::Escape));
        assert_eq!(map_key("PageUp"), Some(Key::PageUp));
        assert_eq!(map_key("f1"), Some(Key::F(1)));
        assert_eq!(map_key("f12"), Some(Key::F(12)));
        assert_eq!(map_key("f13"), None);
        assert_eq!(map_key("Z"), Some(Key::Char('Z')));
        assert_eq!(map_key(""), None);
    }
}
