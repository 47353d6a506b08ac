/// WEIRD Project
/// `File` viewer/input.rs
/// `Description` Input impementation module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use std::collections::BTreeMap;

use weird_map::math::Vec2;

/// Single key state
#[derive(Copy, Clone, Default, PartialEq, Eq)]
struct KeyState {
    /// Is key pressed
    pub pressed: bool,
    /// Is key state changed during previous frame
    pub changed: bool,
} // struct KeyState

/// Keycode representation structure
pub type KeyCode = winit::keyboard::KeyCode;

/// Input state representation structure
pub struct State {
    keys: BTreeMap<KeyCode, KeyState>,
    mouse_location: Vec2,
    mouse_motion: Vec2,
} // struct State

impl State {
    /// Key state getting function
    /// * `key` - keycode to get state of
    /// * Returns key state
    fn get_key_state(&self, key: KeyCode) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    } // fn get_key_state

    /// Is key pressed checking function
    /// * `key` - key to check state of
    /// * Returns true if key is pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.get_key_state(key).pressed
    } // fn is_key_pressed

    /// Is key clicked checking function
    /// * `key` - key to check state of
    /// * Returns true if key's clicked
    pub fn is_key_clicked(&self, key: KeyCode) -> bool {
        let state = self.get_key_state(key);
        state.pressed && state.changed
    } // fn is_key_clicked

    /// Signed axis from key pair
    /// * `positive`, `negative` - keys
    /// * Returns -1, 0 or 1
    pub fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        self.is_key_pressed(positive) as i32 as f32 - self.is_key_pressed(negative) as i32 as f32
    } // fn axis

    /// Mouse delta getting function
    /// * Returns mouse motion
    pub fn get_mouse_motion(&self) -> Vec2 {
        self.mouse_motion
    } // fn get_mouse_motion
} // impl State

// Input getting function
pub struct Input {
    state: State,
} // struct Input

impl Input {
    /// New input construction function
    /// * Returns newly-created input
    pub fn new() -> Self {
        Self {
            state: State {
                keys: BTreeMap::new(),
                mouse_location: Vec2::ZERO,
                mouse_motion: Vec2::ZERO,
            },
        }
    } // fn new

    /// Key state change callback
    /// * `key` - keycode
    /// * `is_pressed` - changed key state
    pub fn on_key_state_change(&mut self, key: KeyCode, is_pressed: bool) {
        let state = self.state.keys.entry(key).or_default();

        state.changed = state.pressed != is_pressed;
        state.pressed = is_pressed;
    } // fn on_key_state_change

    /// Mouse motion callback
    /// * `new_position` - new mouse position
    pub fn on_mouse_move(&mut self, new_position: Vec2) {
        self.state.mouse_motion += new_position - self.state.mouse_location;
        self.state.mouse_location = new_position;
    } // fn on_mouse_move

    // Changed parameters clearing function
    pub fn clear_changed(&mut self) {
        for state in self.state.keys.values_mut() {
            state.changed = false;
        }
        self.state.mouse_motion = Vec2::ZERO;
    } // fn clear_changed

    /// State getting function
    /// * Returns input state reference
    pub fn get_state(&self) -> &State {
        &self.state
    } // fn get_state
} // impl Input

// file viewer/input.rs
