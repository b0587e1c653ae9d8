use std::collections::HashMap;

use winit::event::{ElementState, VirtualKeyCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Down,
    Released,
    Up,
}

impl Default for ButtonState {
    fn default() -> Self {
        ButtonState::Up
    }
}

impl ButtonState {
    fn transition(&self, key_down: bool) -> ButtonState {
        if key_down {
            match self {
                ButtonState::Pressed => ButtonState::Down,
                ButtonState::Down => ButtonState::Down,
                ButtonState::Released => ButtonState::Pressed,
                ButtonState::Up => ButtonState::Pressed,
            }
        } else {
            match self {
                ButtonState::Pressed => ButtonState::Released,
                ButtonState::Down => ButtonState::Released,
                ButtonState::Released => ButtonState::Up,
                ButtonState::Up => ButtonState::Up,
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Down)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// The logical buttons the body responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Jump,
    Down,
}

/// Snapshot of which logical buttons are held this tick. Sampled once per tick,
/// before the body's input phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Buttons {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub down: bool,
}

impl Buttons {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(&mut self, button: Button, held: bool) {
        match button {
            Button::Left => self.left = held,
            Button::Right => self.right = held,
            Button::Jump => self.jump = held,
            Button::Down => self.down = held,
        }
    }
}

/// Default keyboard layout: arrows or WASD to move, Space/W/Up to jump, Down/S to fast-fall.
pub fn button_for_key(key: VirtualKeyCode) -> Option<Button> {
    match key {
        VirtualKeyCode::Left | VirtualKeyCode::A => Some(Button::Left),
        VirtualKeyCode::Right | VirtualKeyCode::D => Some(Button::Right),
        VirtualKeyCode::Space | VirtualKeyCode::W | VirtualKeyCode::Up => Some(Button::Jump),
        VirtualKeyCode::Down | VirtualKeyCode::S => Some(Button::Down),
        _ => None,
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Default, Debug)]
pub struct InputState {
    buttons: HashMap<VirtualKeyCode, ButtonState>,
}

impl InputState {
    pub fn for_keys(keys: &[VirtualKeyCode]) -> Self {
        let mut buttons = HashMap::new();
        for key in keys {
            buttons.insert(*key, ButtonState::default());
        }

        Self { buttons }
    }

    /// Tracks every key the default layout maps to a logical button
    pub fn with_default_layout() -> Self {
        Self::for_keys(&[
            VirtualKeyCode::Left,
            VirtualKeyCode::A,
            VirtualKeyCode::Right,
            VirtualKeyCode::D,
            VirtualKeyCode::Space,
            VirtualKeyCode::W,
            VirtualKeyCode::Up,
            VirtualKeyCode::Down,
            VirtualKeyCode::S,
        ])
    }

    pub fn get_button_state(&self, key: VirtualKeyCode) -> Option<&ButtonState> {
        self.buttons.get(&key)
    }

    pub fn process_keyboard(&mut self, key: VirtualKeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        if let Some(button_state) = self.buttons.get(&key) {
            let new_state = button_state.transition(pressed);
            self.buttons.insert(key, new_state);
            true
        } else {
            false
        }
    }

    /// Advances Pressed -> Down and Released -> Up; call once per tick after sampling.
    pub fn update(&mut self) {
        let previous_button_state = std::mem::take(&mut self.buttons);
        for (key, button_state) in previous_button_state {
            self.buttons
                .insert(key, button_state.transition(button_state.is_active()));
        }
    }

    /// A logical button is held if any key mapped to it is active
    pub fn snapshot(&self) -> Buttons {
        let mut buttons = Buttons::none();
        for (key, state) in &self.buttons {
            if let Some(button) = button_for_key(*key) {
                if state.is_active() {
                    buttons.set(button, true);
                }
            }
        }
        buttons
    }
}
