//! Normalized input: the boundary between physical devices and the forge.
//!
//! ## Flow
//!
//! 1. A device layer writes [`InputEvent`] messages.  In the game that is
//!    [`device_input_system`] (keyboard + mouse, added by
//!    [`DeviceInputPlugin`]); headless tests write the messages directly.
//! 2. [`apply_input_events_system`] folds the frame's events into the
//!    [`InputState`] resource: held keys/buttons plus this frame's edges and
//!    accumulated pointer motion.
//! 3. Simulation systems read only [`InputState`].
//! 4. [`end_input_frame_system`] clears the per-frame edges and pointer delta.
//!
//! The simulation never reads raw device APIs, so the whole pipeline can be
//! driven by scripted events.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use std::collections::HashSet;

/// A pointer button, already mapped to its hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Right hand grab/release.
    Primary,
    /// Left hand grab/release.
    Secondary,
}

/// Logical keys the forge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    /// While held, pointer motion drives the left hand instead of the right.
    LeftHandModifier,
    /// Load the billet into / take it out of the forge.
    Interact,
    Quench,
    /// Choose the next weapon type for the current billet.
    CycleWeapon,
    ResetBillet,
    /// Offer a weapon to the customer in the given slot (0-based).
    Sell(u8),
    BuyUpgrade,
    Save,
}

/// One normalized input event.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { dx: f32, dy: f32 },
    ButtonDown(PointerButton),
    ButtonUp(PointerButton),
    KeyDown(InputKey),
    KeyUp(InputKey),
}

/// Aggregated input for the current frame.
#[derive(Resource, Debug, Default, Clone)]
pub struct InputState {
    held_keys: HashSet<InputKey>,
    pressed_keys: HashSet<InputKey>,
    held_buttons: HashSet<PointerButton>,
    pressed_buttons: HashSet<PointerButton>,
    released_buttons: HashSet<PointerButton>,
    /// Pointer motion accumulated this frame.
    pub pointer_delta: Vec2,
}

impl InputState {
    /// Fold one event into the state.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { dx, dy } => {
                self.pointer_delta += Vec2::new(dx, dy);
            }
            InputEvent::ButtonDown(button) => {
                if self.held_buttons.insert(button) {
                    self.pressed_buttons.insert(button);
                }
            }
            InputEvent::ButtonUp(button) => {
                if self.held_buttons.remove(&button) {
                    self.released_buttons.insert(button);
                }
            }
            InputEvent::KeyDown(key) => {
                if self.held_keys.insert(key) {
                    self.pressed_keys.insert(key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.held_keys.remove(&key);
            }
        }
    }

    pub fn key_held(&self, key: InputKey) -> bool {
        self.held_keys.contains(&key)
    }

    pub fn key_just_pressed(&self, key: InputKey) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn button_just_pressed(&self, button: PointerButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn button_just_released(&self, button: PointerButton) -> bool {
        self.released_buttons.contains(&button)
    }

    /// Keys pressed this frame, in no particular order.
    pub fn just_pressed_keys(&self) -> impl Iterator<Item = &InputKey> {
        self.pressed_keys.iter()
    }

    /// Clear per-frame edges; held state carries over.
    pub fn end_frame(&mut self) {
        self.pressed_keys.clear();
        self.pressed_buttons.clear();
        self.released_buttons.clear();
        self.pointer_delta = Vec2::ZERO;
    }
}

/// First system of the forge chain: fold this frame's [`InputEvent`]s.
pub fn apply_input_events_system(
    mut events: MessageReader<InputEvent>,
    mut state: ResMut<InputState>,
) {
    for event in events.read() {
        state.apply(*event);
    }
}

/// Last system of the forge chain.
pub fn end_input_frame_system(mut state: ResMut<InputState>) {
    state.end_frame();
}

// ── Device mapping ────────────────────────────────────────────────────────────

/// Keyboard layout.
const KEY_BINDINGS: [(KeyCode, InputKey); 14] = [
    (KeyCode::KeyW, InputKey::Forward),
    (KeyCode::KeyS, InputKey::Back),
    (KeyCode::KeyA, InputKey::StrafeLeft),
    (KeyCode::KeyD, InputKey::StrafeRight),
    (KeyCode::ShiftLeft, InputKey::LeftHandModifier),
    (KeyCode::KeyE, InputKey::Interact),
    (KeyCode::KeyQ, InputKey::Quench),
    (KeyCode::Tab, InputKey::CycleWeapon),
    (KeyCode::KeyR, InputKey::ResetBillet),
    (KeyCode::Digit1, InputKey::Sell(0)),
    (KeyCode::Digit2, InputKey::Sell(1)),
    (KeyCode::Digit3, InputKey::Sell(2)),
    (KeyCode::KeyB, InputKey::BuyUpgrade),
    (KeyCode::F5, InputKey::Save),
];

const BUTTON_BINDINGS: [(MouseButton, PointerButton); 2] = [
    (MouseButton::Left, PointerButton::Primary),
    (MouseButton::Right, PointerButton::Secondary),
];

/// Translate Bevy keyboard/mouse state into [`InputEvent`] messages.
pub fn device_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    mut writer: MessageWriter<InputEvent>,
) {
    for (code, key) in KEY_BINDINGS {
        if keys.just_pressed(code) {
            writer.write(InputEvent::KeyDown(key));
        }
        if keys.just_released(code) {
            writer.write(InputEvent::KeyUp(key));
        }
    }
    for (mouse, button) in BUTTON_BINDINGS {
        if buttons.just_pressed(mouse) {
            writer.write(InputEvent::ButtonDown(button));
        }
        if buttons.just_released(mouse) {
            writer.write(InputEvent::ButtonUp(button));
        }
    }
    if motion.delta != Vec2::ZERO {
        writer.write(InputEvent::PointerMove {
            dx: motion.delta.x,
            dy: motion.delta.y,
        });
    }
}

/// Maps keyboard and mouse onto [`InputEvent`]s.  Requires Bevy's input plugin.
pub struct DeviceInputPlugin;

impl Plugin for DeviceInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            device_input_system.before(apply_input_events_system),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edge_lasts_one_frame() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown(InputKey::Interact));
        assert!(state.key_just_pressed(InputKey::Interact));
        assert!(state.key_held(InputKey::Interact));

        state.end_frame();
        assert!(!state.key_just_pressed(InputKey::Interact));
        assert!(state.key_held(InputKey::Interact));
    }

    #[test]
    fn repeated_key_down_does_not_retrigger() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown(InputKey::Quench));
        state.end_frame();
        state.apply(InputEvent::KeyDown(InputKey::Quench));
        assert!(!state.key_just_pressed(InputKey::Quench));
    }

    #[test]
    fn tap_within_one_frame_still_registers() {
        let mut state = InputState::default();
        state.apply(InputEvent::ButtonDown(PointerButton::Primary));
        state.apply(InputEvent::ButtonUp(PointerButton::Primary));
        assert!(state.button_just_pressed(PointerButton::Primary));
        assert!(state.button_just_released(PointerButton::Primary));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = InputState::default();
        state.apply(InputEvent::ButtonUp(PointerButton::Secondary));
        assert!(!state.button_just_released(PointerButton::Secondary));
    }

    #[test]
    fn pointer_motion_accumulates_until_frame_end() {
        let mut state = InputState::default();
        state.apply(InputEvent::PointerMove { dx: 2.0, dy: -1.0 });
        state.apply(InputEvent::PointerMove { dx: 1.0, dy: 3.0 });
        assert_eq!(state.pointer_delta, Vec2::new(3.0, 2.0));
        state.end_frame();
        assert_eq!(state.pointer_delta, Vec2::ZERO);
    }
}
