use std::collections::HashSet;

use super::math::Vector2F;

/// Keys and buttons the simulation core understands. The capture layer
/// (window event plumbing) translates its own key codes into these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Space,
    Escape,
    MouseLeft,
    MouseRight,
}

/// Double-buffered input snapshot. Raw events recorded at any time land in
/// a pending buffer; [`InputState::begin_frame`] promotes the pending
/// buffer, so `is_held` / `was_pressed` / `was_released` answers are
/// stable for the whole frame no matter when a hook asks.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    pressed: HashSet<Key>,
    released: HashSet<Key>,
    pointer_screen: Vector2F,

    pending_held: HashSet<Key>,
    pending_pressed: HashSet<Key>,
    pending_released: HashSet<Key>,
    pending_pointer: Vector2F,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key/button transition to down. Repeats while already held
    /// are ignored.
    pub fn record_down(&mut self, key: Key) {
        if self.pending_held.insert(key) {
            self.pending_pressed.insert(key);
        }
    }

    pub fn record_up(&mut self, key: Key) {
        if self.pending_held.remove(&key) {
            self.pending_released.insert(key);
        }
    }

    pub fn record_pointer(&mut self, position: Vector2F) {
        self.pending_pointer = position;
    }

    /// Promote pending events into the frame snapshot. Called once by the
    /// frame driver, before the world tick.
    pub fn begin_frame(&mut self) {
        self.held = self.pending_held.clone();
        self.pressed = std::mem::take(&mut self.pending_pressed);
        self.released = std::mem::take(&mut self.pending_released);
        self.pointer_screen = self.pending_pointer;
    }

    /// Is the key down at the current frame boundary.
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Did the key go down during the just-completed frame.
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Did the key go up during the just-completed frame.
    pub fn was_released(&self, key: Key) -> bool {
        self.released.contains(&key)
    }

    /// Pointer position in screen pixels, as of the frame boundary.
    pub fn pointer_screen(&self) -> Vector2F {
        self.pointer_screen
    }
}

#[test]
fn test_events_invisible_until_begin_frame() {
    let mut input = InputState::new();
    input.record_down(Key::Space);
    input.record_pointer(Vector2F::new(12.0, 34.0));

    assert!(!input.is_held(Key::Space));
    assert!(!input.was_pressed(Key::Space));
    assert_eq!(input.pointer_screen(), Vector2F::zero());

    input.begin_frame();
    assert!(input.is_held(Key::Space));
    assert!(input.was_pressed(Key::Space));
    assert_eq!(input.pointer_screen(), Vector2F::new(12.0, 34.0));
}

#[test]
fn test_pressed_lasts_one_frame_held_persists() {
    let mut input = InputState::new();
    input.record_down(Key::A);
    input.begin_frame();
    assert!(input.was_pressed(Key::A));

    input.begin_frame();
    assert!(!input.was_pressed(Key::A), "pressed is edge-triggered");
    assert!(input.is_held(Key::A), "held persists until key up");

    input.record_up(Key::A);
    input.begin_frame();
    assert!(!input.is_held(Key::A));
    assert!(input.was_released(Key::A));
}

#[test]
fn test_key_repeat_does_not_retrigger_press() {
    let mut input = InputState::new();
    input.record_down(Key::D);
    input.begin_frame();
    input.record_down(Key::D);
    input.begin_frame();
    assert!(!input.was_pressed(Key::D));
    assert!(input.is_held(Key::D));
}

#[test]
fn test_snapshot_stable_while_events_arrive() {
    let mut input = InputState::new();
    input.record_down(Key::Left);
    input.begin_frame();

    // Mid-frame release must not change this frame's answers.
    input.record_up(Key::Left);
    assert!(input.is_held(Key::Left));
    assert!(!input.was_released(Key::Left));

    input.begin_frame();
    assert!(!input.is_held(Key::Left));
    assert!(input.was_released(Key::Left));
}
