//! Per-frame input snapshot
//!
//! The host polls its event loop, fills one of these per frame, and hands
//! it to [`crate::Editor::update_frame`]. The core never registers
//! callbacks, so it stays independent of any windowing library.

/// Pointer buttons the viewport cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary = 0,
    Secondary = 1,
    Middle = 2,
}

/// Semantic keys consumed by the viewport, already mapped from whatever
/// physical bindings the host uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKey {
    /// Enter translate mode (G).
    Grab,
    /// Enter rotate mode (R).
    Rotate,
    /// Enter scale mode (S).
    Scale,
    AxisX,
    AxisY,
    AxisZ,
    /// Flip world/local gizmo space (L).
    SpaceToggle,
    /// Clear selection (D).
    Deselect,
    /// Confirm the active modal transform (Enter).
    Confirm,
    /// Cancel the active modal transform (Escape).
    Cancel,
}

/// Everything the viewport core reads from the outside world in one frame.
///
/// Button edges (`pressed`/`released`) are this-frame events; `down` is the
/// held state. `ui_wants_*` mirror the host UI's capture flags so the same
/// click is never interpreted by both a panel and the viewport.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub pointer: (f32, f32),
    pub pointer_delta: (f32, f32),
    buttons_down: [bool; 3],
    buttons_pressed: [bool; 3],
    buttons_released: [bool; 3],
    pub scroll_delta: f32,
    keys_pressed: Vec<EditorKey>,
    pub shift_down: bool,
    pub ui_wants_pointer: bool,
    pub ui_wants_keyboard: bool,
    pub dt: f32,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self, button: PointerButton) -> bool {
        self.buttons_down[button as usize]
    }

    pub fn pressed(&self, button: PointerButton) -> bool {
        self.buttons_pressed[button as usize]
    }

    pub fn released(&self, button: PointerButton) -> bool {
        self.buttons_released[button as usize]
    }

    pub fn key_pressed(&self, key: EditorKey) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Record a button transition for this frame.
    pub fn set_button(&mut self, button: PointerButton, down: bool) {
        let index = button as usize;
        if down && !self.buttons_down[index] {
            self.buttons_pressed[index] = true;
        }
        if !down && self.buttons_down[index] {
            self.buttons_released[index] = true;
        }
        self.buttons_down[index] = down;
    }

    pub fn push_key(&mut self, key: EditorKey) {
        if !self.keys_pressed.contains(&key) {
            self.keys_pressed.push(key);
        }
    }

    /// Carry held state into the next frame's snapshot, clearing the
    /// per-frame edges and deltas.
    pub fn next_frame(&self) -> Self {
        Self {
            pointer: self.pointer,
            pointer_delta: (0.0, 0.0),
            buttons_down: self.buttons_down,
            buttons_pressed: [false; 3],
            buttons_released: [false; 3],
            scroll_delta: 0.0,
            keys_pressed: Vec::new(),
            shift_down: self.shift_down,
            ui_wants_pointer: self.ui_wants_pointer,
            ui_wants_keyboard: self.ui_wants_keyboard,
            dt: self.dt,
        }
    }
}
