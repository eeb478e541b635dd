//! Polled gamepad input
//!
//! Gamepads are polled once per frame rather than delivering events, so the
//! viewer sees one consistent snapshot per update.

use smallvec::SmallVec;
use std::collections::VecDeque;

/// State of one gamepad at poll time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GamepadSnapshot {
    /// Host-assigned pad index
    pub id: u32,
    pub connected: bool,
    /// Axes in -1..1; 0/1 are the left stick X/Y (+Y down)
    pub axes: SmallVec<[f32; 4]>,
    /// Pressed state per standard-mapping button index
    pub buttons: SmallVec<[bool; 16]>,
}

impl GamepadSnapshot {
    /// A connected pad with the given left stick and no buttons pressed
    pub fn with_stick(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            connected: true,
            axes: SmallVec::from_slice(&[x, y, 0.0, 0.0]),
            buttons: SmallVec::from_elem(false, 4),
        }
    }

    /// A disconnected pad
    pub fn disconnected(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Axis value, 0 when absent or non-finite
    pub fn axis(&self, index: usize) -> f32 {
        self.axes
            .get(index)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    pub fn set_button(&mut self, index: usize, pressed: bool) {
        if self.buttons.len() <= index {
            self.buttons.resize(index + 1, false);
        }
        self.buttons[index] = pressed;
    }
}

/// Source of gamepad snapshots, polled at the start of each frame
pub trait GamepadSource {
    /// Current state of the active pad, `None` when no pad has ever connected
    fn poll(&mut self) -> Option<GamepadSnapshot>;
}

/// Source that never reports a gamepad
#[derive(Clone, Copy, Debug, Default)]
pub struct NullGamepad;

impl GamepadSource for NullGamepad {
    fn poll(&mut self) -> Option<GamepadSnapshot> {
        None
    }
}

/// Source replaying queued snapshots
///
/// Each poll consumes one queued snapshot; once the queue is empty the last
/// snapshot keeps being reported, like a pad held in the same state.
#[derive(Clone, Debug, Default)]
pub struct ScriptedGamepad {
    queue: VecDeque<GamepadSnapshot>,
    last: Option<GamepadSnapshot>,
}

impl ScriptedGamepad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: GamepadSnapshot) {
        self.queue.push_back(snapshot);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl GamepadSource for ScriptedGamepad {
    fn poll(&mut self) -> Option<GamepadSnapshot> {
        if let Some(next) = self.queue.pop_front() {
            self.last = Some(next);
        }
        self.last.clone()
    }
}

impl<S: GamepadSource + ?Sized> GamepadSource for Box<S> {
    fn poll(&mut self) -> Option<GamepadSnapshot> {
        (**self).poll()
    }
}
