//! Robolab Platform
//!
//! Host-neutral input vocabulary. A host (browser shell, native window,
//! test harness) translates its own events into these types and feeds
//! them to the viewer; the viewer never talks to a windowing system.

pub mod error;
pub mod gamepad;
pub mod input;

pub use error::{PlatformError, Result};
pub use gamepad::{GamepadSnapshot, GamepadSource, NullGamepad, ScriptedGamepad};
pub use input::{
    InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, PointerEvent, Viewport,
};
