//! Input event types for keyboard and pointer

use crate::error::{PlatformError, Result};
use robolab_core::Vec2;

/// Input events
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer (mouse, pen, touch) event
    Pointer(PointerEvent),
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Scroll/wheel event, positive `delta_y` scrolls toward the user
    Wheel { delta_y: f32 },
}

// ============================================================================
// Pointer Events
// ============================================================================

/// Pointer events in surface pixel coordinates (origin top-left)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to position
    Moved { x: f32, y: f32 },
    /// Button pressed
    ButtonPressed { button: MouseButton, x: f32, y: f32 },
    /// Button released
    ButtonReleased { button: MouseButton, x: f32, y: f32 },
    /// Pointer left the surface
    Left,
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Middle button (scroll wheel click)
    Middle,
    /// Other button with index
    Other(u16),
}

// ============================================================================
// Keyboard Events
// ============================================================================

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed or released
    pub key: Key,
    /// Whether the key was pressed or released
    pub state: KeyState,
    /// Modifier keys held during this event
    pub modifiers: Modifiers,
    /// Auto-repeat from a held key
    pub repeat: bool,
}

impl KeyboardEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }
}

/// Key press/release state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key was pressed
    Pressed,
    /// Key was released
    Released,
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Check if no modifiers are held
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }
}

/// Key codes the viewer cares about
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    Space,
    Escape,
    /// Any other key, by host key name
    Other(String),
}

impl Key {
    /// Parse a host key name
    ///
    /// Accepts DOM `KeyboardEvent.key` / `KeyboardEvent.code` spellings
    /// (`"ArrowUp"`, `"w"`, `"KeyW"`, `" "`, `"Space"`). Unknown names map
    /// to [`Key::Other`].
    pub fn from_name(name: &str) -> Key {
        match name {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "w" | "W" | "KeyW" => Key::W,
            "a" | "A" | "KeyA" => Key::A,
            "s" | "S" | "KeyS" => Key::S,
            "d" | "D" | "KeyD" => Key::D,
            " " | "Space" | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

// ============================================================================
// Viewport
// ============================================================================

/// Render surface size in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Create a viewport, rejecting zero or non-finite sizes
    pub fn new(width: f32, height: f32) -> Result<Self> {
        let viewport = Self { width, height };
        if viewport.is_valid() {
            Ok(viewport)
        } else {
            Err(PlatformError::InvalidViewport { width, height })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Convert surface pixels to normalized device coordinates (-1..1, +Y up)
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new((x / self.width) * 2.0 - 1.0, -((y / self.height) * 2.0 - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name("KeyW"), Key::W);
        assert_eq!(Key::from_name("d"), Key::D);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("F5"), Key::Other("F5".to_string()));
    }

    #[test]
    fn test_viewport_ndc() {
        let vp = Viewport::new(800.0, 400.0).unwrap();
        assert_eq!(vp.aspect(), 2.0);
        assert_eq!(vp.to_ndc(400.0, 200.0), Vec2::new(0.0, 0.0));
        assert_eq!(vp.to_ndc(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.to_ndc(800.0, 400.0), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_invalid_viewport() {
        assert!(Viewport::new(0.0, 100.0).is_err());
        assert!(Viewport::new(100.0, f32::NAN).is_err());
    }
}
