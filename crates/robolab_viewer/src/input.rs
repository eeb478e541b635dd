//! Movement intent routing
//!
//! Keyboard, on-screen buttons (move commands), gamepad, and step pulses
//! are independent producers. A direction is held while any producer holds
//! it, and opposing directions cancel in the summed intent vector.

use crate::command::{Direction, WalkPattern};
use robolab_core::Vec3;
use robolab_platform::{GamepadSnapshot, Key, KeyState, KeyboardEvent};

/// Four independent direction flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementState {
    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Back => self.back,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Forward => self.forward = held,
            Direction::Back => self.back = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    pub fn union(&self, other: &MovementState) -> MovementState {
        MovementState {
            forward: self.forward || other.forward,
            back: self.back || other.back,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    /// Planar intent; forward is -Z
    pub fn vector(&self) -> Vec3 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        Vec3::new(axis(self.right, self.left), 0.0, axis(self.back, self.forward))
    }

    pub fn clear(&mut self) {
        *self = MovementState::default();
    }
}

/// Map a key to the direction it drives
pub fn key_direction(key: &Key) -> Option<Direction> {
    match key {
        Key::ArrowUp | Key::W => Some(Direction::Forward),
        Key::ArrowDown | Key::S => Some(Direction::Back),
        Key::ArrowLeft | Key::A => Some(Direction::Left),
        Key::ArrowRight | Key::D => Some(Direction::Right),
        _ => None,
    }
}

/// Gesture edges produced by a gamepad poll
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadActions {
    /// Button 0 went down this poll
    pub salute: bool,
    /// Button 1 changed: `Some(true)` starts the wave, `Some(false)` stops it
    pub wave: Option<bool>,
}

#[derive(Debug, Default)]
pub struct InputRouter {
    keyboard: MovementState,
    buttons: MovementState,
    gamepad: MovementState,
    steps: [f32; 4],
    pad_connected: bool,
    salute_held: bool,
    wave_held: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a keyboard event; returns whether the key drives movement
    ///
    /// Presses with a modifier held belong to host shortcuts and are
    /// ignored. Releases always clear the direction.
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        let Some(direction) = key_direction(&event.key) else {
            return false;
        };
        let pressed = matches!(event.state, KeyState::Pressed);
        if pressed && !event.modifiers.is_empty() {
            return false;
        }
        self.keyboard.set(direction, pressed);
        true
    }

    /// Continuous start/stop from an on-screen control
    pub fn set_button(&mut self, direction: Direction, held: bool) {
        self.buttons.set(direction, held);
    }

    /// Hold `direction` for `duration` seconds
    pub fn step(&mut self, direction: Direction, duration: f32) {
        let slot = &mut self.steps[direction.index()];
        *slot = slot.max(duration);
    }

    /// Consume one poll result
    ///
    /// `None` means no pad is present. Losing a connected pad clears every
    /// movement intent from every producer.
    pub fn apply_gamepad(&mut self, snapshot: Option<&GamepadSnapshot>, deadzone: f32) -> PadActions {
        let mut actions = PadActions::default();
        let Some(pad) = snapshot.filter(|p| p.connected) else {
            if self.pad_connected {
                tracing::debug!("gamepad disconnected, clearing movement");
                self.clear();
                if self.wave_held {
                    actions.wave = Some(false);
                }
            }
            self.pad_connected = false;
            self.salute_held = false;
            self.wave_held = false;
            return actions;
        };

        if !self.pad_connected {
            tracing::debug!(id = pad.id, "gamepad connected");
        }
        self.pad_connected = true;

        let x = pad.axis(0);
        let y = pad.axis(1);
        self.gamepad = MovementState {
            forward: y < -deadzone,
            back: y > deadzone,
            left: x < -deadzone,
            right: x > deadzone,
        };

        let salute = pad.button(0);
        actions.salute = salute && !self.salute_held;
        self.salute_held = salute;

        let wave = pad.button(1);
        if wave != self.wave_held {
            actions.wave = Some(wave);
        }
        self.wave_held = wave;

        actions
    }

    /// Combined flags from every producer
    pub fn movement(&self) -> MovementState {
        let mut state = self.keyboard.union(&self.buttons).union(&self.gamepad);
        for direction in Direction::ALL {
            if self.steps[direction.index()] > 0.0 {
                state.set(direction, true);
            }
        }
        state
    }

    /// Whether any producer holds a direction
    pub fn has_intent(&self) -> bool {
        self.movement().any()
    }

    pub fn intent(&self) -> Vec3 {
        self.movement().vector()
    }

    /// Count down step pulses
    pub fn advance(&mut self, dt: f32) {
        for remaining in &mut self.steps {
            *remaining = (*remaining - dt).max(0.0);
        }
    }

    pub fn pad_connected(&self) -> bool {
        self.pad_connected
    }

    pub fn clear(&mut self) {
        self.keyboard.clear();
        self.buttons.clear();
        self.gamepad.clear();
        self.steps = [0.0; 4];
    }
}

/// Synthesized direction used while no explicit intent is held
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoWalk {
    pub active: bool,
    pub angle: f32,
    /// Radians per second
    pub rate: f32,
    pub magnitude: f32,
    pub pattern: WalkPattern,
}

impl AutoWalk {
    pub fn new(rate: f32, magnitude: f32) -> Self {
        Self {
            active: false,
            angle: 0.0,
            rate,
            magnitude,
            pattern: WalkPattern::Circle,
        }
    }

    pub fn start(&mut self, pattern: WalkPattern) {
        self.active = true;
        self.pattern = pattern;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn advance(&mut self, dt: f32) {
        if self.active {
            self.angle = (self.angle + self.rate * dt) % std::f32::consts::TAU;
        }
    }

    /// Current direction, zero while inactive
    pub fn direction(&self) -> Vec3 {
        if !self.active {
            return Vec3::ZERO;
        }
        let a = self.angle;
        let dir = match self.pattern {
            WalkPattern::Circle => Vec3::new(a.cos(), 0.0, a.sin()),
            WalkPattern::Figure8 => Vec3::new(a.cos(), 0.0, (2.0 * a).cos()).normalize(),
        };
        dir * self.magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_directions_cancel() {
        let mut router = InputRouter::new();
        router.handle_key(&KeyboardEvent::pressed(Key::ArrowLeft));
        router.set_button(Direction::Right, true);
        assert!(router.has_intent());
        assert_eq!(router.intent(), Vec3::ZERO);

        router.handle_key(&KeyboardEvent::released(Key::ArrowLeft));
        assert_eq!(router.intent(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_wasd_and_arrows() {
        let mut router = InputRouter::new();
        assert!(router.handle_key(&KeyboardEvent::pressed(Key::W)));
        assert_eq!(router.intent(), Vec3::new(0.0, 0.0, -1.0));
        assert!(!router.handle_key(&KeyboardEvent::pressed(Key::Space)));
        router.handle_key(&KeyboardEvent::released(Key::W));
        assert!(!router.has_intent());
    }

    #[test]
    fn test_modified_press_is_ignored() {
        let mut router = InputRouter::new();
        let mut event = KeyboardEvent::pressed(Key::S);
        event.modifiers.ctrl = true;
        assert!(!router.handle_key(&event));
        assert!(!router.has_intent());

        router.handle_key(&KeyboardEvent::pressed(Key::S));
        let mut release = KeyboardEvent::released(Key::S);
        release.modifiers.shift = true;
        assert!(router.handle_key(&release));
        assert!(!router.has_intent());
    }

    #[test]
    fn test_step_pulse_expires() {
        let mut router = InputRouter::new();
        router.step(Direction::Back, 0.25);
        assert_eq!(router.intent(), Vec3::new(0.0, 0.0, 1.0));
        router.advance(0.2);
        assert!(router.has_intent());
        router.advance(0.1);
        assert!(!router.has_intent());
    }

    #[test]
    fn test_gamepad_deadzone_and_buttons() {
        let mut router = InputRouter::new();
        let pad = GamepadSnapshot::with_stick(0, 0.1, -0.9);
        let actions = router.apply_gamepad(Some(&pad), 0.25);
        assert_eq!(actions, PadActions::default());
        assert_eq!(router.movement(), MovementState { forward: true, ..Default::default() });

        let mut pad = GamepadSnapshot::with_stick(0, 0.0, 0.0);
        pad.set_button(0, true);
        pad.set_button(1, true);
        let actions = router.apply_gamepad(Some(&pad), 0.25);
        assert!(actions.salute);
        assert_eq!(actions.wave, Some(true));
        assert!(!router.has_intent());

        // held buttons do not retrigger
        let actions = router.apply_gamepad(Some(&pad), 0.25);
        assert!(!actions.salute);
        assert_eq!(actions.wave, None);
    }

    #[test]
    fn test_disconnect_clears_all_producers() {
        let mut router = InputRouter::new();
        router.handle_key(&KeyboardEvent::pressed(Key::D));
        router.set_button(Direction::Forward, true);
        router.step(Direction::Left, 1.0);
        let mut pad = GamepadSnapshot::with_stick(0, 0.0, 1.0);
        pad.set_button(1, true);
        router.apply_gamepad(Some(&pad), 0.25);
        assert!(router.has_intent());

        let actions = router.apply_gamepad(Some(&GamepadSnapshot::disconnected(0)), 0.25);
        assert_eq!(actions.wave, Some(false));
        assert!(!router.has_intent());
        assert!(!router.pad_connected());
    }

    #[test]
    fn test_auto_walk_patterns() {
        let mut walk = AutoWalk::new(0.6, 0.7);
        assert_eq!(walk.direction(), Vec3::ZERO);

        walk.start(WalkPattern::Circle);
        assert!((walk.direction().length() - 0.7).abs() < 1e-5);

        walk.start(WalkPattern::Figure8);
        walk.advance(1.0);
        assert!((walk.direction().length() - 0.7).abs() < 1e-5);

        walk.stop();
        assert_eq!(walk.direction(), Vec3::ZERO);
    }
}
