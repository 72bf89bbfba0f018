//! Input buffering between the window layer and the camera

use std::collections::VecDeque;
use std::ops::{BitOr, BitOrAssign};
use winit::keyboard::KeyCode;

/// A camera-relevant input event, applied in arrival order before the frame
/// update
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraEvent {
    /// Cursor position in window pixels, y growing downward
    PointerMoved { x: f64, y: f64 },
    /// Vertical scroll offset in notches
    Scrolled { y: f64 },
    /// Pointer starts driving orientation
    Engaged,
    /// Pointer stops driving orientation
    Released,
    /// Face the start direction again
    Snapped,
}

/// Held movement keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveKeys(u8);

impl MoveKeys {
    pub const NONE: Self = Self(0);
    pub const FORWARD: Self = Self(1 << 0);
    pub const BACK: Self = Self(1 << 1);
    pub const LEFT: Self = Self(1 << 2);
    pub const RIGHT: Self = Self(1 << 3);
    pub const UP: Self = Self(1 << 4);
    pub const DOWN: Self = Self(1 << 5);

    /// The movement key bound to a physical key, if any
    pub fn from_key_code(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW => Some(Self::FORWARD),
            KeyCode::KeyS => Some(Self::BACK),
            KeyCode::KeyA => Some(Self::LEFT),
            KeyCode::KeyD => Some(Self::RIGHT),
            KeyCode::Space => Some(Self::UP),
            KeyCode::ShiftLeft => Some(Self::DOWN),
            _ => None,
        }
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MoveKeys {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MoveKeys {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Events and key state gathered between two frames
#[derive(Debug, Default)]
pub struct InputState {
    events: VecDeque<CameraEvent>,
    held: MoveKeys,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a camera event
    pub fn push(&mut self, event: CameraEvent) {
        self.events.push_back(event);
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        if let Some(k) = MoveKeys::from_key_code(key) {
            self.held.insert(k);
        }
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        if let Some(k) = MoveKeys::from_key_code(key) {
            self.held.remove(k);
        }
    }

    /// Drop held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held = MoveKeys::NONE;
    }

    /// Take every queued event in arrival order
    pub fn drain_events(&mut self) -> impl Iterator<Item = CameraEvent> + '_ {
        self.events.drain(..)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Movement keys currently held
    pub fn held_keys(&self) -> MoveKeys {
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut input = InputState::new();

        input.process_key_down(KeyCode::KeyW);
        input.process_key_down(KeyCode::Space);
        assert!(input.held_keys().contains(MoveKeys::FORWARD));
        assert!(input.held_keys().contains(MoveKeys::UP));
        assert!(!input.held_keys().contains(MoveKeys::BACK));

        input.process_key_up(KeyCode::KeyW);
        assert!(!input.held_keys().contains(MoveKeys::FORWARD));
        assert!(input.held_keys().contains(MoveKeys::UP));

        input.release_all();
        assert!(input.held_keys().is_empty());
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::KeyQ);
        input.process_key_down(KeyCode::Escape);
        assert!(input.held_keys().is_empty());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(MoveKeys::from_key_code(KeyCode::KeyS), Some(MoveKeys::BACK));
        assert_eq!(MoveKeys::from_key_code(KeyCode::KeyA), Some(MoveKeys::LEFT));
        assert_eq!(MoveKeys::from_key_code(KeyCode::KeyD), Some(MoveKeys::RIGHT));
        assert_eq!(MoveKeys::from_key_code(KeyCode::ShiftLeft), Some(MoveKeys::DOWN));
        assert_eq!(MoveKeys::from_key_code(KeyCode::ShiftRight), None);
    }

    #[test]
    fn test_events_drain_in_order() {
        let mut input = InputState::new();
        input.push(CameraEvent::Engaged);
        input.push(CameraEvent::PointerMoved { x: 1.0, y: 2.0 });
        input.push(CameraEvent::Scrolled { y: -1.0 });
        assert_eq!(input.pending_events(), 3);

        let events: Vec<_> = input.drain_events().collect();
        assert_eq!(
            events,
            vec![
                CameraEvent::Engaged,
                CameraEvent::PointerMoved { x: 1.0, y: 2.0 },
                CameraEvent::Scrolled { y: -1.0 },
            ]
        );
        assert_eq!(input.pending_events(), 0);
    }

    #[test]
    fn test_move_keys_combine() {
        let mut keys = MoveKeys::FORWARD | MoveKeys::LEFT;
        assert!(keys.contains(MoveKeys::FORWARD | MoveKeys::LEFT));
        keys |= MoveKeys::DOWN;
        assert!(keys.contains(MoveKeys::DOWN));
        keys.remove(MoveKeys::FORWARD);
        assert!(!keys.contains(MoveKeys::FORWARD));
    }
}
