//! Per-frame hand input.

use glam::Vec2;

/// Discrete hand pose, as reported by whatever classifies the camera feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    OpenPalm,
    Fist,
    Wave,
}

impl Gesture {
    pub const ALL: [Gesture; 4] = [Gesture::None, Gesture::OpenPalm, Gesture::Fist, Gesture::Wave];

    /// Upper-case tag, e.g. `"OPEN_PALM"`.
    pub fn name(self) -> &'static str {
        match self {
            Gesture::None     => "NONE",
            Gesture::OpenPalm => "OPEN_PALM",
            Gesture::Fist     => "FIST",
            Gesture::Wave     => "WAVE",
        }
    }

    /// What the gesture does to the field, for on-screen status.
    pub fn describe(self) -> &'static str {
        match self {
            Gesture::Fist     => "Attracting (Fist)",
            Gesture::OpenPalm => "Repelling (Palm)",
            Gesture::Wave     => "Swirling (Wave)",
            Gesture::None     => "Floating",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A detected hand: where it is in canvas pixels and what it is doing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandState {
    pub position: Vec2,
    pub gesture:  Gesture,
}

impl HandState {
    pub fn new(position: Vec2, gesture: Gesture) -> Self {
        HandState { position, gesture }
    }

    /// Split an optional hand into the `(position, gesture)` pair the
    /// particle update consumes. No hand is the same as a neutral gesture.
    pub fn split(hand: Option<&HandState>) -> (Option<Vec2>, Gesture) {
        match hand {
            Some(h) => (Some(h.position), h.gesture),
            None    => (None, Gesture::None),
        }
    }
}
