//! Discrete agent headings.

use serde::{Serialize, Serializer};

/// A heading attached to a pose, or `None` when the plan carries no heading.
///
/// Angles are in degrees in screen space: y grows downward and positive
/// rotation is clockwise, so `+y` is 90°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    None,

    // Axis tags, as emitted by the planners.
    XPlus,
    YPlus,
    XMinus,
    YMinus,

    // Compass tags.
    East,
    South,
    West,
    North,
}

impl Orientation {
    /// Every orientation that has a tag.
    pub const TAGGED: [Self; 8] = [
        Self::XPlus,
        Self::YPlus,
        Self::XMinus,
        Self::YMinus,
        Self::East,
        Self::South,
        Self::West,
        Self::North,
    ];

    /// Resolves a tag such as `X_PLUS`. `None` for tags outside the vocabulary.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::TAGGED.into_iter().find(|o| o.tag() == Some(tag))
    }

    /// The tag written in plan files. `None` has no tag.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::XPlus => Some("X_PLUS"),
            Self::YPlus => Some("Y_PLUS"),
            Self::XMinus => Some("X_MINUS"),
            Self::YMinus => Some("Y_MINUS"),
            Self::East => Some("X_EAST"),
            Self::South => Some("X_SOUTH"),
            Self::West => Some("X_WEST"),
            Self::North => Some("X_NORTH"),
        }
    }

    /// Heading in degrees, in `[0, 360)`.
    pub fn angle(self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::XPlus | Self::East => Some(0.0),
            Self::YPlus | Self::South => Some(90.0),
            Self::XMinus | Self::West => Some(180.0),
            Self::YMinus | Self::North => Some(270.0),
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.tag() {
            Some(tag) => serializer.serialize_some(tag),
            None => serializer.serialize_none(),
        }
    }
}
