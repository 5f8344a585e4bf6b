//! Control flags: the movement-intent switches a session exposes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SessionError;

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// A named control flag on the player entity.
///
/// Each flag is either held (`true`) or released (`false`). The protocol
/// client keeps applying held flags every physics tick until they are
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Sprint,
    Sneak,
}

impl Control {
    /// Every control flag, in wire order.
    pub const ALL: [Control; 7] = [
        Self::Forward,
        Self::Back,
        Self::Left,
        Self::Right,
        Self::Jump,
        Self::Sprint,
        Self::Sneak,
    ];

    /// Lowercase name used on the wire and in settings files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
            Self::Jump => "jump",
            Self::Sprint => "sprint",
            Self::Sneak => "sneak",
        }
    }

    /// Returns the direction if this flag is a horizontal movement.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Forward => Some(Direction::Forward),
            Self::Back => Some(Direction::Back),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::Jump | Self::Sprint | Self::Sneak => None,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Control {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SessionError::UnknownControl(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The subset of controls that move the player horizontally.
///
/// Anti-idle rotation only ever draws from directions, so holding one of
/// these never collides with the jump pulse or the sneak toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [Self::Forward, Self::Back, Self::Left, Self::Right];

    /// The control flag that drives this direction.
    pub fn control(self) -> Control {
        match self {
            Self::Forward => Control::Forward,
            Self::Back => Control::Back,
            Self::Left => Control::Left,
            Self::Right => Control::Right,
        }
    }
}

impl From<Direction> for Control {
    fn from(direction: Direction) -> Self {
        direction.control()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.control().fmt(f)
    }
}

impl FromStr for Direction {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Control>()
            .ok()
            .and_then(Control::direction)
            .ok_or_else(|| SessionError::UnknownDirection(s.to_string()))
    }
}
