use serde::{Deserialize, Serialize};

/// The compass direction a camera was facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Facing north
    #[serde(rename = "n")]
    North,
    /// Facing east
    #[serde(rename = "e")]
    East,
    /// Facing south
    #[serde(rename = "s")]
    South,
    /// Facing west
    #[serde(rename = "w")]
    West,
    /// Facing north-east
    #[serde(rename = "ne")]
    NorthEast,
    /// Facing north-west
    #[serde(rename = "nw")]
    NorthWest,
    /// Facing south-east
    #[serde(rename = "se")]
    SouthEast,
    /// Facing south-west
    #[serde(rename = "sw")]
    SouthWest,
    /// Taken from the air
    #[serde(rename = "aero")]
    Aerial,
}
impl Direction {
    /// The wire name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::East => "e",
            Direction::South => "s",
            Direction::West => "w",
            Direction::NorthEast => "ne",
            Direction::NorthWest => "nw",
            Direction::SouthEast => "se",
            Direction::SouthWest => "sw",
            Direction::Aerial => "aero",
        }
    }

    /// The clockwise angle from north, in radians. Aerial photos have none.
    pub fn angle(&self) -> Option<f64> {
        use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
        match self {
            Direction::North => Some(0.0),
            Direction::East => Some(FRAC_PI_2),
            Direction::South => Some(PI),
            Direction::West => Some(-FRAC_PI_2),
            Direction::NorthEast => Some(FRAC_PI_4),
            Direction::NorthWest => Some(-FRAC_PI_4),
            Direction::SouthEast => Some(FRAC_PI_4 * 3.0),
            Direction::SouthWest => Some(-FRAC_PI_4 * 3.0),
            Direction::Aerial => None,
        }
    }
}
impl std::str::FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "n" => Direction::North,
            "e" => Direction::East,
            "s" => Direction::South,
            "w" => Direction::West,
            "ne" => Direction::NorthEast,
            "nw" => Direction::NorthWest,
            "se" => Direction::SouthEast,
            "sw" => Direction::SouthWest,
            "aero" => Direction::Aerial,
            _ => return Err(UnknownDirection(s.to_string())),
        })
    }
}
impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direction string the server sent that this client does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDirection(pub String);
impl std::fmt::Display for UnknownDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown direction: {:?}", self.0)
    }
}
impl std::error::Error for UnknownDirection {}
