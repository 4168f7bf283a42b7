//! JSON wire protocol shared with the turtle firmware
//!
//! Every frame is a single JSON object dispatched on its `command` field.
//! Inbound frames arrive from turtles over the WebSocket; outbound frames are
//! pushed by the server (registration replies and operator commands).

use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier assigned to a turtle on first contact
pub type Label = u32;

/// Integer voxel coordinate in the turtle world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// East-west axis
    pub x: i64,
    /// Vertical axis
    pub y: i64,
    /// North-south axis
    pub z: i64,
}

impl Position {
    /// The world origin, where freshly registered turtles start
    pub const ORIGIN: Position = Position { x: 0, y: 0, z: 0 };

    /// Canonical string key used in the block map, e.g. `"(1, 0, -3)"`
    pub fn key(&self) -> String {
        format!("({}, {}, {})", self.x, self.y, self.z)
    }

    /// Position shifted by the given deltas
    pub fn offset(&self, dx: i64, dy: i64, dz: i64) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Coordinate directly above (y + 1)
    pub fn above(&self) -> Position {
        self.offset(0, 1, 0)
    }

    /// Coordinate directly below (y - 1)
    pub fn below(&self) -> Position {
        self.offset(0, -1, 0)
    }
}

/// Cardinal heading of a turtle, wire-encoded 1-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Heading {
    /// +x, encoded 1
    East = 1,
    /// +z, encoded 2
    South = 2,
    /// -x, encoded 3
    West = 3,
    /// -z, encoded 4
    North = 4,
}

impl Heading {
    /// Coordinate one unit ahead of `position` along this heading
    pub fn ahead_of(&self, position: Position) -> Position {
        match self {
            Heading::East => position.offset(1, 0, 0),
            Heading::South => position.offset(0, 0, 1),
            Heading::West => position.offset(-1, 0, 0),
            Heading::North => position.offset(0, 0, -1),
        }
    }
}

impl From<Heading> for u8 {
    fn from(heading: Heading) -> u8 {
        heading as u8
    }
}

impl TryFrom<u8> for Heading {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Heading::East),
            2 => Ok(Heading::South),
            3 => Ok(Heading::West),
            4 => Ok(Heading::North),
            other => Err(format!("invalid heading: {} (expected 1-4)", other)),
        }
    }
}

/// Frames received from a turtle
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Inbound {
    /// Telemetry frame: current position, heading, and the three adjacent
    /// block identifiers (forward/above/below)
    Status {
        /// Current position reported by the turtle
        turtle_position: Position,
        /// Current heading, 1-4
        turtle_direction: Heading,
        /// Block identifier one unit ahead
        block_forward: String,
        /// Block identifier directly above
        block_above: String,
        /// Block identifier directly below
        block_below: String,
        /// Label, if the turtle has one
        #[serde(default, deserialize_with = "label_or_none")]
        turtle_label: Option<Label>,
    },
    /// Registration frame sent once after connecting. The firmware sends the
    /// literal string `"None"` when it has never been assigned a label.
    TurtleInformation {
        /// Previously assigned label, if any
        #[serde(default, deserialize_with = "label_or_none")]
        turtle_label: Option<Label>,
    },
}

/// Frames pushed to a turtle
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Outbound {
    /// Assigns a freshly allocated label to an unlabeled turtle
    InitLabel {
        /// The allocated label
        turtle_label: Label,
    },
    /// Pushes the stored position/heading back to a registering turtle
    LocationUpdate {
        /// Last known position
        turtle_position: Position,
        /// Last known heading
        turtle_direction: Heading,
    },
    /// Operator command: move one step in `direction`
    Move {
        /// Movement direction (firmware-defined, e.g. "forward", "up")
        direction: String,
    },
    /// Operator command: rotate toward `direction`
    Turn {
        /// Turn direction (firmware-defined, e.g. "left", "right")
        direction: String,
    },
    /// Operator command: halt the current action
    Stop,
}

/// Accepts a label as a JSON number, a numeric string, the string `"None"`,
/// `null`, or an absent field. Anything unparseable is treated as absent.
fn label_or_none<'de, D>(deserializer: D) -> Result<Option<Label>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().map(|n| n as Label),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_forward_offsets() {
        let origin = Position::ORIGIN;
        assert_eq!(Heading::East.ahead_of(origin), Position { x: 1, y: 0, z: 0 });
        assert_eq!(Heading::South.ahead_of(origin), Position { x: 0, y: 0, z: 1 });
        assert_eq!(Heading::West.ahead_of(origin), Position { x: -1, y: 0, z: 0 });
        assert_eq!(Heading::North.ahead_of(origin), Position { x: 0, y: 0, z: -1 });
    }

    #[test]
    fn test_heading_wire_encoding() {
        assert_eq!(u8::from(Heading::East), 1);
        assert_eq!(Heading::try_from(4).unwrap(), Heading::North);
        assert!(Heading::try_from(0).is_err());
        assert!(Heading::try_from(5).is_err());
    }

    #[test]
    fn test_position_key_format() {
        let pos = Position { x: 1, y: 0, z: -3 };
        assert_eq!(pos.key(), "(1, 0, -3)");
    }

    #[test]
    fn test_status_frame_parse() {
        let json = r#"{
            "command": "status",
            "turtle_position": {"x": 5, "y": 64, "z": -2},
            "turtle_direction": 2,
            "block_forward": "minecraft:stone",
            "block_above": "minecraft:air",
            "block_below": "minecraft:dirt",
            "turtle_label": 4821
        }"#;
        let frame: Inbound = serde_json::from_str(json).unwrap();
        match frame {
            Inbound::Status {
                turtle_position,
                turtle_direction,
                block_forward,
                turtle_label,
                ..
            } => {
                assert_eq!(turtle_position, Position { x: 5, y: 64, z: -2 });
                assert_eq!(turtle_direction, Heading::South);
                assert_eq!(block_forward, "minecraft:stone");
                assert_eq!(turtle_label, Some(4821));
            }
            other => panic!("expected status frame, got {:?}", other),
        }
    }

    #[test]
    fn test_turtle_information_none_label() {
        // The firmware sends the literal string "None" before first assignment
        let json = r#"{"command": "turtle_information", "turtle_label": "None"}"#;
        let frame: Inbound = serde_json::from_str(json).unwrap();
        match frame {
            Inbound::TurtleInformation { turtle_label } => assert_eq!(turtle_label, None),
            other => panic!("expected turtle_information, got {:?}", other),
        }
    }

    #[test]
    fn test_turtle_information_string_label() {
        let json = r#"{"command": "turtle_information", "turtle_label": "4821"}"#;
        let frame: Inbound = serde_json::from_str(json).unwrap();
        match frame {
            Inbound::TurtleInformation { turtle_label } => assert_eq!(turtle_label, Some(4821)),
            other => panic!("expected turtle_information, got {:?}", other),
        }
    }

    #[test]
    fn test_turtle_information_missing_label() {
        let json = r#"{"command": "turtle_information"}"#;
        let frame: Inbound = serde_json::from_str(json).unwrap();
        match frame {
            Inbound::TurtleInformation { turtle_label } => assert_eq!(turtle_label, None),
            other => panic!("expected turtle_information, got {:?}", other),
        }
    }

    #[test]
    fn test_status_frame_missing_required_field_rejected() {
        let json = r#"{"command": "status", "turtle_position": {"x": 0, "y": 0, "z": 0}}"#;
        assert!(serde_json::from_str::<Inbound>(json).is_err());
    }

    #[test]
    fn test_invalid_heading_rejected() {
        let json = r#"{
            "command": "status",
            "turtle_position": {"x": 0, "y": 0, "z": 0},
            "turtle_direction": 9,
            "block_forward": "a", "block_above": "b", "block_below": "c"
        }"#;
        assert!(serde_json::from_str::<Inbound>(json).is_err());
    }

    #[test]
    fn test_outbound_frame_shapes() {
        let json = serde_json::to_string(&Outbound::InitLabel { turtle_label: 4821 }).unwrap();
        assert!(json.contains(r#""command":"init_label""#));
        assert!(json.contains(r#""turtle_label":4821"#));

        let json = serde_json::to_string(&Outbound::Move {
            direction: "forward".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""command":"move""#));
        assert!(json.contains(r#""direction":"forward""#));

        let json = serde_json::to_string(&Outbound::Stop).unwrap();
        assert_eq!(json, r#"{"command":"stop"}"#);
    }

    #[test]
    fn test_location_update_shape() {
        let frame = Outbound::LocationUpdate {
            turtle_position: Position { x: 1, y: 2, z: 3 },
            turtle_direction: Heading::East,
        };
        let value: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["command"], "location_update");
        assert_eq!(value["turtle_position"]["x"], 1);
        assert_eq!(value["turtle_direction"], 1);
    }
}
