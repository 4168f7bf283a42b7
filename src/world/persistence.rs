// World table persistence
// Handles saving and loading the turtle registry and block map to/from files

use super::store::Turtle;
use crate::protocol::Label;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Serializable envelope for the turtle registry file
/// The version field is kept for future migration support
#[derive(Debug, Serialize, Deserialize)]
struct RegistryData {
    version: u32,
    turtles: HashMap<Label, Turtle>,
}

/// Serializable envelope for the block map file
#[derive(Debug, Serialize, Deserialize)]
struct BlockMapData {
    version: u32,
    blocks: HashMap<String, String>,
}

const FORMAT_VERSION: u32 = 1;

/// On-disk locations of the two world tables
///
/// The store writes each table in full before a mutating call returns, so the
/// files are always a consistent snapshot of the in-memory state.
#[derive(Debug, Clone)]
pub struct WorldFiles {
    turtles_path: PathBuf,
    blocks_path: PathBuf,
}

impl WorldFiles {
    /// Place both table files under `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let dir = data_dir.as_ref();
        Self {
            turtles_path: dir.join("turtles.json"),
            blocks_path: dir.join("block_stats.json"),
        }
    }

    /// Save the turtle registry, creating the data directory if needed
    pub fn save_turtles(&self, turtles: &HashMap<Label, Turtle>) -> Result<(), PersistenceError> {
        let data = RegistryData {
            version: FORMAT_VERSION,
            turtles: turtles.clone(),
        };
        write_json(&self.turtles_path, &data)
    }

    /// Load the turtle registry; a missing file yields an empty table
    pub fn load_turtles(&self) -> Result<HashMap<Label, Turtle>, PersistenceError> {
        if !self.turtles_path.exists() {
            return Ok(HashMap::new());
        }
        let json = fs::read_to_string(&self.turtles_path)?;
        let data: RegistryData = serde_json::from_str(&json)?;
        if data.version != FORMAT_VERSION {
            return Err(PersistenceError::InvalidData(format!(
                "Unsupported registry version: {}",
                data.version
            )));
        }
        Ok(data.turtles)
    }

    /// Save the block map, creating the data directory if needed
    pub fn save_blocks(&self, blocks: &HashMap<String, String>) -> Result<(), PersistenceError> {
        let data = BlockMapData {
            version: FORMAT_VERSION,
            blocks: blocks.clone(),
        };
        write_json(&self.blocks_path, &data)
    }

    /// Load the block map; a missing file yields an empty table
    pub fn load_blocks(&self) -> Result<HashMap<String, String>, PersistenceError> {
        if !self.blocks_path.exists() {
            return Ok(HashMap::new());
        }
        let json = fs::read_to_string(&self.blocks_path)?;
        let data: BlockMapData = serde_json::from_str(&json)?;
        if data.version != FORMAT_VERSION {
            return Err(PersistenceError::InvalidData(format!(
                "Unsupported block map version: {}",
                data.version
            )));
        }
        Ok(data.blocks)
    }
}

fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Heading, Position};
    use tempfile::tempdir;

    #[test]
    fn test_turtle_registry_round_trip() {
        let dir = tempdir().unwrap();
        let files = WorldFiles::new(dir.path());

        let mut turtles = HashMap::new();
        turtles.insert(
            4821,
            Turtle {
                position: Position { x: 5, y: 64, z: -2 },
                heading: Heading::South,
            },
        );
        turtles.insert(
            1000,
            Turtle {
                position: Position::ORIGIN,
                heading: Heading::East,
            },
        );

        files.save_turtles(&turtles).unwrap();
        let loaded = files.load_turtles().unwrap();

        assert_eq!(loaded, turtles);
    }

    #[test]
    fn test_block_map_round_trip() {
        let dir = tempdir().unwrap();
        let files = WorldFiles::new(dir.path());

        let mut blocks = HashMap::new();
        blocks.insert("(1, 0, 0)".to_string(), "minecraft:stone".to_string());
        blocks.insert("(0, -1, 0)".to_string(), "minecraft:dirt".to_string());

        files.save_blocks(&blocks).unwrap();
        let loaded = files.load_blocks().unwrap();

        assert_eq!(loaded, blocks);
    }

    #[test]
    fn test_load_from_missing_files() {
        let dir = tempdir().unwrap();
        let files = WorldFiles::new(dir.path().join("does-not-exist"));

        assert!(files.load_turtles().unwrap().is_empty());
        assert!(files.load_blocks().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_data_directory() {
        let dir = tempdir().unwrap();
        let files = WorldFiles::new(dir.path().join("nested").join("data"));

        files.save_blocks(&HashMap::new()).unwrap();
        assert!(files.load_blocks().unwrap().is_empty());
    }

    #[test]
    fn test_turtle_on_disk_shape() {
        // The registry persists turtles as flat {x, y, z, direction} records
        let turtle = Turtle {
            position: Position { x: 1, y: 2, z: 3 },
            heading: Heading::West,
        };
        let value = serde_json::to_value(&turtle).unwrap();
        assert_eq!(value["x"], 1);
        assert_eq!(value["y"], 2);
        assert_eq!(value["z"], 3);
        assert_eq!(value["direction"], 3);
    }
}
