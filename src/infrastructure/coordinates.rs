// Station coordinate table, loaded once at startup
use crate::domain::errors::ConfigError;
use crate::domain::station::Coordinate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Deserialize)]
struct CoordinateEntry {
    location: String,
    x: f64,
    y: f64,
}

/// Immutable lookup from location identifier to planar coordinates.
/// Loaded from the JSON coordinate file (`[{location, x, y}, ...]`) at
/// startup and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    table: HashMap<String, Coordinate>,
}

impl CoordinateTable {
    /// Reads the table from disk. Failure here is fatal: the service must
    /// not serve with a partially loaded table.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::CoordinateIo {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&contents).map_err(|source| ConfigError::CoordinateFormat {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<CoordinateEntry> = serde_json::from_str(contents)?;
        Ok(Self::from_entries(
            entries
                .into_iter()
                .map(|entry| (entry.location, Coordinate { x: entry.x, y: entry.y }))
                .collect(),
        ))
    }

    pub fn from_entries(entries: Vec<(String, Coordinate)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// Total lookup: an unknown location is a valid state, never an error.
    pub fn lookup(&self, location: &str) -> Option<Coordinate> {
        self.table.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
