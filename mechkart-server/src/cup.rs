use std::fs;

use serde::{Deserialize, Serialize};

use crate::checkpoints::TrackError;
use crate::track::TrackDefinition;

// A series: its tracks are raced once each, in order, and the cup is what a
// best placement and its trophy belong to
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Cup {
    pub name: String,
    pub tracks: Vec<TrackDefinition>,
}

impl Cup {
    pub fn new(name: &str, tracks: Vec<TrackDefinition>) -> Cup {
        Cup {
            name: name.to_string(),
            tracks,
        }
    }

    pub fn load(filename: &str) -> Result<Cup, TrackError> {
        log::info!("loading cup {}", filename);
        let contents = fs::read_to_string(filename).map_err(|source| TrackError::Io {
            path: filename.to_string(),
            source,
        })?;

        Cup::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Cup, TrackError> {
        let cup: Cup = serde_yaml::from_str(contents)?;
        if cup.is_empty() {
            return Err(TrackError::EmptyCup { name: cup.name });
        }
        Ok(cup)
    }

    /// `races` ovals, each wider and with more checkpoints than the last.
    pub fn ovals(name: &str, races: usize) -> Cup {
        let tracks = (0..races)
            .map(|i| {
                TrackDefinition::oval(&format!("Oval {}", i + 1), 8 + 2 * i, 30.0 + 10.0 * i as f64)
            })
            .collect();

        Cup::new(name, tracks)
    }

    /// The same track, raced `races` times.
    pub fn repeat(name: &str, track: TrackDefinition, races: usize) -> Cup {
        Cup::new(name, vec![track; races])
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, race: usize) -> Option<&TrackDefinition> {
        self.tracks.get(race)
    }
}
