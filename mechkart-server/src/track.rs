use std::f64::consts::TAU;
use std::fs;

use glam::DVec3;
use mechkart_core::racer::lap_info::LapNumber;
use serde::{Deserialize, Serialize};

use crate::checkpoints::{CheckpointRing, TrackError};

// A track as authored: checkpoint anchors in driving order, the last one being
// the finish line. Laps override the configured default when present.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackDefinition {
    pub name: String,
    #[serde(default)]
    pub laps: Option<LapNumber>,
    pub checkpoints: Vec<[f64; 3]>,
}

impl TrackDefinition {
    pub fn load(filename: &str) -> Result<TrackDefinition, TrackError> {
        log::info!("loading track {}", filename);
        let contents = fs::read_to_string(filename).map_err(|source| TrackError::Io {
            path: filename.to_string(),
            source,
        })?;

        TrackDefinition::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<TrackDefinition, TrackError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// An evenly spaced circular track on the ground plane.
    pub fn oval(name: &str, checkpoint_count: usize, radius: f64) -> TrackDefinition {
        let checkpoints = (0..checkpoint_count)
            .map(|i| {
                let angle = TAU * i as f64 / checkpoint_count as f64;
                [radius * angle.cos(), 0.0, radius * angle.sin()]
            })
            .collect();

        TrackDefinition {
            name: name.to_string(),
            laps: None,
            checkpoints,
        }
    }

    pub fn build_ring(&self) -> Result<CheckpointRing, TrackError> {
        let positions: Vec<DVec3> = self.checkpoints.iter().map(|&p| DVec3::from(p)).collect();
        let ring = CheckpointRing::build(&positions)?;
        log::info!(
            "track {} has {} checkpoints over {:.1} units",
            self.name,
            ring.len(),
            ring.total_length()
        );
        Ok(ring)
    }
}
