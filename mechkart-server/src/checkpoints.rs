use glam::DVec3;
use mechkart_core::racer::lap_info::CheckpointID;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("a track needs at least 2 checkpoints, found {found}")]
    TooFewCheckpoints { found: usize },
    #[error("checkpoints {from} and {to} share the same position")]
    DegenerateSegment { from: CheckpointID, to: CheckpointID },
    #[error("cup {name} has no tracks")]
    EmptyCup { name: String },
    #[error("could not read track file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse track file")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Clone, Copy, Debug)]
pub struct Checkpoint {
    pub id: CheckpointID,
    pub position: DVec3,
    pub next: CheckpointID,
    pub prev: CheckpointID,
    pub distance_to_next: f64,
    pub distance_to_prev: f64,
}

// The track's progress graph: checkpoints linked in a circle, in driving order.
// The last checkpoint of the input is the finish line.
#[derive(Clone, Debug)]
pub struct CheckpointRing {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointRing {
    pub fn build(positions: &[DVec3]) -> Result<CheckpointRing, TrackError> {
        let count = positions.len();
        if count < 2 {
            return Err(TrackError::TooFewCheckpoints { found: count });
        }

        let mut checkpoints = Vec::with_capacity(count);
        for (id, &position) in positions.iter().enumerate() {
            let next = (id + 1) % count;
            let prev = (id + count - 1) % count;

            let distance_to_next = position.distance(positions[next]);
            let distance_to_prev = position.distance(positions[prev]);
            if distance_to_prev == 0.0 {
                return Err(TrackError::DegenerateSegment { from: prev, to: id });
            }

            checkpoints.push(Checkpoint {
                id,
                position,
                next,
                prev,
                distance_to_next,
                distance_to_prev,
            });
        }

        Ok(CheckpointRing { checkpoints })
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    // never true for a built ring
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn get(&self, id: CheckpointID) -> Option<&Checkpoint> {
        self.checkpoints.get(id)
    }

    pub fn first(&self) -> &Checkpoint {
        &self.checkpoints[0]
    }

    /// The lap-completion checkpoint.
    pub fn end(&self) -> &Checkpoint {
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    pub fn is_end(&self, id: CheckpointID) -> bool {
        id == self.end().id
    }

    pub fn next(&self, id: CheckpointID) -> Option<&Checkpoint> {
        self.get(id).and_then(|checkpoint| self.get(checkpoint.next))
    }

    pub fn prev(&self, id: CheckpointID) -> Option<&Checkpoint> {
        self.get(id).and_then(|checkpoint| self.get(checkpoint.prev))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub fn total_length(&self) -> f64 {
        self.checkpoints.iter().map(|c| c.distance_to_next).sum()
    }

    // Starting grid slots sit on the line from the finish toward the first
    // checkpoint, with slot 0 (the front) closest to the first checkpoint
    pub fn grid_slot(&self, slot: usize, spacing: f64) -> DVec3 {
        let first = self.first().position;
        let back = (self.end().position - first).normalize_or_zero();

        first + back * spacing * (slot + 1) as f64
    }
}
