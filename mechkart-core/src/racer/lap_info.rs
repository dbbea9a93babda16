use serde::{Deserialize, Serialize};

pub type LapNumber = u8;
pub type CheckpointID = usize;
pub type Placement = usize;

// Everything the progress tracker knows about one racer during one race; reset
// whenever a new race is loaded
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct LapInformation {
    pub laps_completed: LapNumber,
    // monotonic within a race, even across laps
    pub checkpoints_hit: u32,
    pub next_checkpoint: CheckpointID,
    // one-way latch
    pub race_finished: bool,
    // integer part = checkpoints hit, fraction = interpolated progress toward
    // next_checkpoint; may leave [0, 1) slightly when a trigger fires late
    pub track_position: f64,
}

impl LapInformation {
    pub fn new(first_checkpoint: CheckpointID) -> Self {
        LapInformation {
            laps_completed: 0,
            checkpoints_hit: 0,
            next_checkpoint: first_checkpoint,
            race_finished: false,
            track_position: 0.0,
        }
    }
}

// What a single checkpoint crossing did to a racer's progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrossingOutcome {
    // wrong checkpoint; silently dropped
    Ignored,
    Advanced,
    LapCompleted(LapNumber),
    FinishedFinalLap,
}
