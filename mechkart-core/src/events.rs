use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::racer::{
    lap_info::{LapNumber, Placement},
    RacerID,
};
use crate::scoring::Score;

// Everything the race core tells the outside world (UI, audio, networking);
// queued by the engine and drained by whoever embeds it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum RaceEvent {
    // Pre-race
    CountdownStarted {
        #[serde(with = "serde_millis")]
        duration: Duration,
    },
    RaceStarted, // racer input may be unlocked

    // During race
    LapCompleted {
        racer: RacerID,
        lap: LapNumber,
    },
    RacerFinished {
        racer: RacerID,
        placement: Placement,
        #[serde(with = "serde_millis")]
        finish_time: Duration, // since the race started
    },
    RacerEliminated {
        racer: RacerID,
    },
    RaceEnded,

    // After race
    PointsAwarded {
        racer: RacerID,
        placement: Placement,
        points: Score,
        total: Score,
    },
}
