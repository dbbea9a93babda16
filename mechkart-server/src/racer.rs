use std::time::Instant;

use glam::DVec3;
use mechkart_core::racer::{lap_info::LapInformation, RacerID, RacerKind};
use mechkart_core::scoring::Score;

pub struct Racer {
    pub id: RacerID,
    pub name: String,
    pub kind: RacerKind,

    // last position reported by the physics layer
    pub position: DVec3,
    pub lap_info: LapInformation,
    // time of the last accepted checkpoint crossing, for the stuck watchdog
    pub last_progress_time: Option<Instant>,

    // persist across every race of a series
    pub score: Score,
    pub last_score: Score,
}

impl Racer {
    pub fn new(id: RacerID, name: String, kind: RacerKind) -> Racer {
        Racer {
            id,
            name,
            kind,
            position: DVec3::ZERO,
            lap_info: LapInformation::new(0),
            last_progress_time: None,
            score: 0,
            last_score: 0,
        }
    }

    pub fn is_human(&self) -> bool {
        self.kind.is_human()
    }

    pub fn reset_scores(&mut self) {
        self.score = 0;
        self.last_score = 0;
    }
}
