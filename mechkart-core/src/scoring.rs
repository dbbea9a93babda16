use serde::{Deserialize, Serialize};

use crate::racer::{lap_info::Placement, RacerID, RacerKind};
use crate::Settings;

pub type Score = u32;

/// How a finishing placement is turned into series points.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringCurve {
    // first place nets a fixed ceiling of ~125 regardless of field size
    #[serde(rename = "125Max")]
    DescendingMax,
    // last place nets exactly 1 and the spread grows with the field
    #[serde(rename = "1Min")]
    AscendingFromLast,
}

#[derive(Clone, Copy, Debug)]
pub struct ScoringRules {
    pub curve: ScoringCurve,
    pub first_place_bonus: Score,
    pub second_place_bonus: Score,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            curve: ScoringCurve::AscendingFromLast,
            first_place_bonus: 3,
            second_place_bonus: 1,
        }
    }
}

impl From<&Settings> for ScoringRules {
    fn from(settings: &Settings) -> Self {
        Self {
            curve: settings.scoring_curve,
            first_place_bonus: settings.first_place_bonus,
            second_place_bonus: settings.second_place_bonus,
        }
    }
}

impl ScoringRules {
    /// Points earned for finishing at `placement` (1-based) in a field of
    /// `racer_count`. Never less than 1 for a valid placement.
    pub fn points_for_placement(&self, placement: Placement, racer_count: usize) -> Score {
        let p = placement as i64;
        let base = match self.curve {
            ScoringCurve::DescendingMax => (126 - self.first_place_bonus as i64) - p,
            ScoringCurve::AscendingFromLast => (racer_count as i64 - p) + 1,
        };

        let bonus = match placement {
            1 => self.first_place_bonus as i64,
            2 => self.second_place_bonus as i64,
            _ => 0,
        };

        (base + bonus).max(1) as Score
    }
}

/// One row of the overall series scoreboard.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StandingEntry {
    pub racer: RacerID,
    pub name: String,
    pub kind: RacerKind,
    pub rank: Placement,
    pub score: Score,
    // rank and score before the most recent points award
    pub previous_rank: Placement,
    pub last_score: Score,
}

impl StandingEntry {
    pub fn points_gained(&self) -> Score {
        self.score.saturating_sub(self.last_score)
    }
}
