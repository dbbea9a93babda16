use std::time::{Duration, Instant};

use mechkart_core::racer::lap_info::LapNumber;
use mechkart_core::scoring::ScoringRules;
use mechkart_core::Settings;

use crate::standings::EndRacePolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacePhase {
    // Racers have been put on the grid in reverse standings order and had
    // their progress wiped
    Loading,
    // Racers can see the track and each other, but have no control until the
    // countdown runs out
    Countdown { countdown_end_time: Instant },
    // Crossings count, positions update and the standings re-sort every tick
    Racing,
    // Standings are final and points have been handed out
    Finished,
}

impl RacePhase {
    pub fn name(&self) -> &'static str {
        match self {
            RacePhase::Loading => "loading",
            RacePhase::Countdown { .. } => "countdown",
            RacePhase::Racing => "racing",
            RacePhase::Finished => "finished",
        }
    }
}

// Everything a single race needs to know from the lobby configuration
#[derive(Clone, Copy, Debug)]
pub struct RaceRules {
    pub total_laps: LapNumber,
    pub countdown: Duration,
    pub stuck_timeout: Option<Duration>,
    pub grid_spacing: f64,
    pub scoring: ScoringRules,
    pub policy: EndRacePolicy,
}

impl From<&Settings> for RaceRules {
    fn from(settings: &Settings) -> Self {
        Self {
            total_laps: settings.number_laps,
            countdown: Duration::from_millis(settings.countdown_ms),
            stuck_timeout: match settings.stuck_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            grid_spacing: settings.grid_spacing,
            scoring: ScoringRules::from(settings),
            policy: EndRacePolicy::from(settings),
        }
    }
}

impl Default for RaceRules {
    fn default() -> Self {
        RaceRules::from(&Settings::default())
    }
}
