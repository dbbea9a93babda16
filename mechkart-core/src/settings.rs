use config::{Config, ConfigError, Environment, File};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::racer::lap_info::LapNumber;
use crate::scoring::{Score, ScoringCurve};

// Same bounds as the lobby sliders
const MIN_RACERS: usize = 2;
const MAX_RACERS: usize = 99;
const MIN_RACES_IN_SERIES: usize = 1;
const MAX_RACES_IN_SERIES: usize = 64;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    pub number_laps: LapNumber,
    pub number_racers: usize,
    // length of the built-in cup, or how often a lone track file is raced
    pub races_in_series: usize,
    // fill empty roster slots with AI racers when a series starts
    pub spawn_ai: bool,

    pub scoring_curve: ScoringCurve,
    pub first_place_bonus: Score,
    pub second_place_bonus: Score,

    // finish everyone still driving once only AI racers are left
    pub end_race_when_humans_finish: bool,
    // force-finish a lone human instead of letting them drive to the line
    pub cut_power_to_last_human: bool,

    pub countdown_ms: u64,
    pub server_tick_ms: u64,
    // AI racers without an accepted crossing for this long get destroyed; 0 disables
    pub stuck_timeout_ms: u64,
    pub grid_spacing: f64,
    // a cup file wins over a single track file; with neither, the built-in
    // oval cup is raced
    pub cup_file: String,
    pub track_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            number_laps: 3,
            number_racers: 8,
            races_in_series: 4,
            spawn_ai: true,
            scoring_curve: ScoringCurve::AscendingFromLast,
            first_place_bonus: 3,
            second_place_bonus: 1,
            end_race_when_humans_finish: false,
            cut_power_to_last_human: false,
            countdown_ms: 3000,
            server_tick_ms: 30,
            stuck_timeout_ms: 20_000,
            grid_spacing: 4.0,
            cup_file: String::new(),
            track_file: String::new(),
        }
    }
}

impl Settings {
    /// Defaults, overridden by `file` (if it exists), overridden by
    /// `MECHKART_*` environment variables.
    pub fn load(file: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("MECHKART"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings.clamped())
    }

    pub fn clamped(mut self) -> Settings {
        let racers = self.number_racers.clamp(MIN_RACERS, MAX_RACERS);
        if racers != self.number_racers {
            log::warn!(
                "number_racers {} out of range, using {}",
                self.number_racers,
                racers
            );
            self.number_racers = racers;
        }

        let races = self
            .races_in_series
            .clamp(MIN_RACES_IN_SERIES, MAX_RACES_IN_SERIES);
        if races != self.races_in_series {
            log::warn!(
                "races_in_series {} out of range, using {}",
                self.races_in_series,
                races
            );
            self.races_in_series = races;
        }

        if self.number_laps == 0 {
            log::warn!("number_laps must be at least 1");
            self.number_laps = 1;
        }

        self
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings =
        Settings::load("config.yaml").expect("failed to read config file");
}
