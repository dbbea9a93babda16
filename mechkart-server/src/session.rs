use std::collections::HashMap;
use std::time::Instant;

use glam::DVec3;
use mechkart_core::events::RaceEvent;
use mechkart_core::racer::{
    lap_info::{CheckpointID, Placement},
    placement::{placement_label, Trophy},
    RacerID, RacerKind,
};
use mechkart_core::scoring::StandingEntry;
use mechkart_core::Settings;
use serde::{Deserialize, Serialize};

use crate::checkpoints::{CheckpointRing, TrackError};
use crate::cup::Cup;
use crate::game::{RaceController, RaceRules};
use crate::racer::Racer;
use crate::scoring::overall_standings;
use crate::track::TrackDefinition;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SeriesResult {
    pub cup: String,
    pub standings: Vec<StandingEntry>,
    // the local racer's overall rank in this running of the cup
    pub rank: Option<Placement>,
    pub best_placement: Option<Placement>,
    // earned by the best placement, not necessarily this one
    pub trophy: Trophy,
}

// Owns the roster and its scores for a whole series (one running of a cup),
// plus whichever race is currently loaded. Racer IDs are indices into the
// roster and never change.
pub struct Session {
    settings: Settings,
    cup: Cup,
    racers: Vec<Racer>,
    race: Option<RaceController>,
    // name of the cup track being raced, if the race came from the cup
    course: Option<String>,
    // set once the current race's result has been counted
    race_counted: bool,
    races_completed: usize,
    best_placements: HashMap<String, Placement>,
    // events survive the race that raised them until drained
    events: Vec<RaceEvent>,
}

impl Session {
    pub fn new(settings: Settings, cup: Cup) -> Session {
        if cup.is_empty() {
            log::warn!("cup {} has no tracks", cup.name);
        }

        Session {
            settings,
            cup,
            racers: Vec::new(),
            race: None,
            course: None,
            race_counted: false,
            races_completed: 0,
            best_placements: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Switch to another cup. Only allowed between series.
    pub fn select_cup(&mut self, cup: Cup) -> bool {
        if self.is_race_in_progress() || self.races_completed > 0 {
            log::error!("can't switch to cup {} in the middle of a series", cup.name);
            return false;
        }

        log::info!("selected cup {} ({} tracks)", cup.name, cup.len());
        self.cup = cup;
        true
    }

    pub fn join(&mut self, name: String, kind: RacerKind) -> RacerID {
        let id = self.racers.len();
        log::info!("{} joined as racer {}", name, id);
        self.racers.push(Racer::new(id, name, kind));
        id
    }

    /// Top up the roster with AI racers, if the lobby allows it.
    pub fn fill_with_ai(&mut self) {
        if !self.settings.spawn_ai {
            return;
        }

        let mut ai_count = self.racers.iter().filter(|r| !r.is_human()).count();
        while self.racers.len() < self.settings.number_racers {
            ai_count += 1;
            self.join(format!("AI RACER #{}", ai_count), RacerKind::Ai);
        }
    }

    // Race on a ring built by the embedder; still counts toward the cup
    pub fn begin_race(&mut self, ring: CheckpointRing, now: Instant) -> bool {
        let rules = RaceRules::from(&self.settings);
        self.start_race(ring, rules, None, now)
    }

    /// Load the cup's next track. Its lap count, if it has one, wins over
    /// the configured default.
    pub fn begin_next_race(&mut self, now: Instant) -> Result<bool, TrackError> {
        let track: TrackDefinition = match self.cup.track(self.races_completed) {
            Some(track) => track.clone(),
            None => {
                log::error!("cup {} has no more tracks", self.cup.name);
                return Ok(false);
            }
        };

        let ring = track.build_ring()?;
        let mut rules = RaceRules::from(&self.settings);
        if let Some(laps) = track.laps {
            rules.total_laps = laps.max(1);
        }

        Ok(self.start_race(ring, rules, Some(track.name), now))
    }

    /// Throw away the current race without scoring it.
    pub fn abandon_race(&mut self) {
        self.sync_race();
        if self.race.take().is_some() {
            log::info!("race abandoned");
        }
        self.course = None;
        self.race_counted = false;
    }

    pub fn on_checkpoint_crossed(&mut self, racer: RacerID, checkpoint: CheckpointID, now: Instant) {
        if let Some(race) = self.race.as_mut() {
            race.on_checkpoint_crossed(&mut self.racers, racer, checkpoint, now);
        }
        self.sync_race();
    }

    pub fn on_racer_destroyed(&mut self, racer: RacerID, now: Instant) {
        if let Some(race) = self.race.as_mut() {
            race.on_racer_destroyed(&mut self.racers, racer, now);
        }
        self.sync_race();
    }

    pub fn set_racer_position(&mut self, racer: RacerID, position: DVec3) {
        match self.racers.get_mut(racer) {
            Some(r) => r.position = position,
            None => log::error!("position update for unknown racer {}", racer),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(race) = self.race.as_mut() {
            race.tick(&mut self.racers, now);
        }
        self.sync_race();
    }

    pub fn current_rank(&self, racer: RacerID) -> Option<Placement> {
        self.race.as_ref()?.current_rank(racer)
    }

    pub fn track_position(&self, racer: RacerID) -> Option<f64> {
        self.racers.get(racer).map(|r| r.lap_info.track_position)
    }

    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        self.sync_race();
        std::mem::take(&mut self.events)
    }

    pub fn overall_standings(&self) -> Vec<StandingEntry> {
        overall_standings(&self.racers)
    }

    pub fn is_race_in_progress(&self) -> bool {
        self.race.as_ref().map_or(false, |race| !race.is_finished())
    }

    pub fn races_completed(&self) -> usize {
        self.races_completed
    }

    pub fn is_series_over(&self) -> bool {
        self.races_completed >= self.cup.len()
    }

    // Final scoreboard for the series and the cup's trophy for `local`.
    // Scores are wiped afterwards so the same roster can run a cup again.
    pub fn conclude_series(&mut self, local: RacerID) -> SeriesResult {
        self.sync_race();
        let standings = self.overall_standings();
        let rank = standings
            .iter()
            .find(|entry| entry.racer == local)
            .map(|entry| entry.rank);

        if let Some(rank) = rank {
            log::info!(
                "{} over after {} races, racer {} placed {} overall",
                self.cup.name,
                self.races_completed,
                local,
                placement_label(rank)
            );
            let best = self.best_placements.entry(self.cup.name.clone()).or_insert(rank);
            *best = (*best).min(rank);
        }
        let best_placement = self.best_placement(&self.cup.name);

        for racer in self.racers.iter_mut() {
            racer.reset_scores();
        }
        self.race = None;
        self.course = None;
        self.race_counted = false;
        self.races_completed = 0;

        SeriesResult {
            cup: self.cup.name.clone(),
            standings,
            rank,
            best_placement,
            trophy: best_placement.map_or(Trophy::None, Trophy::for_rank),
        }
    }

    /// Best overall placement reached in any concluded running of `cup`.
    pub fn best_placement(&self, cup: &str) -> Option<Placement> {
        self.best_placements.get(cup).copied()
    }

    pub fn cup(&self) -> &Cup {
        &self.cup
    }

    /// The cup track of the race currently loaded.
    pub fn course_name(&self) -> Option<&str> {
        self.course.as_deref()
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn racer(&self, racer: RacerID) -> Option<&Racer> {
        self.racers.get(racer)
    }

    pub fn race(&self) -> Option<&RaceController> {
        self.race.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn start_race(
        &mut self,
        ring: CheckpointRing,
        rules: RaceRules,
        course: Option<String>,
        now: Instant,
    ) -> bool {
        if self.is_race_in_progress() {
            log::error!("can't begin a race while another is in progress");
            return false;
        }
        if self.is_series_over() {
            log::error!("{} is over, conclude it before racing again", self.cup.name);
            return false;
        }
        if self.racers.is_empty() {
            log::error!("can't begin a race with nobody in it");
            return false;
        }

        // anything the old race raised must outlive it
        self.sync_race();

        let mut race = RaceController::new(ring, rules);
        race.load(&mut self.racers, now);
        race.start_countdown(now);

        self.race = Some(race);
        self.course = course;
        self.race_counted = false;
        self.sync_race();
        log::info!(
            "race {} of {} is counting down",
            self.races_completed + 1,
            self.cup.len()
        );
        true
    }

    // Pull the race's queued events into the session and count the race
    // toward the cup the first time it is seen finished
    fn sync_race(&mut self) {
        let race = match self.race.as_mut() {
            Some(race) => race,
            None => return,
        };
        self.events.extend(race.drain_events());

        if race.is_finished() && !self.race_counted {
            self.race_counted = true;
            self.races_completed += 1;
        }
    }
}
