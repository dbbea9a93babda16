use std::time::Instant;

use mechkart_core::events::RaceEvent;
use mechkart_core::racer::{
    lap_info::{CheckpointID, CrossingOutcome, Placement},
    RacerID,
};

use crate::checkpoints::CheckpointRing;
use crate::racer::Racer;
use crate::scoring::{award_points, overall_standings};
use crate::standings::Standings;

pub use self::phase::*;

mod phase;

// Runs one race from grid to scoreboard. The roster itself belongs to the
// session and is lent to every call.
pub struct RaceController {
    phase: RacePhase,
    ring: CheckpointRing,
    rules: RaceRules,
    standings: Standings,
    grid: Vec<RacerID>,
    events: Vec<RaceEvent>,
}

impl RaceController {
    pub fn new(ring: CheckpointRing, rules: RaceRules) -> RaceController {
        RaceController {
            phase: RacePhase::Loading,
            ring,
            standings: Standings::new(rules.policy),
            rules,
            grid: Vec::new(),
            events: Vec::new(),
        }
    }

    // Put everyone on the grid: the series leader starts at the back, the
    // racer in last place gets the front slot
    pub fn load(&mut self, racers: &mut [Racer], now: Instant) {
        self.grid = overall_standings(racers)
            .iter()
            .rev()
            .map(|entry| entry.racer)
            .collect();

        for (slot, &id) in self.grid.iter().enumerate() {
            if let Some(racer) = racers.get_mut(id) {
                racer.reset_for_race(&self.ring, self.ring.grid_slot(slot, self.rules.grid_spacing), now);
            }
            self.standings.add_racer(id);
        }
        self.standings.tick(racers);

        self.phase = RacePhase::Loading;
        log::info!(
            "loaded {} racers for a {} lap race",
            self.grid.len(),
            self.rules.total_laps
        );
    }

    pub fn start_countdown(&mut self, now: Instant) {
        if self.phase != RacePhase::Loading {
            log::warn!("can't start a countdown while {}", self.phase.name());
            return;
        }

        self.phase = RacePhase::Countdown {
            countdown_end_time: now + self.rules.countdown,
        };
        self.events.push(RaceEvent::CountdownStarted {
            duration: self.rules.countdown,
        });
    }

    // One simulation step. Crossings for this step must already have been
    // applied so the re-sort sees them.
    pub fn tick(&mut self, racers: &mut [Racer], now: Instant) {
        match self.phase {
            RacePhase::Loading | RacePhase::Finished => {}
            RacePhase::Countdown { countdown_end_time } => {
                if now >= countdown_end_time {
                    self.start_racing(racers, now);
                }
            }
            RacePhase::Racing => {
                for &id in self.standings.active() {
                    if let Some(racer) = racers.get_mut(id) {
                        racer.update_track_position(&self.ring);
                    }
                }

                self.destroy_stuck_racers(racers, now);
                self.standings.tick(racers);
                self.collect_standings_events(racers);
            }
        }
    }

    pub fn on_checkpoint_crossed(
        &mut self,
        racers: &mut [Racer],
        racer: RacerID,
        checkpoint: CheckpointID,
        now: Instant,
    ) {
        if self.phase != RacePhase::Racing {
            log::debug!(
                "ignoring crossing by racer {} while {}",
                racer,
                self.phase.name()
            );
            return;
        }
        if !self.standings.active().contains(&racer) {
            return;
        }

        let outcome = match racers.get_mut(racer) {
            Some(r) => r.on_checkpoint_crossed(&self.ring, checkpoint, self.rules.total_laps, now),
            None => {
                log::error!("crossing from unknown racer {}", racer);
                return;
            }
        };

        match outcome {
            CrossingOutcome::Ignored | CrossingOutcome::Advanced => {}
            CrossingOutcome::LapCompleted(lap) => {
                self.events.push(RaceEvent::LapCompleted { racer, lap });
            }
            CrossingOutcome::FinishedFinalLap => {
                self.events.push(RaceEvent::LapCompleted {
                    racer,
                    lap: self.rules.total_laps,
                });
                self.standings.on_racer_finished_final_lap(racer, racers, now);
                self.collect_standings_events(racers);
            }
        }
    }

    pub fn on_racer_destroyed(&mut self, racers: &mut [Racer], racer: RacerID, now: Instant) {
        match self.phase {
            RacePhase::Countdown { .. } | RacePhase::Racing => {
                self.standings.on_racer_destroyed(racer, racers, now);
                self.collect_standings_events(racers);
            }
            RacePhase::Loading | RacePhase::Finished => {
                log::debug!(
                    "ignoring destruction of racer {} while {}",
                    racer,
                    self.phase.name()
                );
            }
        }
    }

    pub fn current_rank(&self, racer: RacerID) -> Option<Placement> {
        self.standings.current_rank(racer)
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    pub fn standings(&self) -> &Standings {
        &self.standings
    }

    pub fn ring(&self) -> &CheckpointRing {
        &self.ring
    }

    pub fn rules(&self) -> &RaceRules {
        &self.rules
    }

    /// Front of the grid first.
    pub fn grid(&self) -> &[RacerID] {
        &self.grid
    }

    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn start_racing(&mut self, racers: &mut [Racer], now: Instant) {
        self.phase = RacePhase::Racing;
        self.standings.start_clock(now);

        // time spent on the grid doesn't count toward being stuck
        for &id in &self.grid {
            if let Some(racer) = racers.get_mut(id) {
                racer.last_progress_time = Some(now);
            }
        }

        self.events.push(RaceEvent::RaceStarted);
        log::info!("race started");
    }

    fn destroy_stuck_racers(&mut self, racers: &mut [Racer], now: Instant) {
        let timeout = match self.rules.stuck_timeout {
            Some(timeout) => timeout,
            None => return,
        };

        let stuck: Vec<RacerID> = self
            .standings
            .active()
            .iter()
            .copied()
            .filter(|&id| {
                racers.get(id).map_or(false, |racer| {
                    !racer.is_human()
                        && racer
                            .last_progress_time
                            .map_or(false, |last| now.saturating_duration_since(last) >= timeout)
                })
            })
            .collect();

        // worst first, so the eliminated list ends up in track order; a racer
        // can also be flagged home once everyone behind it is gone
        for &id in stuck.iter().rev() {
            if !self.standings.active().contains(&id) {
                continue;
            }
            log::info!("racer {} is stuck, removing it from the race", id);
            self.standings.on_racer_destroyed(id, racers, now);
        }
    }

    fn collect_standings_events(&mut self, racers: &mut [Racer]) {
        let events = self.standings.drain_events();
        let race_ended = events.contains(&RaceEvent::RaceEnded);
        self.events.extend(events);

        if race_ended {
            self.finish_race(racers);
        }
    }

    fn finish_race(&mut self, racers: &mut [Racer]) {
        if self.phase == RacePhase::Finished {
            return;
        }
        self.phase = RacePhase::Finished;

        let final_order = self.standings.final_order();
        let awards = award_points(racers, &final_order, &self.rules.scoring);
        self.events.extend(awards);
        log::info!("race finished, {} racers scored", final_order.len());
    }
}
