use std::time::{Duration, Instant};

use mechkart_core::events::RaceEvent;
use mechkart_core::racer::{lap_info::Placement, placement::placement_label, RacerID};
use mechkart_core::Settings;

use crate::racer::Racer;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, Default)]
pub struct EndRacePolicy {
    pub end_race_when_humans_finish: bool,
    pub cut_power_to_last_human: bool,
}

impl From<&Settings> for EndRacePolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            end_race_when_humans_finish: settings.end_race_when_humans_finish,
            cut_power_to_last_human: settings.cut_power_to_last_human,
        }
    }
}

// Partitions one race's roster into racers still driving (best first), racers
// who crossed the line (in finishing order) and racers who were destroyed
// (most recent first). Every racer is in exactly one of the three.
pub struct Standings {
    active: Vec<RacerID>,
    finished: Vec<RacerID>,
    eliminated: Vec<RacerID>,

    policy: EndRacePolicy,
    race_start_time: Option<Instant>,
    is_race_over: bool,

    events: Vec<RaceEvent>,
}

impl Standings {
    pub fn new(policy: EndRacePolicy) -> Standings {
        Standings {
            active: Vec::new(),
            finished: Vec::new(),
            eliminated: Vec::new(),
            policy,
            race_start_time: None,
            is_race_over: false,
            events: Vec::new(),
        }
    }

    pub fn start_clock(&mut self, now: Instant) {
        self.race_start_time = Some(now);
    }

    pub fn add_racer(&mut self, racer: RacerID) -> bool {
        if self.contains(racer) {
            log::error!("racer {} is already in the standings", racer);
            return false;
        }

        self.active.push(racer);
        true
    }

    pub fn contains(&self, racer: RacerID) -> bool {
        self.active.contains(&racer)
            || self.finished.contains(&racer)
            || self.eliminated.contains(&racer)
    }

    // Re-sort racers still driving by track position. Exact ties go to the
    // lower racer ID so the order never depends on the previous frame.
    pub fn tick(&mut self, racers: &[Racer]) {
        let track_position = |id: &RacerID| {
            racers
                .get(*id)
                .map(|racer| racer.lap_info.track_position)
                .unwrap_or(f64::NEG_INFINITY)
        };

        self.active.sort_by(|a, b| {
            track_position(b)
                .total_cmp(&track_position(a))
                .then(a.cmp(b))
        });
    }

    pub fn on_racer_finished_final_lap(
        &mut self,
        racer: RacerID,
        racers: &mut [Racer],
        now: Instant,
    ) {
        if self.finished.contains(&racer) {
            log::warn!("racer {} already finished", racer);
            return;
        }
        if !self.remove_active(racer) {
            log::error!("racer {} can't finish, it isn't racing", racer);
            return;
        }

        self.push_finished(racer, racers, now);
        self.check_should_end_race(racers, now);
    }

    // Destroyed racers (stuck AI, disconnects) rank below every finisher
    pub fn on_racer_destroyed(&mut self, racer: RacerID, racers: &mut [Racer], now: Instant) {
        if self.finished.contains(&racer) {
            log::error!("racer {} was destroyed after finishing", racer);
            return;
        }
        if self.eliminated.contains(&racer) {
            log::debug!("racer {} was already eliminated", racer);
            return;
        }
        if !self.remove_active(racer) {
            log::error!("racer {} can't be destroyed, it isn't racing", racer);
            return;
        }

        self.eliminated.insert(0, racer);
        self.events.push(RaceEvent::RacerEliminated { racer });
        if let Some(r) = racers.get(racer) {
            log::info!("{} was eliminated", r.name);
        }

        self.check_should_end_race(racers, now);
    }

    pub fn check_should_end_race(&mut self, racers: &mut [Racer], now: Instant) {
        if self.policy.end_race_when_humans_finish
            && !self.active.is_empty()
            && self.roster().any(|id| is_human(racers, id))
            && !self.active.iter().any(|&id| is_human(racers, id))
        {
            log::info!("all humans are done, finishing the remaining AI racers");
            for racer in std::mem::take(&mut self.active) {
                self.push_finished(racer, racers, now);
            }
        }

        match self.active.len() {
            0 => {
                if !self.is_race_over {
                    self.is_race_over = true;
                    log::info!("race over!");
                    self.events.push(RaceEvent::RaceEnded);
                }
            }
            1 => {
                let last = self.active[0];
                if is_human(racers, last) && !self.policy.cut_power_to_last_human {
                    return;
                }
                self.on_racer_finished_final_lap(last, racers, now);
            }
            _ => {}
        }
    }

    /// Live placement: finished racers outrank everyone still driving, who
    /// in turn outrank everyone eliminated.
    pub fn current_rank(&self, racer: RacerID) -> Option<Placement> {
        if let Some(index) = self.finished.iter().position(|&id| id == racer) {
            return Some(index + 1);
        }
        if let Some(index) = self.active.iter().position(|&id| id == racer) {
            return Some(self.finished.len() + index + 1);
        }
        self.eliminated
            .iter()
            .position(|&id| id == racer)
            .map(|index| self.finished.len() + self.active.len() + index + 1)
    }

    /// Finishers in finishing order, then the eliminated, most recent first.
    pub fn final_order(&self) -> Vec<RacerID> {
        self.finished
            .iter()
            .chain(self.eliminated.iter())
            .copied()
            .collect()
    }

    pub fn active(&self) -> &[RacerID] {
        &self.active
    }

    pub fn finished(&self) -> &[RacerID] {
        &self.finished
    }

    pub fn eliminated(&self) -> &[RacerID] {
        &self.eliminated
    }

    pub fn roster(&self) -> impl Iterator<Item = RacerID> + '_ {
        self.active
            .iter()
            .chain(self.finished.iter())
            .chain(self.eliminated.iter())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.finished.len() + self.eliminated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_race_over(&self) -> bool {
        self.is_race_over
    }

    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn remove_active(&mut self, racer: RacerID) -> bool {
        match self.active.iter().position(|&id| id == racer) {
            Some(index) => {
                self.active.remove(index);
                true
            }
            None => false,
        }
    }

    fn push_finished(&mut self, racer: RacerID, racers: &mut [Racer], now: Instant) {
        self.finished.push(racer);
        let placement = self.finished.len();
        let finish_time = self
            .race_start_time
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start));

        if let Some(r) = racers.get_mut(racer) {
            r.lap_info.race_finished = true;
            log::info!("{} finished {}", r.name, placement_label(placement));
        }

        self.events.push(RaceEvent::RacerFinished {
            racer,
            placement,
            finish_time,
        });
    }
}

fn is_human(racers: &[Racer], id: RacerID) -> bool {
    racers.get(id).map_or(false, Racer::is_human)
}
