use std::collections::HashMap;
use std::time::{Duration, Instant};

use glam::DVec3;
use mechkart_core::racer::RacerID;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::RacePhase;
use crate::session::Session;

// Stand-in for physics and player input when running headless: every racer
// still driving, humans included, heads straight for its next checkpoint at
// its own pace and "crosses" it on arrival.
pub struct HeadlessDriver {
    rng: StdRng,
    // units per second
    base_pace: f64,
    paces: HashMap<RacerID, f64>,
    stalled: Vec<RacerID>,
}

impl HeadlessDriver {
    const PACE_VARIATION: f64 = 0.2;

    pub fn new(seed: u64, base_pace: f64) -> HeadlessDriver {
        HeadlessDriver {
            rng: StdRng::seed_from_u64(seed),
            base_pace,
            paces: HashMap::new(),
            stalled: Vec::new(),
        }
    }

    /// Stop moving a racer entirely, as if its kart got wedged somewhere.
    pub fn stall(&mut self, racer: RacerID) {
        if !self.stalled.contains(&racer) {
            self.stalled.push(racer);
        }
    }

    pub fn pace(&mut self, racer: RacerID) -> f64 {
        let base = self.base_pace;
        let rng = &mut self.rng;
        *self.paces.entry(racer).or_insert_with(|| {
            base * rng.gen_range(1.0 - Self::PACE_VARIATION..=1.0 + Self::PACE_VARIATION)
        })
    }

    // Move everyone for one step of `dt`, feeding crossings and positions to
    // the session. Call before Session::tick for the same step.
    pub fn drive(&mut self, session: &mut Session, dt: Duration, now: Instant) {
        let (anchors, driving) = match session.race() {
            Some(race) if race.phase() == RacePhase::Racing => (
                race.ring().iter().map(|c| c.position).collect::<Vec<DVec3>>(),
                race.standings().active().to_vec(),
            ),
            _ => return,
        };

        for id in driving {
            if self.stalled.contains(&id) {
                continue;
            }

            let mut budget = self.pace(id) * dt.as_secs_f64();
            let mut position = match session.racer(id) {
                Some(racer) => racer.position,
                None => continue,
            };

            // a very fast step can pass several checkpoints
            for _ in 0..anchors.len() {
                let (next, finished) = match session.racer(id) {
                    Some(racer) => (racer.lap_info.next_checkpoint, racer.lap_info.race_finished),
                    None => break,
                };
                let target = match anchors.get(next) {
                    Some(&target) if !finished => target,
                    _ => break,
                };

                let distance = position.distance(target);
                if distance > budget {
                    position += (target - position).normalize_or_zero() * budget;
                    break;
                }

                position = target;
                budget -= distance;
                session.on_checkpoint_crossed(id, next, now);
            }

            session.set_racer_position(id, position);
        }
    }
}
