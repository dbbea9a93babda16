use std::time::Instant;

use glam::DVec3;
use mechkart_core::racer::lap_info::{CheckpointID, CrossingOutcome, LapInformation, LapNumber};

use crate::checkpoints::CheckpointRing;
use crate::racer::Racer;

impl Racer {
    // wipe per-race progress; scores are left alone
    pub fn reset_for_race(&mut self, ring: &CheckpointRing, grid_position: DVec3, now: Instant) {
        self.lap_info = LapInformation::new(ring.first().id);
        self.position = grid_position;
        self.last_progress_time = Some(now);
        self.update_track_position(ring);
    }

    pub fn on_checkpoint_crossed(
        &mut self,
        ring: &CheckpointRing,
        checkpoint: CheckpointID,
        total_laps: LapNumber,
        now: Instant,
    ) -> CrossingOutcome {
        // crossings out of order (driving backwards, trigger noise) are dropped
        if checkpoint != self.lap_info.next_checkpoint {
            return CrossingOutcome::Ignored;
        }

        let crossed = match ring.get(checkpoint) {
            Some(crossed) => *crossed,
            None => {
                log::error!(
                    "racer {} expects checkpoint {} which isn't on this track",
                    self.name,
                    checkpoint
                );
                return CrossingOutcome::Ignored;
            }
        };

        self.lap_info.checkpoints_hit += 1;
        self.last_progress_time = Some(now);
        log::debug!(
            "racer {} has hit checkpoint {}",
            self.name,
            self.lap_info.checkpoints_hit
        );

        let mut outcome = CrossingOutcome::Advanced;
        if ring.is_end(checkpoint) && !self.lap_info.race_finished {
            self.lap_info.laps_completed += 1;
            log::debug!(
                "racer {} has completed lap {}",
                self.name,
                self.lap_info.laps_completed
            );

            outcome = if self.lap_info.laps_completed >= total_laps {
                self.lap_info.race_finished = true;
                CrossingOutcome::FinishedFinalLap
            } else {
                CrossingOutcome::LapCompleted(self.lap_info.laps_completed)
            };
        }

        self.lap_info.next_checkpoint = crossed.next;
        outcome
    }

    // Ratio of how far the racer has come from the previous checkpoint toward
    // the next one; intentionally unclamped
    pub fn update_track_position(&mut self, ring: &CheckpointRing) {
        if self.lap_info.race_finished {
            return;
        }

        if let Some(next) = ring.get(self.lap_info.next_checkpoint) {
            let ratio_to_next = 1.0 - self.position.distance(next.position) / next.distance_to_prev;
            self.lap_info.track_position = self.lap_info.checkpoints_hit as f64 + ratio_to_next;
        }
    }
}
