use std::time::{Duration, Instant};

use glam::DVec3;
use mechkart_core::events::RaceEvent;
use mechkart_core::racer::{lap_info::CrossingOutcome, RacerID, RacerKind};

use super::{EndRacePolicy, Standings};
use crate::checkpoints::CheckpointRing;
use crate::racer::Racer;

const A: RacerID = 0;
const B: RacerID = 1;
const C: RacerID = 2;
const D: RacerID = 3;

fn get_racers(kinds: &[RacerKind]) -> Vec<Racer> {
    kinds
        .iter()
        .enumerate()
        .map(|(id, &kind)| Racer::new(id, format!("racer {}", id), kind))
        .collect()
}

fn get_all_ai(count: usize) -> Vec<Racer> {
    get_racers(&vec![RacerKind::Ai; count])
}

fn get_standings(racers: &[Racer], policy: EndRacePolicy) -> Standings {
    let mut standings = Standings::new(policy);
    for racer in racers {
        assert!(standings.add_racer(racer.id));
    }
    standings
}

fn get_square_ring() -> CheckpointRing {
    CheckpointRing::build(&[
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(10.0, 0.0, 0.0),
        DVec3::new(10.0, 0.0, 10.0),
        DVec3::new(0.0, 0.0, 10.0),
    ])
    .unwrap()
}

fn count_race_ended(events: &[RaceEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, RaceEvent::RaceEnded))
        .count()
}

fn assert_partitioned(standings: &Standings, roster_size: usize) {
    let mut seen: Vec<RacerID> = standings.roster().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..roster_size).collect::<Vec<_>>());
}

#[test]
fn test_duplicate_add_is_ignored() {
    let racers = get_all_ai(2);
    assert!(Standings::new(EndRacePolicy::default()).is_empty());
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    assert!(!standings.add_racer(A));
    assert_eq!(standings.active(), &[A, B]);
    assert_eq!(standings.len(), 2);
    assert!(!standings.is_empty());
}

#[test]
fn test_tick_sorts_by_track_position() {
    let mut racers = get_all_ai(4);
    racers[A].lap_info.track_position = 1.5;
    racers[B].lap_info.track_position = 7.25;
    racers[C].lap_info.track_position = 3.0;
    racers[D].lap_info.track_position = -0.1;
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.tick(&racers);

    assert_eq!(standings.active(), &[B, C, A, D]);
    assert_eq!(standings.current_rank(B), Some(1));
    assert_eq!(standings.current_rank(D), Some(4));
}

#[test]
fn test_exact_ties_break_by_racer_id() {
    let mut racers = get_all_ai(4);
    for racer in racers.iter_mut() {
        racer.lap_info.track_position = 2.0;
    }
    racers[C].lap_info.track_position = 2.5;

    let mut standings = Standings::new(EndRacePolicy::default());
    for id in [D, B, A, C] {
        standings.add_racer(id);
    }

    standings.tick(&racers);
    assert_eq!(standings.active(), &[C, A, B, D]);

    // sorting again from a different order gives the same answer
    standings.tick(&racers);
    assert_eq!(standings.active(), &[C, A, B, D]);
}

#[test]
fn test_first_finisher_of_four() {
    let ring = get_square_ring();
    let now = Instant::now();
    let mut racers = get_all_ai(4);
    for racer in racers.iter_mut() {
        racer.reset_for_race(&ring, ring.grid_slot(racer.id, 1.0), now);
    }
    let mut standings = get_standings(&racers, EndRacePolicy::default());
    standings.start_clock(now);

    // A drives three clean laps while everyone else dawdles
    let mut finished_at = None;
    for crossing in 0..12 {
        let checkpoint = racers[A].lap_info.next_checkpoint;
        let outcome = racers[A].on_checkpoint_crossed(&ring, checkpoint, 3, now);
        if outcome == CrossingOutcome::FinishedFinalLap {
            finished_at = Some(crossing);
            standings.on_racer_finished_final_lap(A, &mut racers, now + Duration::from_secs(90));
        }
    }
    assert_eq!(finished_at, Some(11));
    assert_eq!(racers[A].lap_info.laps_completed, 3);
    assert_eq!(standings.finished(), &[A]);
    assert!(!standings.active().contains(&A));
    assert_eq!(
        standings.drain_events(),
        vec![RaceEvent::RacerFinished {
            racer: A,
            placement: 1,
            finish_time: Duration::from_secs(90),
        }]
    );

    racers[B].lap_info.track_position = 0.5;
    racers[C].lap_info.track_position = 2.5;
    racers[D].lap_info.track_position = 1.5;
    standings.tick(&racers);
    assert_eq!(standings.active(), &[C, D, B]);

    // finished racers outrank everyone still driving
    assert_eq!(standings.current_rank(A), Some(1));
    assert_eq!(standings.current_rank(C), Some(2));
    assert_eq!(standings.current_rank(B), Some(4));
    assert!(!standings.is_race_over());
    assert_partitioned(&standings, 4);
}

#[test]
fn test_elimination_order() {
    let mut racers = get_all_ai(4);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.on_racer_destroyed(D, &mut racers, now);
    standings.on_racer_destroyed(C, &mut racers, now);

    assert_eq!(standings.eliminated(), &[C, D]);
    assert_eq!(standings.active(), &[A, B]);
    assert!(!standings.is_race_over());
    assert_eq!(standings.current_rank(C), Some(3));
    assert_eq!(standings.current_rank(D), Some(4));

    // A finishing leaves B alone; an AI on its own gets finished for it
    standings.on_racer_finished_final_lap(A, &mut racers, now);

    assert_eq!(standings.finished(), &[A, B]);
    assert_eq!(standings.final_order(), vec![A, B, C, D]);
    assert!(racers[B].lap_info.race_finished);
    assert!(standings.is_race_over());
    assert_partitioned(&standings, 4);
}

#[test]
fn test_finishing_twice_does_not_duplicate() {
    let mut racers = get_all_ai(3);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.on_racer_finished_final_lap(B, &mut racers, now);
    standings.on_racer_finished_final_lap(B, &mut racers, now);

    assert_eq!(standings.finished(), &[B]);
    assert_eq!(standings.len(), 3);
    assert!(racers[B].lap_info.race_finished);
}

#[test]
fn test_destroying_a_finisher_is_a_noop() {
    let mut racers = get_all_ai(3);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.on_racer_finished_final_lap(C, &mut racers, now);
    standings.on_racer_destroyed(C, &mut racers, now);

    assert_eq!(standings.finished(), &[C]);
    assert!(standings.eliminated().is_empty());
    assert_partitioned(&standings, 3);
}

#[test]
fn test_repeated_destroy_and_unknown_racers() {
    let mut racers = get_all_ai(3);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.on_racer_destroyed(A, &mut racers, now);
    standings.on_racer_destroyed(A, &mut racers, now);
    standings.on_racer_destroyed(42, &mut racers, now);
    standings.on_racer_finished_final_lap(42, &mut racers, now);
    // can't come back from elimination
    standings.on_racer_finished_final_lap(A, &mut racers, now);

    assert_eq!(standings.eliminated(), &[A]);
    assert_eq!(standings.active(), &[B, C]);
    assert!(standings.finished().is_empty());
    assert_eq!(standings.current_rank(42), None);
}

#[test]
fn test_race_ends_exactly_once() {
    let mut racers = get_all_ai(2);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.on_racer_destroyed(A, &mut racers, now);
    assert!(standings.is_race_over());

    standings.check_should_end_race(&mut racers, now);
    standings.check_should_end_race(&mut racers, now);
    standings.on_racer_finished_final_lap(B, &mut racers, now);

    let events = standings.drain_events();
    assert_eq!(count_race_ended(&events), 1);
    assert_eq!(standings.final_order(), vec![B, A]);
}

#[test]
fn test_last_human_keeps_racing() {
    let mut racers = get_racers(&[RacerKind::Ai, RacerKind::Human, RacerKind::Ai]);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    standings.on_racer_finished_final_lap(A, &mut racers, now);
    standings.on_racer_finished_final_lap(C, &mut racers, now);

    assert_eq!(standings.active(), &[B]);
    assert!(!standings.is_race_over());
    assert_eq!(standings.current_rank(B), Some(3));

    standings.on_racer_finished_final_lap(B, &mut racers, now);
    assert!(standings.is_race_over());
    assert_eq!(standings.final_order(), vec![A, C, B]);
}

#[test]
fn test_cut_power_to_last_human() {
    let mut racers = get_racers(&[RacerKind::Ai, RacerKind::Human, RacerKind::Ai]);
    let now = Instant::now();
    let policy = EndRacePolicy {
        cut_power_to_last_human: true,
        ..Default::default()
    };
    let mut standings = get_standings(&racers, policy);

    standings.on_racer_finished_final_lap(C, &mut racers, now);
    standings.on_racer_destroyed(A, &mut racers, now);

    assert_eq!(standings.finished(), &[C, B]);
    assert_eq!(standings.eliminated(), &[A]);
    assert!(racers[B].lap_info.race_finished);
    assert_eq!(count_race_ended(&standings.drain_events()), 1);
}

#[test]
fn test_end_race_once_humans_finish() {
    let mut racers = get_racers(&[
        RacerKind::Ai,
        RacerKind::Human,
        RacerKind::Ai,
        RacerKind::Ai,
    ]);
    let now = Instant::now();
    let policy = EndRacePolicy {
        end_race_when_humans_finish: true,
        ..Default::default()
    };
    let mut standings = get_standings(&racers, policy);
    racers[A].lap_info.track_position = 3.0;
    racers[C].lap_info.track_position = 1.0;
    racers[D].lap_info.track_position = 5.0;
    standings.tick(&racers);

    standings.on_racer_finished_final_lap(B, &mut racers, now);

    // the AI racers are finished in their current running order
    assert_eq!(standings.finished(), &[B, D, A, C]);
    assert!(standings.active().is_empty());
    assert!(standings.is_race_over());
    assert!(racers.iter().all(|r| r.lap_info.race_finished));

    let events = standings.drain_events();
    assert_eq!(count_race_ended(&events), 1);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, RaceEvent::RacerFinished { .. }))
            .count(),
        4
    );
}

#[test]
fn test_human_finish_policy_needs_a_human() {
    let mut racers = get_all_ai(3);
    let now = Instant::now();
    let policy = EndRacePolicy {
        end_race_when_humans_finish: true,
        ..Default::default()
    };
    let mut standings = get_standings(&racers, policy);

    standings.on_racer_finished_final_lap(A, &mut racers, now);

    assert_eq!(standings.finished(), &[A]);
    assert_eq!(standings.active().len(), 2);
    assert!(!standings.is_race_over());
}

#[test]
fn test_eliminated_human_triggers_human_finish_policy() {
    let mut racers = get_racers(&[RacerKind::Human, RacerKind::Ai, RacerKind::Ai]);
    let now = Instant::now();
    let policy = EndRacePolicy {
        end_race_when_humans_finish: true,
        ..Default::default()
    };
    let mut standings = get_standings(&racers, policy);

    // a disconnected human still counts as "done"
    standings.on_racer_destroyed(A, &mut racers, now);

    assert_eq!(standings.finished(), &[B, C]);
    assert_eq!(standings.final_order(), vec![B, C, A]);
    assert!(standings.is_race_over());
}

#[test]
fn test_partition_holds_through_a_messy_race() {
    let mut racers = get_racers(&[
        RacerKind::Human,
        RacerKind::Ai,
        RacerKind::Ai,
        RacerKind::Ai,
        RacerKind::Ai,
        RacerKind::Ai,
    ]);
    let now = Instant::now();
    let mut standings = get_standings(&racers, EndRacePolicy::default());

    let script: [(bool, RacerID); 8] = [
        (true, 3),
        (false, 5),
        (false, 5),
        (true, 3),
        (false, 3),
        (true, 1),
        (false, 2),
        (true, 0),
    ];
    for (finish, id) in script {
        if finish {
            standings.on_racer_finished_final_lap(id, &mut racers, now);
        } else {
            standings.on_racer_destroyed(id, &mut racers, now);
        }
        standings.tick(&racers);
        assert_partitioned(&standings, 6);
    }

    // racer 4 was the last AI standing after the human finished
    assert_eq!(standings.finished(), &[3, 1, 0, 4]);
    assert_eq!(standings.eliminated(), &[2, 5]);
    assert!(standings.is_race_over());
}
