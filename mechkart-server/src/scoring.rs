use mechkart_core::events::RaceEvent;
use mechkart_core::racer::{lap_info::Placement, RacerID};
use mechkart_core::scoring::{Score, ScoringRules, StandingEntry};

use crate::racer::Racer;

// Hand out points for one race. `final_order` is finishers then eliminated;
// everyone's last_score is snapshotted first so non-placers show no gain.
pub fn award_points(
    racers: &mut [Racer],
    final_order: &[RacerID],
    rules: &ScoringRules,
) -> Vec<RaceEvent> {
    for racer in racers.iter_mut() {
        racer.last_score = racer.score;
    }

    let racer_count = final_order.len();
    final_order
        .iter()
        .enumerate()
        .filter_map(|(index, &id)| {
            let racer = racers.get_mut(id)?;
            let placement = index + 1;
            let points = rules.points_for_placement(placement, racer_count);
            racer.score += points;
            log::debug!(
                "{} placed {} for {} points ({} total)",
                racer.name,
                placement,
                points,
                racer.score
            );

            Some(RaceEvent::PointsAwarded {
                racer: id,
                placement,
                points,
                total: racer.score,
            })
        })
        .collect()
}

fn score_of(racers: &[Racer], id: RacerID) -> Score {
    racers.get(id).map_or(0, |racer| racer.score)
}

fn last_score_of(racers: &[Racer], id: RacerID) -> Score {
    racers.get(id).map_or(0, |racer| racer.last_score)
}

// Both sorts must stay stable: shared positions depend on tied racers keeping
// their encounter order
pub fn sort_racer_scores(order: &mut [RacerID], racers: &[Racer]) {
    order.sort_by(|a, b| score_of(racers, *b).cmp(&score_of(racers, *a)));
}

pub fn sort_racer_previous_scores(order: &mut [RacerID], racers: &[Racer]) {
    order.sort_by(|a, b| last_score_of(racers, *b).cmp(&last_score_of(racers, *a)));
}

// Walk back over everyone tied with sorted[index]; the rank is one past the
// last racer with a different score
fn shared_position(index: usize, sorted: &[RacerID], score: impl Fn(RacerID) -> Score) -> Placement {
    let target = score(sorted[index]);
    let mut first = index;
    while first > 0 && score(sorted[first - 1]) == target {
        first -= 1;
    }
    first + 1
}

/// Rank of `sorted[index]` by current score, where `sorted` came from
/// [`sort_racer_scores`]. Ties share the best rank among them.
pub fn current_shared_position(index: usize, sorted: &[RacerID], racers: &[Racer]) -> Placement {
    shared_position(index, sorted, |id| score_of(racers, id))
}

/// Same as [`current_shared_position`] but keyed on the score before the
/// latest award; `sorted` must come from [`sort_racer_previous_scores`].
pub fn previous_shared_position(index: usize, sorted: &[RacerID], racers: &[Racer]) -> Placement {
    shared_position(index, sorted, |id| last_score_of(racers, id))
}

pub fn overall_standings(racers: &[Racer]) -> Vec<StandingEntry> {
    let mut previous: Vec<RacerID> = racers.iter().map(|racer| racer.id).collect();
    sort_racer_previous_scores(&mut previous, racers);

    // starting from the previous standings keeps long-standing ties in place
    let mut current = previous.clone();
    sort_racer_scores(&mut current, racers);

    current
        .iter()
        .enumerate()
        .filter_map(|(index, &id)| {
            let racer = racers.get(id)?;
            let previous_index = previous.iter().position(|&other| other == id)?;

            Some(StandingEntry {
                racer: id,
                name: racer.name.clone(),
                kind: racer.kind,
                rank: current_shared_position(index, &current, racers),
                score: racer.score,
                previous_rank: previous_shared_position(previous_index, &previous, racers),
                last_score: racer.last_score,
            })
        })
        .collect()
}
