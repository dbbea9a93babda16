use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use mechkart_core::events::RaceEvent;
use mechkart_core::racer::{placement::placement_label, RacerKind};
use mechkart_core::{Settings, GLOBAL_CONFIG};
use mechkart_server::cup::Cup;
use mechkart_server::driver::HeadlessDriver;
use mechkart_server::session::Session;
use mechkart_server::track::TrackDefinition;

const BASE_PACE: f64 = 25.0;
// simulated time, not wall time
const MAX_RACE_TIME: Duration = Duration::from_secs(60 * 60);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = GLOBAL_CONFIG.clone();
    let cup = load_cup(&settings)?;

    let mut session = Session::new(settings, cup);
    let tick = Duration::from_millis(session.settings().server_tick_ms.max(1));
    let local = session.join("Player 1".to_string(), RacerKind::Human);
    session.fill_with_ai();

    let seed = rand::random();
    log::info!("driving with seed {}", seed);
    let mut driver = HeadlessDriver::new(seed, BASE_PACE);

    // the clock only moves when we say so
    let mut now = Instant::now();
    while !session.is_series_over() {
        let started = session.begin_next_race(now).with_context(|| {
            format!(
                "track {} of {} is unusable",
                session.races_completed() + 1,
                session.cup().name
            )
        })?;
        if !started {
            bail!("couldn't start race {}", session.races_completed() + 1);
        }

        let deadline = now + MAX_RACE_TIME;
        while session.is_race_in_progress() {
            now += tick;
            driver.drive(&mut session, tick, now);
            session.tick(now);
            let events = session.drain_events();
            report(&session, events);

            if now > deadline {
                session.abandon_race();
                bail!("race {} never finished", session.races_completed() + 1);
            }
        }

        println!(
            "{} race {} of {}:",
            session.cup().name,
            session.races_completed(),
            session.cup().len()
        );
        for entry in session.overall_standings() {
            println!(
                "  {:>5} {:<16} {:>4} (+{})",
                placement_label(entry.rank),
                entry.name,
                entry.score,
                entry.points_gained()
            );
        }
    }

    let result = session.conclude_series(local);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn load_cup(settings: &Settings) -> anyhow::Result<Cup> {
    if !settings.cup_file.is_empty() {
        return Cup::load(&settings.cup_file)
            .with_context(|| format!("couldn't load cup {}", settings.cup_file));
    }
    if !settings.track_file.is_empty() {
        let track = TrackDefinition::load(&settings.track_file)
            .with_context(|| format!("couldn't load track {}", settings.track_file))?;
        let name = format!("{} Cup", track.name);
        return Ok(Cup::repeat(&name, track, settings.races_in_series));
    }

    Ok(Cup::ovals("Oval Cup", settings.races_in_series))
}

fn report(session: &Session, events: Vec<RaceEvent>) {
    let name = move |id| session.racer(id).map_or("?", |racer| racer.name.as_str());

    for event in events {
        match event {
            RaceEvent::CountdownStarted { duration } => {
                log::info!("{:.1}s countdown", duration.as_secs_f64())
            }
            RaceEvent::LapCompleted { racer, lap } => log::debug!("{} completed lap {}", name(racer), lap),
            RaceEvent::RacerFinished {
                racer,
                placement,
                finish_time,
            } => log::info!(
                "{} crossed the line {} in {:.2}s",
                name(racer),
                placement_label(placement),
                finish_time.as_secs_f64()
            ),
            RaceEvent::PointsAwarded {
                racer, points, total, ..
            } => log::debug!("{} +{} = {}", name(racer), points, total),
            RaceEvent::RaceStarted | RaceEvent::RacerEliminated { .. } | RaceEvent::RaceEnded => {}
        }
    }
}
