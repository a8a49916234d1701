mod audio_log;
mod autopilot;
mod recording;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use nightrun_core::audio::dispatch_frame;
use nightrun_core::commentary::CommentaryRequest;
use nightrun_core::events::RaceEvent;
use nightrun_core::protocol::FrameMessage;
use nightrun_core::run::RunState;
use nightrun_core::simulation::FrameSimulation;
use nightrun_crew::{CrewChief, CrewConfig, CrewRadio};
use nightrun_race::NightRun;
use nightrun_race::raster::Framebuffer;

use audio_log::TracingAudio;
use autopilot::Autopilot;
use recording::{Recorder, read_intents};

/// Drive a NightRun race headlessly with an autopilot.
#[derive(Parser)]
#[command(name = "nightrun")]
#[command(version)]
struct Args {
    /// Frames to simulate.
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Seed for track and traffic generation.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Pace frames at the tick rate instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Start a new run after GAME_OVER instead of stopping.
    #[arg(long)]
    restart: bool,

    /// Write the final frame as a binary PPM.
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Record every frame's intents and snapshot as length-prefixed wire messages.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Feed intents from a recording instead of the autopilot. Use the
    /// recording's seed and config.
    #[arg(long)]
    replay: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut sim = NightRun::from_env(args.seed).context("failed to build the day-1 track")?;
    let dt = sim.config().dt();
    let mut ticker = tokio::time::interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let crew_config = CrewConfig::from_env();
    if !crew_config.has_api_key() {
        tracing::info!("NIGHTRUN_CREW_API_KEY not set, crew radio will stay silent");
    }
    let mut radio = CrewRadio::new(CrewChief::new(crew_config)?);
    let pilot = Autopilot::new(args.restart);
    let mut audio = TracingAudio::default();
    let mut recorder = match &args.record {
        Some(path) => Some(Recorder::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ))),
        None => None,
    };
    let replay = match &args.replay {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let intents = read_intents(BufReader::new(file))?;
            tracing::info!(frames = intents.len(), path = %path.display(), "Replaying recording");
            Some(intents)
        },
        None => None,
    };

    tracing::info!(seed = args.seed, frames = args.frames, "NightRun starting");

    let mut frames_run = 0;
    for frame in 0..args.frames {
        if args.realtime {
            ticker.tick().await;
        } else {
            tokio::task::yield_now().await;
        }

        let inputs = match &replay {
            Some(intents) => match intents.get(frame as usize) {
                Some(inputs) => *inputs,
                None => break,
            },
            None => pilot.inputs(sim.state()),
        };
        let events = sim.update(dt, &inputs);
        let stats = sim.snapshot();
        frames_run = frame + 1;

        dispatch_frame(&mut audio, stats.speed_ratio, &events);
        if events.iter().any(RaceEvent::wants_commentary) {
            radio.request(CommentaryRequest::new(
                stats.cars_passed,
                stats.collisions,
                stats.day,
                stats.weather,
            ));
        }
        while let Some(msg) = radio.poll() {
            tracing::info!(emotion = ?msg.emotion, "Rusty: {}", msg.text);
        }
        for event in &events {
            log_event(event);
        }

        if let Some(recorder) = recorder.as_mut() {
            recorder.record(
                &inputs,
                &FrameMessage {
                    frame,
                    stats,
                    events,
                },
            )?;
        }

        if stats.run_state == RunState::GameOver && !args.restart {
            break;
        }
    }

    if let Some(recorder) = recorder {
        recorder.finish()?;
    }

    if radio.is_busy() {
        match tokio::time::timeout(Duration::from_secs(5), radio.recv()).await {
            Ok(Some(msg)) => tracing::info!(emotion = ?msg.emotion, "Rusty: {}", msg.text),
            Ok(None) | Err(_) => tracing::warn!("Crew radio did not answer before shutdown"),
        }
    }

    if let Some(path) = &args.screenshot {
        write_screenshot(&sim, path)?;
    }

    let stats = sim.snapshot();
    tracing::info!(
        frames = frames_run,
        day = stats.day,
        cars_passed = stats.cars_passed,
        collisions = stats.collisions,
        state = ?stats.run_state,
        cues = audio.cues_played,
        "NightRun finished"
    );
    Ok(())
}

fn log_event(event: &RaceEvent) {
    match event {
        RaceEvent::RunStarted { day } => tracing::info!(day, "Run started"),
        RaceEvent::DayStarted { day, weather } => {
            tracing::info!(day, weather = weather.description(), "Day started")
        },
        RaceEvent::LevelComplete { day, cars_passed } => {
            tracing::info!(day, cars_passed, "Level complete")
        },
        RaceEvent::GameOver { day, cars_passed } => tracing::info!(day, cars_passed, "Game over"),
        RaceEvent::Collision { speed_after } => tracing::debug!(speed_after, "Collision"),
        RaceEvent::CarsPassed { .. } | RaceEvent::CarsRepassed { .. } => {},
    }
}

fn write_screenshot(sim: &NightRun, path: &Path) -> Result<()> {
    let mut renderer = sim.renderer();
    let list = sim.render(&mut renderer);
    let mut fb = Framebuffer::new(list.width, list.height);
    fb.draw(&list);
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    fb.write_ppm(BufWriter::new(file))?;
    tracing::info!(
        path = %path.display(),
        commands = list.commands.len(),
        "Screenshot written"
    );
    Ok(())
}
