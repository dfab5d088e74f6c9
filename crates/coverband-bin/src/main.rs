// coverband: headless chart runner.
//
// Loads a chart description, drives a session from a recorded key script or
// autoplay, and prints the judgment summary.

mod config;
mod driver;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use coverband_chart::{ChartDef, Clock, ManualClock, Session, SystemClock};
use coverband_input::{KeyRouter, ScriptedInput, create_autoplay_log};
use log::{info, warn};

use config::SessionConfig;
use driver::RunSummary;

#[derive(Parser, Debug)]
#[command(name = "coverband", about = "Rhythm chart judgment runner")]
struct Args {
    /// Path to a session config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a chart description JSON file (default: built-in drum demo).
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Path to a recorded key event script.
    #[arg(long, conflicts_with = "autoplay")]
    script: Option<PathBuf>,

    /// Play the chart perfectly.
    #[arg(long)]
    autoplay: bool,

    /// Follow the system clock instead of stepping a simulated one.
    #[arg(long)]
    realtime: bool,

    /// Log per-note judgments.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &args.config {
        Some(path) => {
            let config = SessionConfig::read(path)?;
            info!("loaded config {}", path.display());
            config
        }
        None => SessionConfig::default(),
    };

    let chart = match &args.chart {
        Some(path) => ChartDef::read(path)?,
        None => {
            info!("no chart given, using the built-in demo");
            ChartDef::demo()
        }
    };

    let summary = if args.realtime {
        play(SystemClock::new(), &args, &config, &chart, |ms| {
            std::thread::sleep(Duration::from_millis(ms.unsigned_abs()))
        })?
    } else {
        let clock = ManualClock::new();
        play(&clock, &args, &config, &chart, |ms| clock.advance(ms))?
    };

    println!("{summary}");
    Ok(())
}

fn play<C: Clock>(
    clock: C,
    args: &Args,
    config: &SessionConfig,
    chart: &ChartDef,
    wait: impl FnMut(i64),
) -> Result<RunSummary> {
    let beats = chart.build_beats().context("building chart")?;
    let mut session = Session::new(
        clock,
        chart.instrument.instrument(),
        beats,
        config.judge,
        config.layout,
    )?;
    let key_map = config.key_map_for(chart.instrument);

    let mut input = if args.autoplay {
        ScriptedInput::new(create_autoplay_log(session.chart(), &key_map)?)
    } else if let Some(path) = &args.script {
        ScriptedInput::read(path)?
    } else {
        warn!("no --script or --autoplay given, every note will be missed");
        ScriptedInput::default()
    };

    let mut router = KeyRouter::new(key_map);
    driver::run(
        &mut session,
        &mut input,
        &mut router,
        config.frame_ms,
        config.grace_ms,
        wait,
    )
}
