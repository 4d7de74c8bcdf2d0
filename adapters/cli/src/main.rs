#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Art Critic round.

mod autopilot;
mod session;
mod tuning;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use art_critic_core::Event;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{autopilot::Autopilot, session::Session, tuning::Tuning};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

/// Plays one round of Art Critic with a scripted player and prints the final score.
#[derive(Debug, Parser)]
#[command(name = "art-critic", version, about)]
struct Args {
    /// TOML tuning file overriding the built-in round settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed shared by the spawner, the rotation, the progression, and the autopilot.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Length of one simulation frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Simulated time after which the run stops even if the clock is still running.
    #[arg(long, default_value_t = 900)]
    max_seconds: u64,
    /// Probability that the autopilot judges an artwork correctly.
    #[arg(long, default_value_t = 0.8)]
    accuracy: f64,
}

/// Entry point for the Art Critic command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if args.frame_ms == 0 {
        bail!("--frame-ms must be greater than zero");
    }
    if !(0.0..=1.0).contains(&args.accuracy) {
        bail!("--accuracy must lie within [0, 1], got {}", args.accuracy);
    }

    let tuning = match &args.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let setup = tuning.into_setup(args.seed)?;
    let mut session = Session::new(setup).context("invalid round configuration")?;
    let mut autopilot = Autopilot::new(args.accuracy, args.seed);

    println!("{}", session.welcome_banner());
    println!("{}", session.target_label());

    let frame = Duration::from_millis(args.frame_ms);
    let limit = Duration::from_secs(args.max_seconds);
    let mut elapsed = Duration::ZERO;
    let mut next_report = PROGRESS_INTERVAL;
    while session.is_running() && elapsed < limit {
        let input = autopilot.plan(&session.artworks(), session.layout());
        for event in session.step(frame, &input) {
            match event {
                Event::TargetChanged { .. } => println!("{}", session.target_label()),
                Event::ValueUnlocked { .. } => {
                    if let Some(text) = session.notification() {
                        println!("{text}");
                    }
                }
                _ => {}
            }
        }

        elapsed += frame;
        if elapsed >= next_report {
            next_report += PROGRESS_INTERVAL;
            info!(
                elapsed = elapsed.as_secs(),
                remaining = session.remaining().as_secs_f32(),
                "round in progress"
            );
        }
    }

    if session.is_running() {
        info!(max_seconds = args.max_seconds, "simulation limit reached before the clock expired");
    }

    let summary = session.summary();
    println!("{}", session.final_score_label());
    println!(
        "Submitted {} artworks ({} correct, {} wrong), {} refused at the gate, {} values unlocked",
        summary.submitted,
        summary.correct,
        summary.submitted - summary.correct,
        summary.refused,
        summary.unlocked,
    );
    Ok(())
}
