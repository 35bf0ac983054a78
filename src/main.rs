//! Netrace entry point
//!
//! Draws two decks, runs the race headless at a fixed frame delta and prints
//! the commentary, run panel and final analysis.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use netrace::catalog::draw_cards;
use netrace::consts::FRAME_MS;
use netrace::driver::USER_ID;
use netrace::telemetry::TelemetrySnapshot;
use netrace::{Card, RaceDriver, RaceOutcome, RaceSettings};

#[derive(Parser, Debug)]
#[command(name = "netrace")]
#[command(about = "Card-driven network race, simulated headless")]
struct Cli {
    /// Seed for the card draws (defaults to the run id)
    #[arg(long)]
    seed: Option<u64>,

    /// Run id folded into the race seed (defaults to the current time in ms)
    #[arg(long)]
    run_id: Option<u64>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frame delta fed to the driver
    #[arg(long, default_value_t = FRAME_MS)]
    frame_ms: f64,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    run_id: u64,
    user_cards: Vec<&'a str>,
    opponent_cards: Vec<&'a str>,
    outcome: &'a RaceOutcome,
    telemetry: Option<TelemetrySnapshot>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}

fn deck_line(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| format!("{} [{}]", c.name, c.rarity.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    anyhow::ensure!(
        cli.frame_ms.is_finite() && cli.frame_ms > 0.0,
        "--frame-ms must be a positive number, got {}",
        cli.frame_ms
    );

    let settings = match &cli.settings {
        Some(path) => RaceSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => RaceSettings::default(),
    };

    let run_id = cli.run_id.unwrap_or_else(now_ms);
    let seed = cli.seed.unwrap_or(run_id);
    let mut rng = Pcg32::seed_from_u64(seed);
    let user_cards = draw_cards(&mut rng, settings.deck_size);
    let opponent_cards = draw_cards(&mut rng, settings.deck_size);
    log::info!("Netrace starting (run {run_id}, draw seed {seed})");

    if !cli.json {
        println!("Your deck:     {}", deck_line(&user_cards));
        println!("Opponent deck: {}", deck_line(&opponent_cards));
    }

    let segments = settings.telemetry_segments;
    let mut driver = RaceDriver::start(user_cards.clone(), opponent_cards.clone(), run_id, settings);
    let mut last_line: Option<String> = None;
    let outcome = loop {
        let done = driver.advance(cli.frame_ms).cloned();
        if !cli.json {
            let latest = driver.state().commentary.last();
            if latest.is_some() && latest != last_line.as_ref() {
                let t = driver.state().elapsed_time / 1000.0;
                if let Some(line) = latest {
                    println!("[{t:>5.1}s] {line}");
                }
                last_line = latest.cloned();
            }
        }
        if let Some(outcome) = done {
            break outcome;
        }
    };

    let telemetry = TelemetrySnapshot::capture(driver.state(), USER_ID, segments);

    if cli.json {
        let report = Report {
            run_id,
            user_cards: user_cards.iter().map(|c| c.id.as_str()).collect(),
            opponent_cards: opponent_cards.iter().map(|c| c.id.as_str()).collect(),
            outcome: &outcome,
            telemetry,
        };
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    if let Some(panel) = &telemetry {
        println!();
        println!("Now:   {} ({})", panel.summary.now_text, panel.feel.as_str());
        println!("Trend: {}", panel.summary.trend_text);
        for event in &panel.feed {
            println!("  {:>6.0}ms  {}", event.time_ms, event.message);
        }
    }

    let result = &outcome.result;
    println!();
    println!(
        "Result: {:?} (you {:.1} vs opponent {:.1}, gap {:.1})",
        result.winner, result.user_position, result.opponent_position, result.difference
    );
    for (title, lines) in [
        ("Strengths", &outcome.analysis.strengths),
        ("Limitations", &outcome.analysis.limitations),
        ("Improvements", &outcome.analysis.improvements),
    ] {
        if lines.is_empty() {
            continue;
        }
        println!("{title}:");
        for line in lines {
            println!("  - {line}");
        }
    }

    Ok(())
}
