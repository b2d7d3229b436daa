use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use mockchart::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

/// Print a mock candlestick chart with trades as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with a generator configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bar size in minutes
    #[arg(long)]
    interval: Option<u32>,

    /// Number of candles
    #[arg(long)]
    points: Option<usize>,

    /// Seed for reproducible output (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// End the grid at the current time instead of starting at the session open
    #[arg(long)]
    trailing: bool,

    /// Also render the chart to this SVG file
    #[cfg(feature = "draws")]
    #[arg(long)]
    svg: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path.clone())?,
        None => GeneratorConfig::default(),
    };
    if let Some(interval) = args.interval {
        config = config.interval_minutes(interval);
    }
    if let Some(points) = args.points {
        config = config.points(points);
    }
    if args.trailing {
        config = config.grid(TimeGridPolicy::TrailingWindow);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let chart = MockChart::generate(&config, &mut rng, &SystemClock)?;
    log::info!(
        "generated {} candles and {} trades",
        chart.candles().len(),
        chart.trades().len()
    );

    #[cfg(feature = "draws")]
    if let Some(path) = args.svg {
        Draw::with_chart(&chart)
            .with_options(DrawOptions::default().draw_output(DrawOutput::Svg(path)))
            .plot()?;
    }

    serde_json::to_writer_pretty(io::stdout().lock(), &chart)?;
    println!();
    Ok(())
}
