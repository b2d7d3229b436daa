use mockchart::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn main() -> anyhow::Result<()> {
    let clock = SystemClock;
    let mut rng = StdRng::seed_from_u64(7);

    // each stage on its own, the way a chart component would call them
    let timestamps = generate_time_grid(5, 120, &TimeGridPolicy::default(), &clock)?;
    let candles = generate_candles(&timestamps, &CandleOptions::default(), &mut rng);
    let ema = generate_indicator(&timestamps, &candles, "EMA 14", 14)?;
    let set = generate_trades(&candles, &TradeOptions::default(), &mut rng)?;

    println!("{} candles, last {} = {:.2}", candles.len(), ema.name, ema.data.last().map(|p| p.value).unwrap_or_default());
    for marker in &set.markers {
        println!("{:>9} {} {}", marker.id, marker.time, marker.text);
    }

    println!();
    for row in format_trades(&set.trades) {
        println!(
            "{} {:<5} {} {} @ {:.2} -> {} {} @ {:.2} x{} pnl {:>8.2} ({:>6.2}%) total {:>8.2} ({:>6.2}%)",
            row.trade_id,
            row.position_type,
            row.entry.date,
            row.entry.time,
            row.entry.price,
            row.exit.date,
            row.exit.time,
            row.exit.price,
            row.position_size,
            row.pnl_amount,
            row.pnl_percentage,
            row.cumulative_pnl_amount,
            row.cumulative_pnl_percentage,
        );
    }

    #[cfg(feature = "metrics")]
    println!("\n{}", Metrics::new(&set.trades, 10_000.0));

    Ok(())
}
