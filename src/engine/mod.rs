//! Mock data generators.
//!
//! This module provides the pipeline stages behind a mock chart:
//! - `generate_time_grid`: bar timestamps inside (or regardless of) a trading session.
//! - `generate_candles`: a random-walk OHLC candle per timestamp.
//! - `generate_indicator`: an EMA overlay of the closes.
//! - `generate_trades`: random trades and their entry/exit markers.
//! - `format_trades`: journal rows with cumulative PnL.
//!
//! `MockChart` runs all of them from a single `GeneratorConfig`.

mod candle;
mod indicator;
mod journal;
mod marker;
mod position;
mod time_grid;
mod trade;

use std::slice::Iter;

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{errors::Result, utils::Clock};

pub use candle::*;
pub use indicator::*;
pub use journal::*;
pub use marker::*;
pub use position::*;
pub use time_grid::*;
pub use trade::*;

/// Settings for a whole mock chart.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    interval_minutes: u32,
    points: usize,
    grid: TimeGridPolicy,
    candles: CandleOptions,
    indicator: IndicatorOptions,
    trades: TradeOptions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            points: 150,
            grid: TimeGridPolicy::default(),
            candles: CandleOptions::default(),
            indicator: IndicatorOptions::default(),
            trades: TradeOptions::default(),
        }
    }
}

impl GeneratorConfig {
    /// Sets the bar size in minutes.
    pub fn interval_minutes(mut self, minutes: u32) -> Self {
        self.interval_minutes = minutes;
        self
    }

    /// Sets the number of bars.
    pub fn points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    /// Sets how the time grid is anchored.
    pub fn grid(mut self, grid: TimeGridPolicy) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the candle random walk.
    pub fn candles(mut self, candles: CandleOptions) -> Self {
        self.candles = candles;
        self
    }

    /// Sets the overlay.
    pub fn indicator(mut self, indicator: IndicatorOptions) -> Self {
        self.indicator = indicator;
        self
    }

    /// Sets the trade sampling.
    pub fn trades(mut self, trades: TradeOptions) -> Self {
        self.trades = trades;
        self
    }
}

/// Everything a chart demo renders: candles, overlay, trades, markers and journal rows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MockChart {
    candles: Vec<Candle>,
    indicator: Indicator,
    trades: TradeSet,
    rows: Vec<FormattedTradeRow>,
}

impl MockChart {
    /// Runs the full pipeline: grid, candles, indicator, trades and journal.
    ///
    /// ### Arguments
    /// * `config` - Pipeline settings.
    /// * `rng` - Random source shared by every stage.
    /// * `clock` - Source of "now" for the time grid.
    ///
    /// ### Returns
    /// The chart data, or the first stage error.
    ///
    /// ### Example
    /// ```rust
    /// use mockchart::prelude::*;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let clock = FixedClock::from_timestamp(1_754_380_800).unwrap();
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let chart = MockChart::generate(&GeneratorConfig::default(), &mut rng, &clock).unwrap();
    ///
    /// assert_eq!(chart.candles().len(), 150);
    /// assert_eq!(chart.markers().len(), 2 * chart.trades().len());
    /// assert_eq!(chart.trades().next().map(|t| t.id()), Some("001"));
    /// ```
    pub fn generate<R, C>(config: &GeneratorConfig, rng: &mut R, clock: &C) -> Result<Self>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let timestamps = generate_time_grid(config.interval_minutes, config.points, &config.grid, clock)?;
        let candles = generate_candles(&timestamps, &config.candles, rng);
        let indicator = generate_indicator(
            &timestamps,
            &candles,
            config.indicator.label(),
            config.indicator.ema_period(),
        )?;
        let trades = generate_trades(&candles, &config.trades, rng)?;
        let rows = format_trades(&trades.trades);

        debug!(
            "mock chart: {} candles, {} trades, {} markers",
            candles.len(),
            trades.trades.len(),
            trades.markers.len()
        );

        Ok(Self {
            candles,
            indicator,
            trades,
            rows,
        })
    }

    /// Runs [`MockChart::generate`] with a `StdRng` seeded from `seed`.
    pub fn from_seed<C>(config: &GeneratorConfig, seed: u64, clock: &C) -> Result<Self>
    where
        C: Clock + ?Sized,
    {
        Self::generate(config, &mut StdRng::seed_from_u64(seed), clock)
    }

    /// Returns an iterator over the candles.
    pub fn candles(&self) -> Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Returns the overlay.
    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Returns an iterator over the trades, sorted by entry time.
    pub fn trades(&self) -> Iter<'_, Trade> {
        self.trades.trades.iter()
    }

    /// Returns an iterator over the markers, sorted by time.
    pub fn markers(&self) -> Iter<'_, Marker> {
        self.trades.markers.iter()
    }

    /// Returns an iterator over the journal rows.
    pub fn rows(&self) -> Iter<'_, FormattedTradeRow> {
        self.rows.iter()
    }
}
