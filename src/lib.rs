//! # mockchart: mock data for trading chart UIs
//!
//! **mockchart** generates the synthetic data a trading chart front-end needs during development:
//! candlesticks on a market-session time grid, an EMA overlay, random trades with entry/exit markers,
//! and a trade journal with running PnL.
//!
//! Every generator takes its random source and clock as arguments, so a seeded
//! [`rand::rngs::StdRng`] and a [`utils::FixedClock`] make the output reproducible.
//!
//! ## Pipeline
//! | Stage          | Function                      | Output                                                   |
//! |----------------|-------------------------------|----------------------------------------------------------|
//! | **Time grid**  | `generate_time_grid`          | Ascending timestamps, session-aware or trailing "now".   |
//! | **Candles**    | `generate_candles`            | Random-walk OHLC bars, one per timestamp.               |
//! | **Indicator**  | `generate_indicator`          | EMA of the closes (period 14 by default).               |
//! | **Trades**     | `generate_trades`             | 3 to 7 trades sorted by entry, with two markers each.   |
//! | **Journal**    | `format_trades`               | Display rows with per-trade and cumulative PnL.         |
//!
//! `MockChart::generate` runs the whole pipeline from a `GeneratorConfig`.
//!
//! ## Getting Started
//! ```rust
//! use mockchart::prelude::*;
//!
//! let clock = FixedClock::from_timestamp(1_754_380_800).unwrap();
//! let config = GeneratorConfig::default().interval_minutes(15).points(120);
//! let chart = MockChart::from_seed(&config, 42, &clock).unwrap();
//!
//! for row in chart.rows() {
//!     println!(
//!         "{} {} {} {} -> {} {} pnl {:.2} (cumulative {:.2})",
//!         row.trade_id,
//!         row.position_type,
//!         row.entry.date,
//!         row.entry.time,
//!         row.exit.date,
//!         row.exit.time,
//!         row.pnl_amount,
//!         row.cumulative_pnl_amount,
//!     );
//! }
//! ```
//!
//! ## Features
//! | Feature     | Description                                                                 |
//! |-------------|-----------------------------------------------------------------------------|
//! | `serde`     | Serialize every output and load `GeneratorConfig` from JSON.               |
//! | `draws`     | Render candles, overlay and markers to SVG or PNG with `plotters` (default). |
//! | `metrics`   | Win rate, profit factor, drawdown and Sharpe ratio of a trade set.         |
//! | `cli`       | The `mockchart` binary, printing a generated chart as JSON.                |
//! | `wasm`      | Random source support for `wasm32` browser builds.                         |
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Generators: time grid, candles, indicator, trades and journal.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Clocks and loading helpers.
pub mod utils;

/// Performance metrics of generated trades.
#[cfg(feature = "metrics")]
pub mod metrics;

/// Draw the generated chart with a lot of backends: png, svg, etc.
#[cfg(feature = "draws")]
pub mod draws;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::utils::*;

    #[cfg(feature = "metrics")]
    pub use crate::metrics::*;

    #[cfg(feature = "draws")]
    pub use crate::draws::*;
}

use std::ops::{Add, Div, Mul, Sub};

/// Trait for performing percentage-based calculations.
pub trait PercentCalculus<Rhs = Self> {
    /// Adds a percentage to the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to add (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value increased by the given percentage.
    fn addpercent(self, rhs: Rhs) -> Self;

    /// Subtracts a percentage from the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to subtract (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value decreased by the given percentage.
    fn subpercent(self, rhs: Rhs) -> Self;

    /// Calculates the percentage change between two values.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The percentage change from the original value to the new value.
    fn change(self, new: Self) -> Self;
}

impl PercentCalculus for f64 {
    fn addpercent(self, percent: Self) -> Self {
        self.add(self.mul(percent.div(100.0)))
    }

    fn subpercent(self, percent: Self) -> Self {
        self.sub(self.mul(percent.div(100.0)))
    }

    fn change(self, new: Self) -> Self {
        new.sub(self).div(self).mul(100.0)
    }
}

#[cfg(test)]
mod percent {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(110.0, 100.0.addpercent(10.0))
    }

    #[test]
    fn sub() {
        assert_eq!(90.0, 100.0.subpercent(10.0))
    }

    #[test]
    fn change() {
        assert_eq!(10.0, 100.0.change(110.0))
    }

    #[test]
    fn change_down() {
        assert_eq!(-25.0, 200.0.change(150.0))
    }
}
