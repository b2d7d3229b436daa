use log::debug;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::errors::{Error, Result};

/// One OHLC bar.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    time: Timestamp,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Candle {
    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns `true` when the close is at or above the open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Builder for [`Candle`] that checks the OHLC ordering.
#[derive(Debug, Default)]
pub struct CandleBuilder {
    time: Timestamp,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
}

impl CandleBuilder {
    /// Starts an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }

    pub fn open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    pub fn high(mut self, high: f64) -> Self {
        self.high = Some(high);
        self
    }

    pub fn low(mut self, low: f64) -> Self {
        self.low = Some(low);
        self
    }

    pub fn close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    /// Builds the candle.
    ///
    /// ### Returns
    /// The candle, or `InvalidCandle` when a price is missing or not finite, or when
    /// `low <= min(open, close)` and `high >= max(open, close)` do not hold.
    pub fn build(self) -> Result<Candle> {
        let (Some(open), Some(high), Some(low), Some(close)) = (self.open, self.high, self.low, self.close) else {
            return Err(Error::InvalidCandle);
        };

        if ![open, high, low, close].iter().all(|p| p.is_finite()) {
            return Err(Error::InvalidCandle);
        }
        if low > open.min(close) || high < open.max(close) {
            return Err(Error::InvalidCandle);
        }

        Ok(Candle {
            time: self.time,
            open,
            high,
            low,
            close,
        })
    }
}

/// Where the next candle opens.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum WalkPolicy {
    /// The next candle opens at the previous close (a connected random walk).
    #[default]
    CarryClose,
    /// Every candle opens at the same price; bars are unconnected.
    CarryOpen,
}

/// Parameters of the candle random walk.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq)]
pub struct CandleOptions {
    start_price: f64,
    swing: f64,
    wick: f64,
    walk: WalkPolicy,
}

impl Default for CandleOptions {
    fn default() -> Self {
        Self {
            start_price: 150.0,
            swing: 90.0,
            wick: 25.0,
            walk: WalkPolicy::default(),
        }
    }
}

impl CandleOptions {
    /// Sets the open of the first candle.
    pub fn start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    /// Sets the full width of the open-to-close move; the close lands within `±swing / 2`.
    pub fn swing(mut self, swing: f64) -> Self {
        self.swing = swing;
        self
    }

    /// Sets the maximum wick length above and below the body.
    pub fn wick(mut self, wick: f64) -> Self {
        self.wick = wick;
        self
    }

    /// Sets how consecutive candles are chained.
    pub fn walk(mut self, walk: WalkPolicy) -> Self {
        self.walk = walk;
        self
    }
}

/// Synthesizes one random-walk candle per timestamp, in input order.
///
/// ```rust
/// use mockchart::prelude::*;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let candles = generate_candles(&[0, 60, 120], &CandleOptions::default(), &mut rng);
/// assert_eq!(candles.len(), 3);
/// assert_eq!(candles[0].open(), 150.0);
/// assert_eq!(candles[1].open(), candles[0].close());
/// ```
pub fn generate_candles<R>(timestamps: &[Timestamp], options: &CandleOptions, rng: &mut R) -> Vec<Candle>
where
    R: Rng + ?Sized,
{
    let swing = options.swing.abs();
    let wick = options.wick.abs();
    let mut next_open = options.start_price;

    let candles = timestamps
        .iter()
        .map(|&time| {
            let open = next_open;
            let close = open - (rng.random::<f64>() - 0.5) * swing;
            let high = open.max(close) + rng.random::<f64>() * wick;
            let low = open.min(close) - rng.random::<f64>() * wick;

            if options.walk == WalkPolicy::CarryClose {
                next_open = close;
            }

            Candle {
                time,
                open,
                high,
                low,
                close,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "synthesized {} candles from {:.2} ({:?})",
        candles.len(),
        options.start_price,
        options.walk
    );
    candles
}
