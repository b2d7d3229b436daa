use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Candle, Timestamp};
use crate::errors::{Error, Result};

/// One indicator value aligned with a candle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    /// Bar time.
    pub time: Timestamp,
    /// Indicator value at that bar.
    pub value: f64,
}

/// A named line drawn over the candles.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    /// Label shown in the chart legend.
    pub name: String,
    /// Points, index-aligned with the timestamps.
    pub data: Vec<IndicatorPoint>,
}

/// Overlay settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOptions {
    name: String,
    period: usize,
}

impl Default for IndicatorOptions {
    fn default() -> Self {
        Self {
            name: "EMA".to_string(),
            period: 14,
        }
    }
}

impl IndicatorOptions {
    /// Sets the legend label.
    pub fn name(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sets the EMA period.
    pub fn period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    /// Returns the legend label.
    pub fn label(&self) -> &str {
        &self.name
    }

    /// Returns the EMA period.
    pub fn ema_period(&self) -> usize {
        self.period
    }
}

/// Computes an exponential moving average of the candle closes.
///
/// The first value is the first close; each next one is `close * k + previous * (1 - k)`
/// with `k = 2 / (period + 1)`. Where `candles` is shorter than `timestamps` the previous
/// value stands in for the missing close, so the output always has one point per timestamp.
///
/// ### Returns
/// The indicator, or `InvalidPeriod` when `period` is zero.
pub fn generate_indicator(
    timestamps: &[Timestamp],
    candles: &[Candle],
    name: impl ToString,
    period: usize,
) -> Result<Indicator> {
    if period == 0 {
        return Err(Error::InvalidPeriod);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut previous = candles.first().map(Candle::close).unwrap_or(0.0);

    let data = timestamps
        .iter()
        .enumerate()
        .map(|(i, &time)| {
            let close = candles.get(i).map(Candle::close).unwrap_or(previous);
            previous = if i == 0 { close } else { close * k + previous * (1.0 - k) };
            IndicatorPoint { time, value: previous }
        })
        .collect::<Vec<_>>();

    let name = name.to_string();
    debug!("{name}: {} points, period {period}", data.len());
    Ok(Indicator { name, data })
}
