//! Performance metrics for generated trades.
//!
//! This module provides tools to calculate:
//! - Max drawdown
//! - Profit factor
//! - Sharpe ratio
//! - Win rate
//!
//! The equity curve starts at an initial balance and moves by each trade's PnL, in the order the
//! trades are given (entry time for a generated `TradeSet`).
//!
//! It needs to enable `metrics` feature to use it.

use std::fmt;

use crate::engine::{MockChart, Trade};

/// A collection of trading metrics calculated from a series of trades.
///
/// `Metrics` is used to compute and display key performance indicators (KPIs)
/// of a mock trade journal, such as max drawdown, profit factor, Sharpe ratio, and win rate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pnls: Vec<f64>,
    initial_balance: f64,
}

impl Metrics {
    /// Creates a new `Metrics` instance from trades and an initial balance.
    pub fn new<'t>(trades: impl IntoIterator<Item = &'t Trade>, initial_balance: f64) -> Self {
        Self {
            pnls: trades.into_iter().map(Trade::pnl).collect(),
            initial_balance,
        }
    }

    /// Creates a new `Metrics` instance from the trades of a generated chart.
    pub fn from_chart(chart: &MockChart, initial_balance: f64) -> Self {
        Self::new(chart.trades(), initial_balance)
    }

    /// Returns the initial balance.
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Returns the balance after every trade.
    pub fn balance(&self) -> f64 {
        self.initial_balance + self.pnl()
    }

    /// Returns the profits and losses.
    pub fn pnl(&self) -> f64 {
        self.pnls.iter().sum()
    }

    /// Returns the balance after each trade, starting with the initial balance.
    pub fn equity_curve(&self) -> Vec<f64> {
        let mut balance = self.initial_balance;
        let mut curve = Vec::with_capacity(self.pnls.len() + 1);
        curve.push(balance);
        for pnl in &self.pnls {
            balance += pnl;
            curve.push(balance);
        }
        curve
    }

    /// Computes the maximum drawdown as a percentage.
    pub fn max_drawdown(&self) -> f64 {
        let mut max_peak = self.initial_balance;
        let mut max_drawdown = 0.0;

        for balance in self.equity_curve() {
            if balance > max_peak {
                max_peak = balance;
            }
            let drawdown = (max_peak - balance) / max_peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown * 100.0
    }

    /// Computes the profit factor.
    pub fn profit_factor(&self) -> f64 {
        let mut total_gains = 0.0;
        let mut total_losses = 0.0;

        for &pnl in &self.pnls {
            if pnl > 0.0 {
                total_gains += pnl;
            } else {
                total_losses += pnl.abs();
            }
        }

        if total_losses == 0.0 {
            return f64::INFINITY;
        }

        total_gains / total_losses
    }

    /// Computes the Sharpe ratio, a measure of risk-adjusted return.
    ///
    /// A higher Sharpe ratio indicates better risk-adjusted performance.
    /// Returns are per trade; `risk_free_rate` is the per-trade risk-free return (e.g., 0.0 for simplicity).
    pub fn sharpe_ratio(&self, risk_free_rate: f64) -> f64 {
        let returns = self
            .equity_curve()
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect::<Vec<_>>();

        let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
        let std_dev = (returns.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / returns.len() as f64).sqrt();

        (mean_return - risk_free_rate) / std_dev
    }

    /// Computes the win rate as a percentage of winning trades.
    pub fn win_rate(&self) -> f64 {
        if self.pnls.is_empty() {
            return 0.0;
        }

        let winning_trades = self.pnls.iter().filter(|&&pnl| pnl > 0.0).count();
        (winning_trades as f64 / self.pnls.len() as f64) * 100.0
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Mock Trade Metrics ===")?;
        writeln!(f, "Trades: {}", self.pnls.len())?;
        writeln!(f, "Initial Balance: {:.2}", self.initial_balance)?;
        writeln!(f, "Final Balance: {:.2}", self.balance())?;
        writeln!(f, "Profit & Loss (P&L): {:.2}", self.pnl())?;
        #[allow(clippy::writeln_empty_string)]
        writeln!(f, "")?;
        writeln!(f, "Max Drawdown: {:.2}%", self.max_drawdown())?;
        writeln!(f, "Profit Factor: {:.2}", self.profit_factor())?;
        writeln!(f, "Sharpe Ratio (risk-free rate = 0.0): {:.2}", self.sharpe_ratio(0.0))?;
        writeln!(f, "Win Rate: {:.2}%", self.win_rate())
    }
}

#[cfg(test)]
use crate::engine::PositionSide;

#[cfg(test)]
// Helper function to create a one-unit long trade with the given pnl
fn create_trade(pnl: f64) -> Trade {
    Trade::from((PositionSide::Long, (0, 100.0), (60, 100.0 + pnl), 1))
}

#[cfg(test)]
#[test]
fn max_drawdown() {
    let trades = [create_trade(2000.0), create_trade(-3000.0), create_trade(2000.0)];
    let metrics = Metrics::new(&trades, 10000.0);
    assert_eq!(metrics.equity_curve(), vec![10000.0, 12000.0, 9000.0, 11000.0]);
    assert_eq!(metrics.max_drawdown(), 25.0); // (12000 - 9000) / 12000 = 25%
}

#[cfg(test)]
#[test]
fn max_drawdown_no_trades() {
    let metrics = Metrics::new(std::iter::empty(), 10000.0);
    assert_eq!(metrics.max_drawdown(), 0.0);
}

#[cfg(test)]
#[test]
fn profit_factor() {
    let trades = [create_trade(20.0), create_trade(-10.0)];
    let metrics = Metrics::new(&trades, 10000.0);
    assert_eq!(metrics.profit_factor(), 2.0); // 20 / 10 = 2.0
}

#[cfg(test)]
#[test]
fn profit_factor_no_losses() {
    let metrics = Metrics::new(&[create_trade(20.0)], 10000.0);
    assert_eq!(metrics.profit_factor(), f64::INFINITY);
}

#[cfg(test)]
#[test]
fn sharpe_ratio() {
    let trades = [create_trade(500.0), create_trade(-200.0), create_trade(400.0)];
    let metrics = Metrics::new(&trades, 10000.0);
    let sharpe = metrics.sharpe_ratio(0.0);
    assert!(sharpe > 0.0 && sharpe < 1.0);
}

#[cfg(test)]
#[test]
fn sharpe_ratio_no_trades() {
    let metrics = Metrics::new(std::iter::empty(), 10000.0);
    assert!(metrics.sharpe_ratio(0.0).is_nan());
}

#[cfg(test)]
#[test]
fn win_rate() {
    let trades = [create_trade(20.0), create_trade(-10.0)];
    let metrics = Metrics::new(&trades, 10000.0);
    assert_eq!(metrics.win_rate(), 50.0);
    assert_eq!(metrics.pnl(), 10.0);
    assert_eq!(metrics.balance(), 10010.0);
}

#[cfg(test)]
#[test]
fn win_rate_no_trades() {
    assert_eq!(Metrics::new(std::iter::empty(), 10000.0).win_rate(), 0.0);
}

#[cfg(test)]
#[test]
fn from_chart() {
    use crate::{engine::GeneratorConfig, utils::FixedClock};

    let clock = FixedClock::from_timestamp(1_754_380_800).unwrap();
    let chart = MockChart::from_seed(&GeneratorConfig::default(), 4, &clock).unwrap();
    let metrics = Metrics::from_chart(&chart, 1000.0);
    let total = chart.trades().map(Trade::pnl).sum::<f64>();
    assert!((metrics.pnl() - total).abs() < 1e-9);
    assert!(metrics.to_string().starts_with("=== Mock Trade Metrics ==="));
}
