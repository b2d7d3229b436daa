use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{MarkerColor, MarkerShape};

/// Direction of a mock trade.
///
/// Serialized with the order-side names the chart expects (`"buy"` / `"sell"`),
/// displayed as `Long` / `Short`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionSide {
    /// Buy first, sell to close.
    #[cfg_attr(feature = "serde", serde(rename = "buy"))]
    Long,
    /// Sell first, buy to close.
    #[cfg_attr(feature = "serde", serde(rename = "sell"))]
    Short,
}

impl PositionSide {
    /// Signal that opened the trade.
    pub fn entry_signal(&self) -> &'static str {
        match self {
            Self::Long => "Breakout Buy",
            Self::Short => "Breakout Sell",
        }
    }

    /// Signal that closed the trade.
    pub fn exit_signal(&self) -> &'static str {
        match self {
            Self::Long => "Target/Stop Sell",
            Self::Short => "Target/Stop Buy",
        }
    }

    /// Profit of moving from `entry` to `exit` with `quantity` units.
    pub fn pnl(&self, entry: f64, exit: f64, quantity: f64) -> f64 {
        match self {
            Self::Long => (exit - entry) * quantity,
            Self::Short => (entry - exit) * quantity,
        }
    }

    pub(crate) fn entry_style(&self) -> (MarkerColor, MarkerShape) {
        match self {
            Self::Long => (MarkerColor::Green, MarkerShape::ArrowUp),
            Self::Short => (MarkerColor::Red, MarkerShape::ArrowDown),
        }
    }

    pub(crate) fn exit_style(&self) -> (MarkerColor, MarkerShape) {
        match self {
            Self::Long => (MarkerColor::Red, MarkerShape::ArrowDown),
            Self::Short => (MarkerColor::Green, MarkerShape::ArrowUp),
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.pad("Long"),
            Self::Short => f.pad("Short"),
        }
    }
}

#[cfg(test)]
#[test]
fn long_pnl() {
    assert_eq!(PositionSide::Long.pnl(100.0, 110.0, 2.0), 20.0);
    assert_eq!(PositionSide::Long.pnl(100.0, 90.0, 1.0), -10.0);
}

#[cfg(test)]
#[test]
fn short_pnl() {
    assert_eq!(PositionSide::Short.pnl(100.0, 90.0, 3.0), 30.0);
    assert_eq!(PositionSide::Short.pnl(100.0, 110.0, 1.0), -10.0);
}

#[cfg(test)]
#[test]
fn signals() {
    assert_eq!(PositionSide::Long.entry_signal(), "Breakout Buy");
    assert_eq!(PositionSide::Long.exit_signal(), "Target/Stop Sell");
    assert_eq!(PositionSide::Short.entry_signal(), "Breakout Sell");
    assert_eq!(PositionSide::Short.exit_signal(), "Target/Stop Buy");
}

#[cfg(test)]
#[test]
fn exit_style_inverts_entry() {
    for side in [PositionSide::Long, PositionSide::Short] {
        let (entry_color, entry_shape) = side.entry_style();
        let (exit_color, exit_shape) = side.exit_style();
        assert_ne!(entry_color, exit_color);
        assert_ne!(entry_shape, exit_shape);
    }
}

#[cfg(test)]
#[test]
fn display() {
    assert_eq!(PositionSide::Long.to_string(), "Long");
    assert_eq!(PositionSide::Short.to_string(), "Short");
}
