use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{PositionSide, Timestamp, Trade};

/// Entry or exit half of a journal row.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    Entry,
    Exit,
}

/// One side of a trade as shown in the journal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLeg {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: LegKind,
    /// `Aug 05, 2025`
    pub date: String,
    /// `14:05`
    pub time: String,
    /// The raw UTC timestamp, for matching rows with chart markers.
    #[cfg_attr(feature = "serde", serde(rename = "timeISO"))]
    pub timestamp: Timestamp,
    pub signal: String,
    pub price: f64,
}

/// A display-ready trade with running totals.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedTradeRow {
    pub trade_id: String,
    /// Serialized as `"Long"` / `"Short"`.
    #[cfg_attr(feature = "serde", serde(with = "position_type"))]
    pub position_type: PositionSide,
    pub entry: TradeLeg,
    pub exit: TradeLeg,
    pub position_size: u32,
    pub pnl_amount: f64,
    pub pnl_percentage: f64,
    pub cumulative_pnl_amount: f64,
    pub cumulative_pnl_percentage: f64,
}

/// Formats trades for the journal table, accumulating PnL in input order.
///
/// Pass trades sorted by entry time for the running totals to read as a timeline.
pub fn format_trades(trades: &[Trade]) -> Vec<FormattedTradeRow> {
    let mut cumulative_pnl_amount = 0.0;
    let mut cumulative_pnl_percentage = 0.0;

    let rows = trades
        .iter()
        .map(|trade| {
            let pnl_percentage = trade.pnl_percentage();
            cumulative_pnl_amount += trade.pnl();
            cumulative_pnl_percentage += pnl_percentage;

            FormattedTradeRow {
                trade_id: trade.id().to_string(),
                position_type: trade.side(),
                entry: leg(LegKind::Entry, trade.entry_time(), trade.entry_signal(), trade.entry_price()),
                exit: leg(LegKind::Exit, trade.exit_time(), trade.exit_signal(), trade.exit_price()),
                position_size: trade.entry_qty(),
                pnl_amount: trade.pnl(),
                pnl_percentage,
                cumulative_pnl_amount,
                cumulative_pnl_percentage,
            }
        })
        .collect::<Vec<_>>();

    debug!("formatted {} rows, cumulative pnl {:.2}", rows.len(), cumulative_pnl_amount);
    rows
}

fn leg(kind: LegKind, timestamp: Timestamp, signal: &str, price: f64) -> TradeLeg {
    let (date, time) = format_timestamp(timestamp);
    TradeLeg {
        kind,
        date,
        time,
        timestamp,
        signal: signal.to_string(),
        price,
    }
}

#[cfg(feature = "serde")]
mod position_type {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::engine::PositionSide;

    pub fn serialize<S>(side: &PositionSide, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(side)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PositionSide, D::Error>
    where
        D: Deserializer<'de>,
    {
        match String::deserialize(deserializer)?.as_str() {
            "Long" => Ok(PositionSide::Long),
            "Short" => Ok(PositionSide::Short),
            other => Err(D::Error::unknown_variant(other, &["Long", "Short"])),
        }
    }
}

/// Renders a UTC timestamp as (`Mon DD, YYYY`, `HH:MM`); empty strings when out of range.
pub fn format_timestamp(timestamp: Timestamp) -> (String, String) {
    match crate::utils::to_datetime(timestamp) {
        Ok(datetime) => (
            datetime.format("%b %d, %Y").to_string(),
            datetime.format("%H:%M").to_string(),
        ),
        Err(_) => (String::new(), String::new()),
    }
}
