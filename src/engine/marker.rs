#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Timestamp, Trade};

/// Side of the bar a marker is drawn on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPosition {
    BelowBar,
    AboveBar,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Green,
    Red,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// A chart annotation for a trade entry or exit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// `entry-N` or `exit-N`, N being the trade's generation order.
    pub id: String,
    pub time: Timestamp,
    pub position: MarkerPosition,
    pub color: MarkerColor,
    pub shape: MarkerShape,
    pub text: String,
}

impl Marker {
    /// Builds the entry and exit markers of the `n`-th generated trade.
    pub(crate) fn pair(n: usize, trade: &Trade) -> [Marker; 2] {
        let side = trade.side();
        let (entry_color, entry_shape) = side.entry_style();
        let (exit_color, exit_shape) = side.exit_style();

        [
            Marker {
                id: format!("entry-{n}"),
                time: trade.entry_time(),
                position: MarkerPosition::BelowBar,
                color: entry_color,
                shape: entry_shape,
                text: format!("Entry {side} @ {:.2}", trade.entry_price()),
            },
            Marker {
                id: format!("exit-{n}"),
                time: trade.exit_time(),
                position: MarkerPosition::AboveBar,
                color: exit_color,
                shape: exit_shape,
                text: format!("Exit {side} @ {:.2}", trade.exit_price()),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PositionSide;

    #[test]
    fn long_pair() {
        let trade = Trade::from((PositionSide::Long, (60, 101.234), (360, 99.5), 2));
        let [entry, exit] = Marker::pair(4, &trade);

        assert_eq!(entry.id, "entry-4");
        assert_eq!(entry.time, 60);
        assert_eq!(entry.position, MarkerPosition::BelowBar);
        assert_eq!(entry.color, MarkerColor::Green);
        assert_eq!(entry.shape, MarkerShape::ArrowUp);
        assert_eq!(entry.text, "Entry Long @ 101.23");

        assert_eq!(exit.id, "exit-4");
        assert_eq!(exit.time, 360);
        assert_eq!(exit.position, MarkerPosition::AboveBar);
        assert_eq!(exit.color, MarkerColor::Red);
        assert_eq!(exit.shape, MarkerShape::ArrowDown);
        assert_eq!(exit.text, "Exit Long @ 99.50");
    }

    #[test]
    fn short_pair() {
        let trade = Trade::from((PositionSide::Short, (0, 150.0), (180, 140.0), 1));
        let [entry, exit] = Marker::pair(1, &trade);

        assert_eq!(entry.color, MarkerColor::Red);
        assert_eq!(entry.shape, MarkerShape::ArrowDown);
        assert_eq!(entry.text, "Entry Short @ 150.00");
        assert_eq!(exit.color, MarkerColor::Green);
        assert_eq!(exit.shape, MarkerShape::ArrowUp);
        assert_eq!(exit.text, "Exit Short @ 140.00");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_shape() {
        let trade = Trade::from((PositionSide::Long, (60, 100.0), (360, 110.0), 1));
        let [entry, exit] = Marker::pair(1, &trade);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "entry-1");
        assert_eq!(json["time"], 60);
        assert_eq!(json["position"], "belowBar");
        assert_eq!(json["color"], "green");
        assert_eq!(json["shape"], "arrowUp");
        assert_eq!(json["text"], "Entry Long @ 100.00");

        let json = serde_json::to_value(&exit).unwrap();
        assert_eq!(json["position"], "aboveBar");
        assert_eq!(json["color"], "red");
        assert_eq!(json["shape"], "arrowDown");
    }
}
