use std::collections::HashSet;

use log::{debug, trace};
use rand::{Rng, seq::IteratorRandom};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Candle, Marker, PositionSide, Timestamp};
use crate::{
    PercentCalculus,
    errors::{Error, Result},
};

/// Smallest number of bars a trade stays open.
pub const MIN_EXIT_OFFSET: usize = 3;
/// Largest number of bars a trade stays open; the last `MAX_EXIT_OFFSET` candles never open a trade.
pub const MAX_EXIT_OFFSET: usize = 20;
/// Floor on the candle count accepted by [`generate_trades`].
pub const MIN_CANDLES: usize = 24;

/// A closed mock trade.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    id: String,
    side: PositionSide,
    entry_time: Timestamp,
    entry_price: f64,
    exit_time: Timestamp,
    exit_price: f64,
    entry_qty: u32,
    exit_qty: u32,
    pnl: f64,
    entry_signal: String,
    exit_signal: String,
}

type T1 = (PositionSide, (Timestamp, f64), (Timestamp, f64), u32);
impl From<T1> for Trade {
    /// Builds a fully closed trade from `(side, (entry time, entry price), (exit time, exit price), quantity)`.
    ///
    /// The id is `"000"` until [`generate_trades`] numbers the sorted set.
    fn from((side, (entry_time, entry_price), (exit_time, exit_price), quantity): T1) -> Self {
        Self {
            id: "000".to_string(),
            side,
            entry_time,
            entry_price,
            exit_time,
            exit_price,
            entry_qty: quantity,
            exit_qty: quantity,
            pnl: side.pnl(entry_price, exit_price, f64::from(quantity)),
            entry_signal: side.entry_signal().to_string(),
            exit_signal: side.exit_signal().to_string(),
        }
    }
}

impl Trade {
    /// Zero-padded sequence number, `"001"` for the earliest entry.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn side(&self) -> PositionSide {
        self.side
    }

    pub fn entry_time(&self) -> Timestamp {
        self.entry_time
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn exit_time(&self) -> Timestamp {
        self.exit_time
    }

    pub fn exit_price(&self) -> f64 {
        self.exit_price
    }

    pub fn entry_qty(&self) -> u32 {
        self.entry_qty
    }

    pub fn exit_qty(&self) -> u32 {
        self.exit_qty
    }

    /// Realized profit and loss.
    pub fn pnl(&self) -> f64 {
        self.pnl
    }

    pub fn entry_signal(&self) -> &str {
        &self.entry_signal
    }

    pub fn exit_signal(&self) -> &str {
        &self.exit_signal
    }

    /// Return of the trade as a percentage of the entry price, signed by side.
    pub fn pnl_percentage(&self) -> f64 {
        let change = self.entry_price.change(self.exit_price);
        match self.side {
            PositionSide::Long => change,
            PositionSide::Short => -change,
        }
    }
}

/// Trades and their chart markers, both sorted by time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSet {
    /// Trades sorted by entry time, numbered `"001"`, `"002"`, ...
    pub trades: Vec<Trade>,
    /// Two markers per trade, sorted by time.
    pub markers: Vec<Marker>,
}

/// Trade sampling settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOptions {
    min_trades: usize,
    max_trades: usize,
    max_quantity: u32,
    reserve_exit_indices: bool,
}

impl Default for TradeOptions {
    fn default() -> Self {
        Self {
            min_trades: 3,
            max_trades: 7,
            max_quantity: 5,
            reserve_exit_indices: false,
        }
    }
}

impl TradeOptions {
    /// Sets the inclusive range the trade count is drawn from.
    pub fn trades(mut self, min: usize, max: usize) -> Self {
        self.min_trades = min;
        self.max_trades = max;
        self
    }

    /// Sets the largest quantity a trade can have; quantities are drawn from `1..=max`.
    pub fn max_quantity(mut self, max: u32) -> Self {
        self.max_quantity = max.max(1);
        self
    }

    /// Also marks exit candles as used, so no later trade enters on an earlier exit.
    ///
    /// Off by default: only entry candles are excluded from later entry draws.
    pub fn reserve_exit_indices(mut self, reserve: bool) -> Self {
        self.reserve_exit_indices = reserve;
        self
    }

    /// Smallest candle count for which the entry range can never run out of free indices.
    pub fn minimum_candles(&self) -> usize {
        let slots = if self.reserve_exit_indices {
            self.max_trades * 2
        } else {
            self.max_trades
        };
        MIN_CANDLES.max(MAX_EXIT_OFFSET + 1 + slots)
    }

    fn validate(&self) -> Result<()> {
        if self.max_trades == 0 || self.min_trades > self.max_trades {
            return Err(Error::InvalidTradeRange(self.min_trades, self.max_trades));
        }
        Ok(())
    }
}

/// Samples random trades over `candles` and builds their markers.
///
/// Entries are drawn from every candle except the last `MAX_EXIT_OFFSET + 1`, never twice
/// from the same candle; exits land `MIN_EXIT_OFFSET..=MAX_EXIT_OFFSET` bars after the entry.
/// Prices are candle closes.
///
/// ### Arguments
/// * `candles` - Candles in ascending time order.
/// * `options` - Trade count, quantity and index reservation settings.
/// * `rng` - Random source.
///
/// ### Returns
/// The sorted and numbered trades with their markers, or an error when the options are
/// invalid or there are fewer candles than [`TradeOptions::minimum_candles`].
pub fn generate_trades<R>(candles: &[Candle], options: &TradeOptions, rng: &mut R) -> Result<TradeSet>
where
    R: Rng + ?Sized,
{
    options.validate()?;
    let required = options.minimum_candles();
    if candles.len() < required {
        return Err(Error::NotEnoughCandles {
            required,
            got: candles.len(),
        });
    }

    let count = rng.random_range(options.min_trades..=options.max_trades);
    let entry_range = candles.len().saturating_sub(MAX_EXIT_OFFSET + 1);
    let mut used = HashSet::with_capacity(count * 2);
    let mut trades = Vec::with_capacity(count);
    let mut markers = Vec::with_capacity(count * 2);

    for n in 1..=count {
        let entry_idx = pick_index(entry_range, &used, rng)?;
        used.insert(entry_idx);

        let max_offset = MAX_EXIT_OFFSET
            .min(candles.len() - 1 - entry_idx)
            .max(MIN_EXIT_OFFSET);
        let exit_idx = entry_idx + rng.random_range(MIN_EXIT_OFFSET..=max_offset);
        if options.reserve_exit_indices {
            used.insert(exit_idx);
        }

        let entry = candles.get(entry_idx).ok_or(Error::CandleNotFound(entry_idx))?;
        let exit = candles.get(exit_idx).ok_or(Error::CandleNotFound(exit_idx))?;
        let side = if rng.random_bool(0.5) {
            PositionSide::Long
        } else {
            PositionSide::Short
        };
        let quantity = rng.random_range(1..=options.max_quantity.max(1));

        let trade = Trade::from((side, (entry.time(), entry.close()), (exit.time(), exit.close()), quantity));
        trace!(
            "trade {n}: {side} x{quantity} candles {entry_idx}..{exit_idx}, pnl {:.2}",
            trade.pnl()
        );
        markers.extend(Marker::pair(n, &trade));
        trades.push(trade);
    }

    // stable sorts: ties keep generation order
    trades.sort_by_key(|t| t.entry_time);
    markers.sort_by_key(|m| m.time);
    for (i, trade) in trades.iter_mut().enumerate() {
        trade.id = format!("{:03}", i + 1);
    }

    debug!("generated {} trades over {} candles", trades.len(), candles.len());
    Ok(TradeSet { trades, markers })
}

/// Picks a uniformly random index in `0..range` that is not in `used`.
fn pick_index<R>(range: usize, used: &HashSet<usize>, rng: &mut R) -> Result<usize>
where
    R: Rng + ?Sized,
{
    (0..range)
        .filter(|idx| !used.contains(idx))
        .choose(rng)
        .ok_or(Error::IndexSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::engine::{CandleOptions, generate_candles};

    fn candles(len: usize, seed: u64) -> Vec<Candle> {
        let timestamps = (0..len as Timestamp).map(|i| 1_754_380_800 + i * 300).collect::<Vec<_>>();
        generate_candles(&timestamps, &CandleOptions::default(), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn trade_from_tuple() {
        let trade = Trade::from((PositionSide::Long, (0, 100.0), (60, 110.0), 2));
        assert_eq!(trade.id(), "000");
        assert_eq!(trade.pnl(), 20.0);
        assert_eq!(trade.entry_qty(), trade.exit_qty());
        assert_eq!(trade.entry_signal(), "Breakout Buy");
        assert!((trade.pnl_percentage() - 10.0).abs() < 1e-9);

        let trade = Trade::from((PositionSide::Short, (0, 100.0), (60, 110.0), 3));
        assert_eq!(trade.pnl(), -30.0);
        assert!((trade.pnl_percentage() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_candles() {
        let data = candles(27, 0);
        let result = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(Error::NotEnoughCandles { required: 28, got: 27 })));

        let options = TradeOptions::default().reserve_exit_indices(true);
        assert_eq!(options.minimum_candles(), 35);
        assert_eq!(TradeOptions::default().trades(1, 1).minimum_candles(), MIN_CANDLES);
    }

    #[test]
    fn invalid_trade_range() {
        let data = candles(100, 0);
        let mut rng = StdRng::seed_from_u64(0);
        let result = generate_trades(&data, &TradeOptions::default().trades(5, 2), &mut rng);
        assert!(matches!(result, Err(Error::InvalidTradeRange(5, 2))));
        let result = generate_trades(&data, &TradeOptions::default().trades(0, 0), &mut rng);
        assert!(matches!(result, Err(Error::InvalidTradeRange(0, 0))));
    }

    #[test]
    fn pick_index_exhausted() {
        let used = HashSet::from([0, 1, 2]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(pick_index(3, &used, &mut rng), Err(Error::IndexSpaceExhausted)));
        assert_eq!(pick_index(4, &used, &mut rng).unwrap(), 3);
        assert!(matches!(pick_index(0, &HashSet::new(), &mut rng), Err(Error::IndexSpaceExhausted)));
    }

    #[test]
    fn trade_count_within_bounds() {
        let data = candles(200, 1);
        for seed in 0..50 {
            let set = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!((3..=7).contains(&set.trades.len()));
            assert_eq!(set.markers.len(), set.trades.len() * 2);
        }
    }

    #[test]
    fn trades_are_sorted_and_numbered() {
        let data = candles(120, 2);
        let set = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(5)).unwrap();

        for (i, trade) in set.trades.iter().enumerate() {
            assert_eq!(trade.id(), format!("{:03}", i + 1));
        }
        assert!(set.trades.windows(2).all(|w| w[0].entry_time() <= w[1].entry_time()));
        assert!(set.markers.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn tied_markers_keep_generation_order() {
        // generation order is entry-1, exit-1, entry-2, exit-2, ...
        fn rank(id: &str) -> usize {
            let (kind, n) = id.split_once('-').unwrap();
            let n = n.parse::<usize>().unwrap();
            2 * (n - 1) + usize::from(kind == "exit")
        }

        // seven entries over the seven entry candles; exits of the first trades can only
        // land on later entries or on each other
        let data = candles(28, 9);
        let options = TradeOptions::default().trades(7, 7);
        let mut ties = 0;
        for seed in 0..200 {
            let set = generate_trades(&data, &options, &mut StdRng::seed_from_u64(seed)).unwrap();
            for w in set.markers.windows(2) {
                if w[0].time == w[1].time {
                    ties += 1;
                    assert!(rank(&w[0].id) < rank(&w[1].id), "{} before {}", w[0].id, w[1].id);
                }
            }
        }
        assert!(ties > 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn trade_json_shape() {
        let trade = Trade::from((PositionSide::Long, (0, 100.0), (60, 110.0), 2));
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["id"], "000");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["entryTime"], 0);
        assert_eq!(json["exitPrice"], 110.0);
        assert_eq!(json["entryQty"], 2);
        assert_eq!(json["pnl"], 20.0);
        assert_eq!(json["entrySignal"], "Breakout Buy");

        let short = Trade::from((PositionSide::Short, (0, 100.0), (60, 110.0), 1));
        assert_eq!(serde_json::to_value(&short).unwrap()["side"], "sell");
    }

    #[test]
    fn trades_use_candle_closes() {
        let data = candles(80, 3);
        let set = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(8)).unwrap();

        for trade in &set.trades {
            let entry = data.iter().position(|c| c.time() == trade.entry_time()).unwrap();
            let exit = data.iter().position(|c| c.time() == trade.exit_time()).unwrap();
            assert!(entry < data.len() - MAX_EXIT_OFFSET - 1);
            assert!((MIN_EXIT_OFFSET..=MAX_EXIT_OFFSET).contains(&(exit - entry)));
            assert_eq!(trade.entry_price(), data[entry].close());
            assert_eq!(trade.exit_price(), data[exit].close());
            assert!(trade.entry_time() < trade.exit_time());
            assert_eq!(trade.entry_qty(), trade.exit_qty());
            assert!((1..=5).contains(&trade.entry_qty()));

            let expected = trade.side().pnl(trade.entry_price(), trade.exit_price(), trade.entry_qty() as f64);
            assert_eq!(trade.pnl(), expected);
        }
    }

    #[test]
    fn entries_never_repeat() {
        let data = candles(28, 4);
        for seed in 0..100 {
            let set = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(seed)).unwrap();
            let entries = set.trades.iter().map(Trade::entry_time).collect::<HashSet<_>>();
            assert_eq!(entries.len(), set.trades.len());
        }
    }

    #[test]
    fn reserved_exits_are_never_entries() {
        let data = candles(35, 6);
        let options = TradeOptions::default().reserve_exit_indices(true);
        for seed in 0..100 {
            let set = generate_trades(&data, &options, &mut StdRng::seed_from_u64(seed)).unwrap();
            // marker ids keep the generation order
            let time_of = |id: String| set.markers.iter().find(|m| m.id == id).map(|m| m.time).unwrap();
            for n in 1..=set.trades.len() {
                let entry = time_of(format!("entry-{n}"));
                for earlier in 1..n {
                    assert_ne!(entry, time_of(format!("exit-{earlier}")));
                }
            }
        }
    }

    #[test]
    fn markers_reference_trades() {
        let data = candles(100, 7);
        let set = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(3)).unwrap();

        let entries = set.markers.iter().filter(|m| m.id.starts_with("entry-")).count();
        let exits = set.markers.iter().filter(|m| m.id.starts_with("exit-")).count();
        assert_eq!(entries, set.trades.len());
        assert_eq!(exits, set.trades.len());
        for trade in &set.trades {
            assert!(set.markers.iter().any(|m| m.time == trade.entry_time() && m.id.starts_with("entry-")));
            assert!(set.markers.iter().any(|m| m.time == trade.exit_time() && m.id.starts_with("exit-")));
        }
    }

    #[test]
    fn same_seed_same_trades() {
        let data = candles(100, 9);
        let a = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(21)).unwrap();
        let b = generate_trades(&data, &TradeOptions::default(), &mut StdRng::seed_from_u64(21)).unwrap();
        assert_eq!(a, b);
    }
}
