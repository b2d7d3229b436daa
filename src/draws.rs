//! Module for rendering a generated chart: candles, overlay and trade markers.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::PercentCalculus;
use crate::engine::{Candle, MarkerColor, MarkerPosition, MarkerShape, MockChart, Timestamp};
use crate::errors::{Error, Result};
#[cfg(feature = "metrics")]
use crate::metrics::Metrics;
use crate::utils::to_datetime;

use chrono::{DateTime, Duration, Utc};
use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::WHITE;

/// Aspect ratio for the generated charts.
const ASPECT_RATIO: f64 = 0.5625;
/// Size of the X-axis labels.
const X_LABEL_SIZE: i32 = 20;
/// Size of the Y-axis labels.
const Y_LABEL_SIZE: i32 = 20;
/// Distance between a marker and its bar, in percent of the price.
const MARKER_GAP_PERCENT: f64 = 1.0;

/// Output formats for the generated charts with output filename.
#[derive(Default)]
pub enum DrawOutput {
    /// Save to the output SVG file.
    Svg(PathBuf),
    /// Save to the output PNG file.
    Png(PathBuf),
    /// Save to the output HTML file (not implemented).
    Html(PathBuf),
    /// Print to the current console (not implemented).
    #[default]
    Inner,
}

/// Configuration options for chart generation.
pub struct DrawOptions {
    /// Chart title.
    title: Option<String>,
    /// Output format and path.
    output: DrawOutput,
    /// Whether to draw the indicator line.
    show_indicator: bool,
    /// Whether to draw the trade markers.
    show_markers: bool,
    #[cfg(feature = "metrics")]
    /// Whether to show the metrics chart.
    show_metrics: bool,
    #[cfg(feature = "metrics")]
    /// Balance the metrics equity curve starts from.
    initial_balance: f64,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            title: None,
            output: DrawOutput::default(),
            show_indicator: true,
            show_markers: true,
            #[cfg(feature = "metrics")]
            show_metrics: false,
            #[cfg(feature = "metrics")]
            initial_balance: 10_000.0,
        }
    }
}

impl DrawOptions {
    /// Sets the chart title.
    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the output format and path.
    pub fn draw_output(mut self, output: DrawOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables the indicator line.
    pub fn show_indicator(mut self, show: bool) -> Self {
        self.show_indicator = show;
        self
    }

    /// Enables or disables the trade markers.
    pub fn show_markers(mut self, show: bool) -> Self {
        self.show_markers = show;
        self
    }

    #[cfg(feature = "metrics")]
    /// Enables or disables the metrics chart.
    pub fn show_metrics(mut self, show: bool) -> Self {
        self.show_metrics = show;
        self
    }

    #[cfg(feature = "metrics")]
    /// Sets the balance the metrics are computed from.
    pub fn initial_balance(mut self, balance: f64) -> Self {
        self.initial_balance = balance;
        self
    }
}

/// Chart drawing utility for generated data.
#[derive(Default)]
pub struct Draw<'d> {
    /// Reference to the chart data.
    chart: Option<&'d MockChart>,
    /// Drawing options.
    options: DrawOptions,
}

impl<'d> Draw<'d> {
    /// Creates a new `Draw` instance with the given chart.
    pub fn with_chart(chart: &'d MockChart) -> Self {
        Self {
            chart: Some(chart),
            options: DrawOptions::default(),
        }
    }

    /// Sets the drawing options.
    pub fn with_options(mut self, options: DrawOptions) -> Self {
        self.options = options;
        self
    }

    /// Generates and saves the chart based on the configured options.
    pub fn plot(&self) -> Result<()> {
        let chart = self.chart.ok_or(Error::Msg("No chart provided".to_string()))?;
        let candles = chart
            .candles()
            .map(|c| to_datetime(c.time()).map(|datetime| (datetime, c)))
            .collect::<Result<Vec<_>>>()?;
        if candles.is_empty() {
            return Err(Error::Msg("Chart has no candles".to_string()));
        }

        let title = self.options.title.as_deref().unwrap_or("Mock Chart");
        #[allow(unused_mut)]
        let mut height_factor = 1.0;
        #[cfg(feature = "metrics")]
        if self.options.show_metrics {
            height_factor += 0.4;
        }

        let candle_count = candles.len() as u32;
        let width = 1280.max(10 * candle_count);
        let height = ((width as f64 * ASPECT_RATIO * height_factor) as u32).min(900);

        match &self.options.output {
            DrawOutput::Svg(path) => {
                let root = SVGBackend::new(path, (width, height)).into_drawing_area();
                root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
                self.draw_chart(&root, &candles, chart, title)
            }
            DrawOutput::Png(path) => {
                let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
                root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
                self.draw_chart(&root, &candles, chart, title)
            }
            DrawOutput::Html(_) => Err(Error::Msg("HTML output is not implemented".to_string())),
            DrawOutput::Inner => Err(Error::Msg("Inner display is not implemented".to_string())),
        }
    }

    /// Draws the main chart with price and metrics.
    fn draw_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[(DateTime<Utc>, &Candle)],
        chart: &MockChart,
        title: &str,
    ) -> Result<()> {
        #[cfg(not(feature = "metrics"))]
        let price_area = drawing_area;
        #[cfg(feature = "metrics")]
        let (metrics_area, price_area) = if self.options.show_metrics {
            let total_height = drawing_area.dim_in_pixel().1 as f64;
            drawing_area.split_vertically((total_height * 0.2) as u32)
        } else {
            (drawing_area.clone(), drawing_area.clone())
        };

        self.draw_price_chart(&price_area, candles, chart, title)?;
        #[cfg(feature = "metrics")]
        if self.options.show_metrics {
            self.draw_metrics_chart(&metrics_area, chart)?;
        }

        drawing_area.present().map_err(|e| Error::Plotters(e.to_string()))
    }

    /// Draws the price chart (candlesticks, indicator and markers).
    fn draw_price_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[(DateTime<Utc>, &Candle)],
        chart: &MockChart,
        title: &str,
    ) -> Result<()> {
        let min_price = candles.iter().map(|(_, c)| c.low()).fold(f64::INFINITY, f64::min);
        let max_price = candles.iter().map(|(_, c)| c.high()).fold(f64::NEG_INFINITY, f64::max);
        let first_time = candles.first().map(|(t, _)| *t).ok_or(Error::CandleNotFound(0))?;
        let last_time = candles.last().map(|(t, _)| *t).ok_or(Error::CandleNotFound(candles.len()))?;
        let bar = bar_duration(candles);
        let price_range = max_price - min_price;
        let price_padding = (price_range * 0.1).max(1.0);

        let drawing_area = drawing_area.margin(10, 10, 70, 70);
        let mut price_chart = ChartBuilder::on(&drawing_area)
            .caption(title, ("sans-serif", 30).into_font())
            .x_label_area_size(X_LABEL_SIZE)
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(
                first_time - bar..last_time + bar,
                min_price - price_padding..max_price + price_padding,
            )
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let x_labels = (candles.len() / 15).max(2);
        price_chart
            .configure_mesh()
            .y_desc("Price")
            .x_desc("Time")
            .x_label_style(("sans-serif", X_LABEL_SIZE))
            .y_label_style(("sans-serif", Y_LABEL_SIZE))
            .x_labels(x_labels)
            .y_labels(5)
            .draw()
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let candle_width = {
            let total_width = drawing_area.dim_in_pixel().0 as f64;
            let available_width = total_width - (X_LABEL_SIZE * 2) as f64;
            (available_width / candles.len() as f64 * 0.7).max(2.0) as u32
        };

        price_chart
            .draw_series(candles.iter().map(|(x, c)| {
                let color = if c.is_bullish() { GREEN.filled() } else { RED.filled() };
                CandleStick::new(*x, c.open(), c.high(), c.low(), c.close(), color, color, candle_width)
            }))
            .map_err(|e| Error::Plotters(e.to_string()))?;

        if self.options.show_indicator {
            let indicator = chart.indicator();
            let points = indicator
                .data
                .iter()
                .filter_map(|p| to_datetime(p.time).ok().map(|t| (t, p.value)))
                .collect::<Vec<_>>();

            price_chart
                .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
                .map_err(|e| Error::Plotters(e.to_string()))?
                .label(indicator.name.as_str())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

            price_chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        if self.options.show_markers {
            let by_time = candles
                .iter()
                .map(|(t, c)| (c.time(), (*t, *c)))
                .collect::<HashMap<Timestamp, _>>();

            let placed = chart
                .markers()
                .filter_map(|m| {
                    let (x, candle) = by_time.get(&m.time)?;
                    let y = match m.position {
                        MarkerPosition::BelowBar => candle.low().subpercent(MARKER_GAP_PERCENT),
                        MarkerPosition::AboveBar => candle.high().addpercent(MARKER_GAP_PERCENT),
                    };
                    let color = match m.color {
                        MarkerColor::Green => GREEN,
                        MarkerColor::Red => RED,
                    };
                    Some(((*x, y), color, m.shape))
                })
                .collect::<Vec<_>>();

            let up = placed.iter().filter(|(_, _, shape)| *shape == MarkerShape::ArrowUp);
            let down = placed.iter().filter(|(_, _, shape)| *shape == MarkerShape::ArrowDown);

            price_chart
                .draw_series(up.map(|(coord, color, _)| TriangleMarker::new(*coord, 6, color.filled())))
                .map_err(|e| Error::Plotters(e.to_string()))?;
            price_chart
                .draw_series(down.map(|(coord, color, _)| {
                    EmptyElement::at(*coord) + Polygon::new(vec![(-6, -5), (6, -5), (0, 6)], color.filled())
                }))
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        Ok(())
    }

    /// Draws the metrics chart (if the "metrics" feature is enabled).
    #[cfg(feature = "metrics")]
    fn draw_metrics_chart<DB: DrawingBackend>(&self, drawing_area: &DrawingArea<DB, Shift>, chart: &MockChart) -> Result<()> {
        let metrics = Metrics::from_chart(chart, self.options.initial_balance);
        let max_drawdown = metrics.max_drawdown();
        let profit_factor = metrics.profit_factor();
        let sharpe_ratio = metrics.sharpe_ratio(0.0);
        let win_rate = metrics.win_rate();

        let drawing_area = drawing_area.margin(30, 0, 70, 70);
        let mut metrics_chart = ChartBuilder::on(&drawing_area)
            .margin(20)
            .build_cartesian_2d(0.0..1.0, 0f64..100f64)
            .map_err(|e| Error::Plotters(e.to_string()))?;

        metrics_chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .draw()
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let text = Text::new(
            format!(
                "P&L: {:.2} | Max Drawdown: {:.2}% | Profit Factor: {:.2} | Sharpe Ratio: {:.2} | Win Rate: {:.2}%",
                metrics.pnl(),
                max_drawdown,
                profit_factor,
                sharpe_ratio,
                win_rate
            ),
            (0.0, 50.0),
            ("sans-serif", 28).into_font(),
        );

        metrics_chart
            .draw_series([text])
            .map(|_| ())
            .map_err(|e| Error::Plotters(e.to_string()))
    }
}

/// Smallest gap between two bars, used to pad the time axis; one minute when there is a single bar.
fn bar_duration(candles: &[(DateTime<Utc>, &Candle)]) -> Duration {
    candles
        .windows(2)
        .map(|w| w[1].0 - w[0].0)
        .filter(|gap| *gap > Duration::zero())
        .min()
        .unwrap_or(Duration::minutes(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::GeneratorConfig, utils::FixedClock};

    fn chart() -> MockChart {
        let clock = FixedClock::from_timestamp(1_754_380_800).unwrap();
        MockChart::from_seed(&GeneratorConfig::default().points(60), 3, &clock).unwrap()
    }

    #[test]
    fn plot_without_chart() {
        assert!(matches!(Draw::default().plot(), Err(Error::Msg(_))));
    }

    #[test]
    fn plot_html_not_implemented() {
        let chart = chart();
        let options = DrawOptions::default().draw_output(DrawOutput::Html("chart.html".into()));
        assert!(matches!(Draw::with_chart(&chart).with_options(options).plot(), Err(Error::Msg(_))));
    }

    #[test]
    #[ignore = "needs system fonts for captions and axis labels"]
    fn plot_svg() {
        let chart = chart();
        let path = std::env::temp_dir().join("mockchart-plot-test.svg");
        let options = DrawOptions::default()
            .title("Test")
            .draw_output(DrawOutput::Svg(path.clone()));

        Draw::with_chart(&chart).with_options(options).plot().unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        let _ = std::fs::remove_file(path);
    }
}
