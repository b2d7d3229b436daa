use mockchart::prelude::*;

fn main() -> anyhow::Result<()> {
    let config = GeneratorConfig::default().interval_minutes(15).points(200);
    let chart = MockChart::from_seed(&config, 42, &SystemClock)?;

    let options = DrawOptions::default()
        .title("NSE 15m (mock)")
        .draw_output(DrawOutput::Svg("mock_chart.svg".into()));
    Draw::with_chart(&chart).with_options(options).plot()?;

    println!(
        "wrote mock_chart.svg: {} candles, {} trades",
        chart.candles().len(),
        chart.trades().len()
    );
    Ok(())
}
