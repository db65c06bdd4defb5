// Prediction overlay - Joins a forecast onto the historical chart
//
// The forecast line starts at the last historical value and each forecast
// day is preceded by SPACERS_PER_DAY interpolated spacer points. Point radii
// are categorical: historical 0, spacer 1, forecast 8.
use crate::domain::labels::format_day_stamp;
use crate::domain::sensor::SensorType;
use crate::domain::telemetry::{ChartData, Dataset, ForecastResponse, TimeSeries};
use crate::domain::threshold::{worst_tier, ThresholdTable, NEUTRAL_COLOR};

pub const SPACERS_PER_DAY: usize = 4;

pub const HISTORICAL_RADIUS: u8 = 0;
pub const SPACER_RADIUS: u8 = 1;
pub const FORECAST_RADIUS: u8 = 8;

const PREDICTION_NAME: &str = "Predicción";

/// Chart holding only the historical line.
pub fn historical_chart(sensor: SensorType, historical: &TimeSeries) -> ChartData {
    let n = historical.len();
    let mut labels = historical.labels.clone();
    labels.resize(n, String::new());

    ChartData::new(
        labels,
        Dataset::new(
            sensor.title().to_string(),
            sensor.line_color().to_string(),
            historical.values.clone(),
            vec![HISTORICAL_RADIUS; n],
        ),
        None,
    )
}

/// Worst-point-wins colour for metrics with thresholds; neutral otherwise.
pub fn forecast_color(sensor: SensorType, values: impl IntoIterator<Item = f64>) -> &'static str {
    match ThresholdTable::for_sensor(sensor) {
        Some(table) => worst_tier(values, table).color(),
        None => NEUTRAL_COLOR,
    }
}

/// Splice `forecast` onto `historical`. An unusable forecast yields the
/// historical-only chart.
pub fn compose(sensor: SensorType, historical: &TimeSeries, forecast: &ForecastResponse) -> ChartData {
    let mut chart = historical_chart(sensor, historical);
    if !forecast.is_usable() {
        return chart;
    }

    let n = historical.len();
    let total = n + forecast.predictions.len() * (SPACERS_PER_DAY + 1);

    let mut values: Vec<Option<f64>> = vec![None; n];
    let mut radius = vec![HISTORICAL_RADIUS; n];
    chart.labels.reserve(total - n);

    let anchor = historical.last_value();
    if !historical.is_empty() {
        values[n - 1] = anchor;
    }

    let mut previous = anchor;
    for (day, point) in forecast.predictions.iter().enumerate() {
        let from = previous.unwrap_or(point.value);
        for step in 1..=SPACERS_PER_DAY {
            let t = step as f64 / (SPACERS_PER_DAY + 1) as f64;
            values.push(Some(from + (point.value - from) * t));
            radius.push(SPACER_RADIUS);
            chart.labels.push(if step - 1 == SPACERS_PER_DAY / 2 {
                format!("Día {}", day + 1)
            } else {
                String::new()
            });
        }

        values.push(Some(point.value));
        radius.push(FORECAST_RADIUS);
        chart.labels.push(format_day_stamp(&point.timestamp));
        previous = Some(point.value);
    }

    chart.historical.values.resize(total, None);
    chart.historical.point_radius.resize(total, HISTORICAL_RADIUS);

    let color = forecast_color(sensor, forecast.predictions.iter().map(|p| p.value));
    chart.prediction = Some(Dataset::new(
        PREDICTION_NAME.to_string(),
        color.to_string(),
        values,
        radius,
    ));
    chart
}

/// Drop the overlay, truncating everything back to `historical_len` points.
pub fn strip_overlay(chart: &ChartData, historical_len: usize) -> ChartData {
    let mut historical = chart.historical.clone();
    historical.values.truncate(historical_len);
    historical.point_radius.truncate(historical_len);

    let mut labels = chart.labels.clone();
    labels.truncate(historical_len);

    ChartData::new(labels, historical, None)
}
