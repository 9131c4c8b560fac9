//! Forecast bundle wire types and the chart-row assembly pipeline.
//!
//! The backend returns three positionally aligned sub-series (train, test,
//! future). They are zipped into [`ChartPoint`] rows, filtered by
//! [`ViewMode`] and sorted by date. A `null` anywhere in an array becomes
//! `None`, which Plotly draws as a gap rather than a zero.

use crate::error::DashboardError;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// A nullable, possibly missing array from the backend.
pub type Column<T> = Option<Vec<Option<T>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainSeries {
    #[serde(default)]
    pub dates: Column<String>,
    #[serde(default)]
    pub actual: Column<f64>,
    #[serde(default)]
    pub fitted: Column<f64>,
    #[serde(default)]
    pub lower: Column<f64>,
    #[serde(default)]
    pub upper: Column<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSeries {
    #[serde(default)]
    pub dates: Column<String>,
    #[serde(default)]
    pub actual: Column<f64>,
    #[serde(default)]
    pub predicted: Column<f64>,
    #[serde(default)]
    pub lower: Column<f64>,
    #[serde(default)]
    pub upper: Column<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FutureSeries {
    #[serde(default)]
    pub dates: Column<String>,
    #[serde(default)]
    pub predicted: Column<f64>,
    #[serde(default)]
    pub lower: Column<f64>,
    #[serde(default)]
    pub upper: Column<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub impact_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestMetrics {
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default)]
    pub mae: Option<f64>,
    #[serde(default)]
    pub mape: Option<f64>,
    #[serde(default)]
    pub r2: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub test: Option<TestMetrics>,
}

/// Model decomposition, aligned with train ++ test ++ future dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub trend: Column<f64>,
    #[serde(default)]
    pub yearly: Column<f64>,
    #[serde(default)]
    pub weekly: Column<f64>,
}

/// The unwrapped `forecast` field of `GET /forecast/{linea}/{estacion}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    #[serde(default)]
    pub train: Option<TrainSeries>,
    #[serde(default)]
    pub test: Option<TestSeries>,
    #[serde(default)]
    pub forecast: Option<FutureSeries>,
    #[serde(default)]
    pub anomalies: Option<Vec<Anomaly>>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub components: Option<Components>,
}

impl ForecastBundle {
    pub fn test_metrics(&self) -> Option<&TestMetrics> {
        self.metrics.as_ref().and_then(|m| m.test.as_ref())
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        self.anomalies.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Train,
    Test,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    Train,
    Test,
    Future,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [ViewMode::All, ViewMode::Train, ViewMode::Test, ViewMode::Future];

    pub fn includes(&self, kind: SeriesType) -> bool {
        match self {
            ViewMode::All => true,
            ViewMode::Train => kind == SeriesType::Train,
            ViewMode::Test => kind == SeriesType::Test,
            ViewMode::Future => kind == SeriesType::Future,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::All => "Todo",
            ViewMode::Train => "Entrenamiento",
            ViewMode::Test => "Validación",
            ViewMode::Future => "Pronóstico",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One merged chart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub fecha: String,
    pub actual: Option<f64>,
    pub fitted: Option<f64>,
    /// `test.predicted`, kept apart from the future prediction line.
    pub validation_predicted: Option<f64>,
    /// `forecast.predicted`.
    pub predicted: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    #[serde(rename = "type")]
    pub kind: SeriesType,
}

impl ChartPoint {
    fn empty(fecha: String, kind: SeriesType) -> Self {
        Self {
            fecha,
            actual: None,
            fitted: None,
            validation_predicted: None,
            predicted: None,
            lower: None,
            upper: None,
            kind,
        }
    }
}

/// Result of assembling chart rows for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub points: Vec<ChartPoint>,
    /// Rows whose `fecha` could not be parsed; they keep their position.
    pub unparsed_dates: usize,
}

impl ChartData {
    /// Malformed rows are reported, not raised; the chart still renders.
    pub fn rendering_issue(&self) -> Option<DashboardError> {
        (self.unparsed_dates > 0).then(|| {
            DashboardError::Rendering(format!(
                "{} filas con fecha no válida se muestran sin ordenar",
                self.unparsed_dates
            ))
        })
    }
}

fn cell<T: Clone>(column: &Column<T>, i: usize) -> Option<T> {
    column.as_ref().and_then(|c| c.get(i)).cloned().flatten()
}

/// Finite value at `i`, or `None`.
fn value(column: &Column<f64>, i: usize) -> Option<f64> {
    cell(column, i).filter(|v| v.is_finite())
}

/// Shortest length among the columns that are present; missing columns do
/// not constrain the zip.
fn zip_bound(dates: &Column<String>, values: &[&Column<f64>]) -> usize {
    let dates_len = dates.as_ref().map_or(0, Vec::len);
    values
        .iter()
        .filter_map(|c| c.as_ref().map(Vec::len))
        .fold(dates_len, usize::min)
}

fn zip_rows<F>(
    dates: &Column<String>,
    values: &[&Column<f64>],
    kind: SeriesType,
    mut fill: F,
) -> Vec<ChartPoint>
where
    F: FnMut(&mut ChartPoint, usize),
{
    let bound = zip_bound(dates, values);
    let declared = dates.as_ref().map_or(0, Vec::len);
    if bound < declared {
        warn!(?kind, dates = declared, bound, "Sub-series arrays have mismatched lengths; truncating");
    }

    (0..bound)
        .filter_map(|i| {
            let Some(fecha) = cell(dates, i).filter(|d| !d.is_empty()) else {
                debug!(?kind, index = i, "Skipping row without date");
                return None;
            };
            let mut point = ChartPoint::empty(fecha, kind);
            fill(&mut point, i);
            Some(point)
        })
        .collect()
}

fn merge_train(train: &TrainSeries) -> Vec<ChartPoint> {
    zip_rows(
        &train.dates,
        &[&train.actual, &train.fitted, &train.lower, &train.upper],
        SeriesType::Train,
        |p, i| {
            p.actual = value(&train.actual, i);
            p.fitted = value(&train.fitted, i);
            p.lower = value(&train.lower, i);
            p.upper = value(&train.upper, i);
        },
    )
}

fn merge_test(test: &TestSeries) -> Vec<ChartPoint> {
    zip_rows(
        &test.dates,
        &[&test.actual, &test.predicted, &test.lower, &test.upper],
        SeriesType::Test,
        |p, i| {
            p.actual = value(&test.actual, i);
            p.validation_predicted = value(&test.predicted, i);
            p.lower = value(&test.lower, i);
            p.upper = value(&test.upper, i);
        },
    )
}

fn merge_future(future: &FutureSeries) -> Vec<ChartPoint> {
    zip_rows(
        &future.dates,
        &[&future.predicted, &future.lower, &future.upper],
        SeriesType::Future,
        |p, i| {
            p.predicted = value(&future.predicted, i);
            p.lower = value(&future.lower, i);
            p.upper = value(&future.upper, i);
        },
    )
}

/// Zips every sub-series into tagged rows, in train, test, future order.
pub fn merge(bundle: &ForecastBundle) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    if let Some(train) = &bundle.train {
        points.extend(merge_train(train));
    }
    if let Some(test) = &bundle.test {
        points.extend(merge_test(test));
    }
    if let Some(future) = &bundle.forecast {
        points.extend(merge_future(future));
    }
    points
}

pub fn filter_by_mode(points: Vec<ChartPoint>, mode: ViewMode) -> Vec<ChartPoint> {
    points.into_iter().filter(|p| mode.includes(p.kind)).collect()
}

/// Parses `YYYY-MM-DD`, `YYYY-MM` or an RFC 3339 timestamp.
pub fn parse_fecha(fecha: &str) -> Option<NaiveDate> {
    let fecha = fecha.trim();
    NaiveDate::parse_from_str(fecha, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", fecha), "%Y-%m-%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(fecha).ok().map(|dt| dt.date_naive()))
}

/// Sorts rows ascending by date. Rows whose date does not parse stay in
/// their slot; the dated rows are stably sorted among the other slots.
/// Returns the number of rows left in place.
pub fn sort_by_date(points: &mut [ChartPoint]) -> usize {
    let mut dated: Vec<(usize, NaiveDate)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| parse_fecha(&p.fecha).map(|d| (i, d)))
        .collect();
    let unparsed = points.len() - dated.len();

    let slots: Vec<usize> = dated.iter().map(|(i, _)| *i).collect();
    dated.sort_by_key(|(_, date)| *date);
    let sorted: Vec<ChartPoint> = dated.iter().map(|(i, _)| points[*i].clone()).collect();

    for (slot, point) in slots.into_iter().zip(sorted) {
        points[slot] = point;
    }

    unparsed
}

/// Merge, filter by mode, then sort.
pub fn build_chart_data(bundle: &ForecastBundle, mode: ViewMode) -> ChartData {
    let mut points = filter_by_mode(merge(bundle), mode);
    let unparsed_dates = sort_by_date(&mut points);
    if unparsed_dates > 0 {
        warn!(unparsed_dates, ?mode, "Forecast rows with unparseable dates left unsorted");
    }
    debug!(rows = points.len(), ?mode, "Assembled forecast chart rows");

    ChartData {
        points,
        unparsed_dates,
    }
}

/// Shaded date range drawn over the chart, independent of the view mode.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyBand {
    pub start: String,
    pub end: String,
    pub label: String,
}

/// Bands drawn for one bundle, plus the entries that could not be placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyOverlay {
    pub bands: Vec<AnomalyBand>,
    /// Entries without a start or end date.
    pub skipped: usize,
}

impl AnomalyOverlay {
    pub fn rendering_issue(&self) -> Option<DashboardError> {
        (self.skipped > 0).then(|| {
            DashboardError::Rendering(format!(
                "{} periodos anómalos sin fechas se omitieron",
                self.skipped
            ))
        })
    }
}

const UNNAMED_ANOMALY: &str = "Anomalía";

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub fn anomaly_bands(bundle: &ForecastBundle) -> AnomalyOverlay {
    let anomalies = bundle.anomalies();
    let bands: Vec<AnomalyBand> = anomalies
        .iter()
        .filter_map(|a| {
            let start = non_blank(&a.start_date)?;
            let end = non_blank(&a.end_date)?;
            let name = non_blank(&a.name).unwrap_or(UNNAMED_ANOMALY);
            Some(AnomalyBand {
                start: start.to_string(),
                end: end.to_string(),
                label: match a.impact_percent.filter(|v| v.is_finite()) {
                    Some(impact) => format!("{} ({:.1}%)", name, impact),
                    None => name.to_string(),
                },
            })
        })
        .collect();

    let skipped = anomalies.len() - bands.len();
    if skipped > 0 {
        warn!(skipped, "Anomalies without start or end date left off the overlay");
    }
    AnomalyOverlay { bands, skipped }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub fecha: String,
    pub trend: Option<f64>,
}

/// Pairs the trend component with train ++ test ++ future dates, stopping
/// at the shorter of the two.
pub fn trend_points(bundle: &ForecastBundle) -> Vec<TrendPoint> {
    let Some(trend) = bundle.components.as_ref().and_then(|c| c.trend.as_ref()) else {
        return Vec::new();
    };

    let dates = [
        bundle.train.as_ref().and_then(|s| s.dates.as_ref()),
        bundle.test.as_ref().and_then(|s| s.dates.as_ref()),
        bundle.forecast.as_ref().and_then(|s| s.dates.as_ref()),
    ];

    dates
        .into_iter()
        .flatten()
        .flatten()
        .zip(trend)
        .filter_map(|(fecha, value)| {
            Some(TrendPoint {
                fecha: fecha.clone()?,
                trend: (*value).filter(|v| v.is_finite()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(value: serde_json::Value) -> ForecastBundle {
        serde_json::from_value(value).unwrap()
    }

    fn fechas(points: &[ChartPoint]) -> Vec<&str> {
        points.iter().map(|p| p.fecha.as_str()).collect()
    }

    #[test]
    fn test_null_becomes_absent() {
        let b = bundle(json!({
            "train": {
                "dates": ["2021-01-01", "2021-02-01"],
                "actual": [10, null],
                "fitted": [9, 11]
            }
        }));

        let points = merge(&b);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.kind == SeriesType::Train));
        assert_eq!(points[0].actual, Some(10.0));
        assert_eq!(points[1].actual, None);
        assert_eq!(points[1].fitted, Some(11.0));
    }

    #[test]
    fn test_absent_serializes_as_null() {
        let b = bundle(json!({"train": {"dates": ["2021-01-01"], "actual": [null]}}));
        let row = serde_json::to_value(&merge(&b)[0]).unwrap();
        assert_eq!(row["actual"], serde_json::Value::Null);
        assert_eq!(row["type"], "train");
    }

    #[test]
    fn test_validation_and_future_predictions_stay_apart() {
        let b = bundle(json!({
            "test": {"dates": ["2023-06-01"], "actual": [100], "predicted": [95]},
            "forecast": {"dates": ["2023-06-01"], "predicted": [120]}
        }));

        let data = build_chart_data(&b, ViewMode::All);
        assert_eq!(data.points.len(), 2);

        let test_row = data.points.iter().find(|p| p.kind == SeriesType::Test).unwrap();
        let future_row = data.points.iter().find(|p| p.kind == SeriesType::Future).unwrap();
        assert_eq!(test_row.validation_predicted, Some(95.0));
        assert_eq!(test_row.predicted, None);
        assert_eq!(future_row.predicted, Some(120.0));
        assert_eq!(future_row.validation_predicted, None);
    }

    #[test]
    fn test_zip_stops_at_shorter_array() {
        let b = bundle(json!({
            "train": {
                "dates": ["2021-01-01", "2021-02-01", "2021-03-01"],
                "actual": [1, 2],
                "fitted": [1, 2, 3]
            }
        }));

        assert_eq!(merge(&b).len(), 2);
    }

    #[test]
    fn test_missing_arrays_do_not_truncate() {
        let b = bundle(json!({"forecast": {"dates": ["2024-03-01", "2024-04-01"], "predicted": [5, 6]}}));
        let points = merge(&b);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].lower, None);
    }

    #[test]
    fn test_rows_without_date_are_skipped() {
        let b = bundle(json!({"train": {"dates": ["2021-01-01", null], "actual": [1, 2]}}));
        assert_eq!(fechas(&merge(&b)), vec!["2021-01-01"]);
    }

    #[test]
    fn test_mode_filter_is_idempotent() {
        let b = bundle(json!({
            "train": {"dates": ["2021-01-01"], "actual": [1]},
            "test": {"dates": ["2021-02-01"], "actual": [2]},
            "forecast": {"dates": ["2021-03-01"], "predicted": [3]}
        }));

        let once = filter_by_mode(merge(&b), ViewMode::Train);
        let twice = filter_by_mode(once.clone(), ViewMode::Train);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);

        assert_eq!(filter_by_mode(merge(&b), ViewMode::All).len(), 3);
        assert_eq!(filter_by_mode(merge(&b), ViewMode::Future)[0].predicted, Some(3.0));
    }

    #[test]
    fn test_sort_by_month() {
        let b = bundle(json!({"train": {"dates": ["2021-03", "2021-01", "2021-02"], "actual": [3, 1, 2]}}));

        let data = build_chart_data(&b, ViewMode::All);
        assert_eq!(fechas(&data.points), vec!["2021-01", "2021-02", "2021-03"]);
        assert_eq!(data.points[0].actual, Some(1.0));
        assert_eq!(data.unparsed_dates, 0);
        assert!(data.rendering_issue().is_none());
    }

    #[test]
    fn test_sort_across_sub_series() {
        let b = bundle(json!({
            "forecast": {"dates": ["2024-01-01"], "predicted": [3]},
            "train": {"dates": ["2023-12-01", "2023-01-01"], "actual": [2, 1]}
        }));

        let data = build_chart_data(&b, ViewMode::All);
        assert_eq!(fechas(&data.points), vec!["2023-01-01", "2023-12-01", "2024-01-01"]);
    }

    #[test]
    fn test_unparseable_dates_stay_in_place() {
        let b = bundle(json!({
            "train": {"dates": ["2021-03-01", "pronto", "2021-01-01", "2021-02-01"]}
        }));

        let data = build_chart_data(&b, ViewMode::All);
        assert_eq!(data.unparsed_dates, 1);
        assert!(matches!(data.rendering_issue(), Some(DashboardError::Rendering(_))));
        assert_eq!(
            fechas(&data.points),
            vec!["2021-01-01", "pronto", "2021-02-01", "2021-03-01"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let b = bundle(json!({
            "test": {"dates": ["2023-06-01"], "predicted": [1]},
            "forecast": {"dates": ["2023-06-01"], "predicted": [2]}
        }));

        let data = build_chart_data(&b, ViewMode::All);
        assert_eq!(data.points[0].kind, SeriesType::Test);
        assert_eq!(data.points[1].kind, SeriesType::Future);
    }

    #[test]
    fn test_parse_fecha_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 1);
        assert_eq!(parse_fecha("2020-03-01"), expected);
        assert_eq!(parse_fecha("2020-03"), expected);
        assert_eq!(parse_fecha("2020-03-01T00:00:00Z"), expected);
        assert_eq!(parse_fecha("marzo"), None);
    }

    #[test]
    fn test_anomaly_bands() {
        let b = bundle(json!({
            "anomalies": [
                {"name": "COVID-19", "start_date": "2020-03-01", "end_date": "2020-08-31", "impact_percent": 65.27},
                {"name": "Cierre", "start_date": "2021-01-01", "end_date": "2021-02-01"}
            ]
        }));

        let overlay = anomaly_bands(&b);
        assert!(overlay.rendering_issue().is_none());
        let bands = overlay.bands;
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].label, "COVID-19 (65.3%)");
        assert_eq!(bands[0].end, "2020-08-31");
        assert_eq!(bands[1].label, "Cierre");
    }

    #[test]
    fn test_incomplete_anomalies_do_not_fail_the_bundle() {
        let b = bundle(json!({
            "train": {"dates": ["2020-01-01", "2020-02-01"], "actual": [100.0, 120.0]},
            "anomalies": [
                {"start_date": "2020-03-01", "end_date": "2020-08-31", "impact_percent": 50.0},
                {"name": "Sin fin", "start_date": "2021-01-01"},
                {"name": "Vacío", "start_date": "", "end_date": "2021-02-01"}
            ]
        }));

        assert_eq!(merge(&b).len(), 2);

        let overlay = anomaly_bands(&b);
        assert_eq!(overlay.bands.len(), 1);
        assert_eq!(overlay.bands[0].label, "Anomalía (50.0%)");
        assert_eq!(overlay.skipped, 2);
        assert!(matches!(overlay.rendering_issue(), Some(DashboardError::Rendering(_))));
    }

    #[test]
    fn test_optional_sections_default() {
        let b = bundle(json!({"anomalies": null, "metrics": {}}));
        assert!(b.anomalies().is_empty());
        assert!(b.test_metrics().is_none());
        assert!(merge(&b).is_empty());
    }

    #[test]
    fn test_trend_points_follow_concatenated_dates() {
        let b = bundle(json!({
            "train": {"dates": ["2021-01-01", "2021-02-01"]},
            "test": {"dates": ["2021-03-01"]},
            "forecast": {"dates": ["2021-04-01"]},
            "components": {"trend": [1.0, 2.0, null]}
        }));

        let trend = trend_points(&b);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[2].fecha, "2021-03-01");
        assert_eq!(trend[2].trend, None);
    }
}
