use serde::{Deserialize, Serialize};
use tracing::debug;

/// One period of the historical series exactly as the backend sends it.
///
/// The ridership value may arrive as `afluencia`, as `mean`, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimeSeriesPoint {
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub afluencia: Option<f64>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub std: Option<f64>,
    #[serde(default)]
    pub linea: Option<String>,
    #[serde(default)]
    pub estacion: Option<String>,
}

/// Body of `GET /timeseries/{linea}/{estacion}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub linea: Option<String>,
    #[serde(default)]
    pub estacion: Option<String>,
    pub data: Vec<RawTimeSeriesPoint>,
    #[serde(default)]
    pub stats: Option<StationStats>,
}

/// Descriptive statistics computed by the backend over the daily records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationStats {
    #[serde(default)]
    pub total_registros: Option<u64>,
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_fin: Option<String>,
    #[serde(default)]
    pub promedio_diario: Option<f64>,
    #[serde(default)]
    pub maximo_historico: Option<Extreme>,
    #[serde(default)]
    pub minimo_historico: Option<Extreme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    #[serde(default)]
    pub valor: Option<f64>,
    #[serde(default)]
    pub fecha: Option<String>,
}

/// Which upstream field carries the ridership value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueField {
    #[default]
    Afluencia,
    Mean,
}

impl ValueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueField::Afluencia => "afluencia",
            ValueField::Mean => "mean",
        }
    }

    fn read(&self, point: &RawTimeSeriesPoint) -> Option<f64> {
        match self {
            ValueField::Afluencia => point.afluencia,
            ValueField::Mean => point.mean,
        }
    }
}

/// A valid period: it has a date and a primary value.
#[derive(Debug, Clone, PartialEq)]
pub struct RidershipPoint {
    pub fecha: String,
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
}

/// Historical series with the value field reconciled once, at fetch time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidershipSeries {
    pub field: ValueField,
    /// Number of points the backend sent, before filtering.
    pub received: usize,
    pub points: Vec<RidershipPoint>,
}

impl RidershipSeries {
    pub fn from_points(raw: &[RawTimeSeriesPoint]) -> Self {
        let field = if raw.iter().any(|p| p.afluencia.is_some()) {
            ValueField::Afluencia
        } else if raw.iter().any(|p| p.mean.is_some()) {
            ValueField::Mean
        } else {
            ValueField::default()
        };

        let points: Vec<RidershipPoint> = raw
            .iter()
            .filter_map(|p| {
                let fecha = p.fecha.as_deref().filter(|f| !f.trim().is_empty())?;
                let value = field.read(p).filter(|v| v.is_finite())?;
                Some(RidershipPoint {
                    fecha: fecha.to_string(),
                    value,
                    min: p.min.filter(|v| v.is_finite()),
                    max: p.max.filter(|v| v.is_finite()),
                    std: p.std.filter(|v| v.is_finite()),
                })
            })
            .collect();

        if points.len() < raw.len() {
            debug!(
                received = raw.len(),
                valid = points.len(),
                field = field.as_str(),
                "Dropped time series points without date or value"
            );
        }

        Self {
            field,
            received: raw.len(),
            points,
        }
    }

    /// The backend sent nothing at all.
    pub fn is_empty(&self) -> bool {
        self.received == 0
    }

    /// The backend sent points but none of them were usable.
    pub fn has_no_valid_points(&self) -> bool {
        self.received > 0 && self.points.is_empty()
    }

    /// Whether any point carries a min or max, which is what makes the
    /// summary panel worth showing.
    pub fn has_range(&self) -> bool {
        self.points.iter().any(|p| p.min.is_some() || p.max.is_some())
    }

    pub fn summary(&self) -> Option<SeriesSummary> {
        if self.points.is_empty() {
            return None;
        }

        let count = self.points.len();
        let mean = self.points.iter().map(|p| p.value).sum::<f64>() / count as f64;
        let max = self
            .points
            .iter()
            .map(|p| p.max.unwrap_or(p.value))
            .fold(f64::NEG_INFINITY, f64::max);
        let min = self
            .points
            .iter()
            .map(|p| p.min.unwrap_or(p.value))
            .fold(f64::INFINITY, f64::min);

        Some(SeriesSummary {
            count,
            mean,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Normalized result of a time-series request.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub linea: Option<String>,
    pub estacion: Option<String>,
    pub series: RidershipSeries,
    pub stats: Option<StationStats>,
}

impl From<TimeSeriesResponse> for TimeSeries {
    fn from(response: TimeSeriesResponse) -> Self {
        Self {
            series: RidershipSeries::from_points(&response.data),
            linea: response.linea,
            estacion: response.estacion,
            stats: response.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn points(value: serde_json::Value) -> Vec<RawTimeSeriesPoint> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mean_without_range() {
        let series = RidershipSeries::from_points(&points(json!([
            {"fecha": "2021-01", "afluencia": 10},
            {"fecha": "2021-02", "afluencia": 20},
            {"fecha": "2021-03", "afluencia": 30}
        ])));

        assert!(!series.has_range());
        let summary = series.summary().unwrap();
        assert_eq!(summary.mean, 20.0);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.min, 10.0);
    }

    #[test]
    fn test_max_prefers_point_max() {
        let series = RidershipSeries::from_points(&points(json!([
            {"fecha": "2021-01", "afluencia": 10, "max": 12},
            {"fecha": "2021-02", "afluencia": 20, "max": 22},
            {"fecha": "2021-03", "afluencia": 30, "max": 35}
        ])));

        assert!(series.has_range());
        let summary = series.summary().unwrap();
        assert_eq!(summary.max, 35.0);
        assert_eq!(summary.mean, 20.0);
        // no min anywhere, so values stand in
        assert_eq!(summary.min, 10.0);
    }

    #[test]
    fn test_mixed_min_falls_back_to_value() {
        let series = RidershipSeries::from_points(&points(json!([
            {"fecha": "2021-01", "afluencia": 100, "min": 40},
            {"fecha": "2021-02", "afluencia": 30}
        ])));

        assert_eq!(series.summary().unwrap().min, 30.0);
    }

    #[test]
    fn test_prefers_afluencia_over_mean() {
        let series = RidershipSeries::from_points(&points(json!([
            {"fecha": "2021-01", "afluencia": 10, "mean": 99},
            {"fecha": "2021-02", "mean": 50}
        ])));

        assert_eq!(series.field, ValueField::Afluencia);
        // second point has no afluencia, so it is dropped rather than mixed
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].value, 10.0);
    }

    #[test]
    fn test_falls_back_to_mean() {
        let series = RidershipSeries::from_points(&points(json!([
            {"fecha": "2021-01", "mean": 5.5, "std": 1.0},
            {"fecha": "2021-02", "mean": 6.5}
        ])));

        assert_eq!(series.field, ValueField::Mean);
        assert_eq!(series.summary().unwrap().mean, 6.0);
    }

    #[test]
    fn test_drops_points_without_date_or_value() {
        let series = RidershipSeries::from_points(&points(json!([
            {"afluencia": 10},
            {"fecha": "2021-02", "min": 3, "max": 4},
            {"fecha": "", "afluencia": 7},
            {"fecha": "2021-04", "afluencia": 8}
        ])));

        assert_eq!(series.received, 4);
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].fecha, "2021-04");
    }

    #[test]
    fn test_empty_vs_no_valid_points() {
        let empty = RidershipSeries::from_points(&[]);
        assert!(empty.is_empty());
        assert!(!empty.has_no_valid_points());
        assert!(empty.summary().is_none());

        let invalid = RidershipSeries::from_points(&points(json!([{"linea": "linea 1"}])));
        assert!(!invalid.is_empty());
        assert!(invalid.has_no_valid_points());
    }

    #[test]
    fn test_response_with_stats() {
        let response: TimeSeriesResponse = serde_json::from_value(json!({
            "linea": "linea 1",
            "estacion": "pino suarez",
            "data": [{"fecha": "2023-01", "mean": 1200.0, "afluencia": 1200.0}],
            "stats": {
                "total_registros": 31,
                "fecha_inicio": "2023-01-01",
                "fecha_fin": "2023-01-31",
                "promedio_diario": 1200.0,
                "maximo_historico": {"valor": 1800.0, "fecha": "2023-01-13"}
            }
        }))
        .unwrap();

        let ts = TimeSeries::from(response);
        let stats = ts.stats.unwrap();
        assert_eq!(stats.total_registros, Some(31));
        assert!(stats.minimo_historico.is_none());
        assert_eq!(stats.maximo_historico.unwrap().valor, Some(1800.0));
        assert_eq!(ts.series.points.len(), 1);
    }
}
