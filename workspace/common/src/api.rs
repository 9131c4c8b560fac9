//! Endpoint paths and response decoding for the forecasting backend.
//!
//! The frontend only moves bytes; turning a status line and a body into
//! typed data or a one-line error message happens here.

use crate::error::{DashboardError, Result};
use crate::forecast::ForecastBundle;
use crate::station::Station;
use crate::timeseries::{TimeSeries, TimeSeriesResponse};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::{debug, warn};

/// Characters left alone by `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Stations,
    TimeSeries { linea: String, estacion: String },
    Forecast { linea: String, estacion: String },
}

fn require_selection(linea: &str, estacion: &str) -> Result<(String, String)> {
    if linea.trim().is_empty() || estacion.trim().is_empty() {
        return Err(DashboardError::Validation(
            "Debe seleccionar una línea y una estación".to_string(),
        ));
    }
    Ok((linea.to_string(), estacion.to_string()))
}

impl Endpoint {
    pub fn time_series(linea: &str, estacion: &str) -> Result<Self> {
        let (linea, estacion) =
            require_selection(linea, estacion).map_err(|e| e.with_prefix(Self::TIME_SERIES_PREFIX))?;
        Ok(Self::TimeSeries { linea, estacion })
    }

    pub fn forecast(linea: &str, estacion: &str) -> Result<Self> {
        let (linea, estacion) =
            require_selection(linea, estacion).map_err(|e| e.with_prefix(Self::FORECAST_PREFIX))?;
        Ok(Self::Forecast { linea, estacion })
    }

    const STATIONS_PREFIX: &'static str = "Error al cargar estaciones";
    const TIME_SERIES_PREFIX: &'static str = "Error al cargar la serie temporal";
    const FORECAST_PREFIX: &'static str = "Error al cargar el pronóstico";

    /// Prefix every error from this call is wrapped with.
    pub fn error_prefix(&self) -> &'static str {
        match self {
            Endpoint::Stations => Self::STATIONS_PREFIX,
            Endpoint::TimeSeries { .. } => Self::TIME_SERIES_PREFIX,
            Endpoint::Forecast { .. } => Self::FORECAST_PREFIX,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::Stations => "/stations".to_string(),
            Endpoint::TimeSeries { linea, estacion } => format!(
                "/timeseries/{}/{}",
                encode_segment(linea),
                encode_segment(estacion)
            ),
            Endpoint::Forecast { linea, estacion } => format!(
                "/forecast/{}/{}",
                encode_segment(linea),
                encode_segment(estacion)
            ),
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

/// Status line and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `detail` from a structured error body, or `"Error <status>: <text>"`.
pub fn error_message(status: u16, status_text: &str, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .and_then(|detail| match detail {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| format!("Error {}: {}", status, status_text))
}

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| DashboardError::Api(format!("Respuesta no es JSON válido: {}", e)))
}

fn decode<T>(
    endpoint: &Endpoint,
    response: &RawResponse,
    parse: impl FnOnce(Value) -> Result<T>,
) -> Result<T> {
    let result = if response.is_success() {
        parse_json(&response.body).and_then(parse)
    } else {
        warn!(status = response.status, path = %endpoint.path(), "Backend returned an error status");
        Err(DashboardError::Api(error_message(
            response.status,
            &response.status_text,
            &response.body,
        )))
    };
    result.map_err(|e| e.with_prefix(endpoint.error_prefix()))
}

pub fn decode_stations(response: &RawResponse) -> Result<Vec<Station>> {
    decode(&Endpoint::Stations, response, |value| {
        if !value.is_array() {
            return Err(DashboardError::Api(
                "se esperaba una lista de estaciones".to_string(),
            ));
        }
        let stations: Vec<Station> = serde_json::from_value(value)
            .map_err(|e| DashboardError::Api(format!("estación con formato inválido: {}", e)))?;
        debug!(count = stations.len(), "Decoded station list");
        Ok(stations)
    })
}

pub fn decode_time_series(endpoint: &Endpoint, response: &RawResponse) -> Result<TimeSeries> {
    decode(endpoint, response, |value| {
        if !value.get("data").is_some_and(Value::is_array) {
            return Err(DashboardError::Api(
                "la respuesta no contiene la lista `data`".to_string(),
            ));
        }
        let parsed: TimeSeriesResponse = serde_json::from_value(value)
            .map_err(|e| DashboardError::Api(format!("serie temporal con formato inválido: {}", e)))?;
        Ok(TimeSeries::from(parsed))
    })
}

pub fn decode_forecast(endpoint: &Endpoint, response: &RawResponse) -> Result<ForecastBundle> {
    decode(endpoint, response, |mut value| {
        let forecast = value
            .get_mut("forecast")
            .map(Value::take)
            .filter(|f| !f.is_null())
            .ok_or_else(|| {
                DashboardError::Api("la respuesta no contiene el campo `forecast`".to_string())
            })?;
        serde_json::from_value(forecast)
            .map_err(|e| DashboardError::Api(format!("pronóstico con formato inválido: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(body: serde_json::Value) -> RawResponse {
        RawResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_paths_are_percent_encoded() {
        let endpoint = Endpoint::time_series("linea 1", "pino suárez/zócalo").unwrap();
        assert_eq!(
            endpoint.path(),
            "/timeseries/linea%201/pino%20su%C3%A1rez%2Fz%C3%B3calo"
        );

        let endpoint = Endpoint::forecast("linea a", "la paz (x)").unwrap();
        assert_eq!(endpoint.path(), "/forecast/linea%20a/la%20paz%20(x)");
        assert_eq!(
            endpoint.url("http://localhost:8000/api/"),
            "http://localhost:8000/api/forecast/linea%20a/la%20paz%20(x)"
        );
        assert_eq!(Endpoint::Stations.url("/api"), "/api/stations");
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = Endpoint::time_series("linea 1", "").unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert!(err.message().starts_with("Error al cargar la serie temporal"));

        assert!(matches!(
            Endpoint::forecast("  ", "balderas"),
            Err(DashboardError::Validation(_))
        ));
    }

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(
            error_message(404, "Not Found", r#"{"detail": "No se encontraron datos"}"#),
            "No se encontraron datos"
        );
        assert_eq!(
            error_message(502, "Bad Gateway", "<html>upstream</html>"),
            "Error 502: Bad Gateway"
        );
        assert_eq!(
            error_message(500, "Internal Server Error", r#"{"detail": null}"#),
            "Error 500: Internal Server Error"
        );
    }

    #[test]
    fn test_decode_stations() {
        let stations = decode_stations(&ok(json!([
            {"linea": "linea 1", "estacion": "balderas", "total_registros": 1800, "promedio_afluencia": 21000.5},
            {"linea": "linea 2", "estacion": "zocalo"}
        ])))
        .unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].total_registros, Some(1800));
        assert_eq!(stations[1].promedio_afluencia, None);
    }

    #[test]
    fn test_empty_station_list_is_valid() {
        assert!(decode_stations(&ok(json!([]))).unwrap().is_empty());
    }

    #[test]
    fn test_stations_shape_check() {
        let err = decode_stations(&ok(json!({"stations": []}))).unwrap_err();
        assert!(matches!(err, DashboardError::Api(_)));
        assert!(err.message().starts_with("Error al cargar estaciones: "));

        let err = decode_stations(&ok(json!([{"linea": "linea 1"}]))).unwrap_err();
        assert!(matches!(err, DashboardError::Api(_)));
    }

    #[test]
    fn test_unparseable_body() {
        let response = RawResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: "not json".to_string(),
        };
        assert!(matches!(decode_stations(&response), Err(DashboardError::Api(_))));
    }

    #[test]
    fn test_error_status_surfaces_detail_with_prefix() {
        let endpoint = Endpoint::time_series("linea 1", "balderas").unwrap();
        let response = RawResponse {
            status: 404,
            status_text: "Not Found".to_string(),
            body: json!({"detail": "Error al obtener datos de la estación"}).to_string(),
        };

        let err = decode_time_series(&endpoint, &response).unwrap_err();
        assert_eq!(
            err,
            DashboardError::Api(
                "Error al cargar la serie temporal: Error al obtener datos de la estación".to_string()
            )
        );
    }

    #[test]
    fn test_time_series_requires_data_array() {
        let endpoint = Endpoint::time_series("linea 1", "balderas").unwrap();
        assert!(decode_time_series(&endpoint, &ok(json!({"estacion": "balderas"}))).is_err());
        assert!(decode_time_series(&endpoint, &ok(json!({"data": {}}))).is_err());

        let ts = decode_time_series(
            &endpoint,
            &ok(json!({"data": [{"fecha": "2023-01", "afluencia": 10.0}]})),
        )
        .unwrap();
        assert_eq!(ts.series.points.len(), 1);
    }

    #[test]
    fn test_forecast_is_unwrapped() {
        let endpoint = Endpoint::forecast("linea 1", "balderas").unwrap();
        let bundle = decode_forecast(
            &endpoint,
            &ok(json!({
                "linea": "linea 1",
                "estacion": "balderas",
                "forecast": {
                    "forecast": {"dates": ["2024-03-01"], "predicted": [10.0], "lower": [8.0], "upper": [12.0]},
                    "metrics": {"test": {"rmse": 1.5}}
                }
            })),
        )
        .unwrap();

        assert_eq!(bundle.test_metrics().and_then(|m| m.rmse), Some(1.5));
        assert!(bundle.forecast.is_some());
    }

    #[test]
    fn test_forecast_with_incomplete_anomaly_still_decodes() {
        let endpoint = Endpoint::forecast("linea 1", "pantitlan").unwrap();
        let bundle = decode_forecast(
            &endpoint,
            &ok(json!({
                "forecast": {
                    "train": {"dates": ["2020-01-01"], "actual": [100.0], "fitted": [98.0]},
                    "anomalies": [{"start_date": "2020-03-01", "end_date": "2020-08-31", "impact_percent": 50.0}]
                }
            })),
        )
        .unwrap();

        assert_eq!(bundle.anomalies().len(), 1);
        assert_eq!(bundle.anomalies()[0].name, None);
        assert!(bundle.train.is_some());
    }

    #[test]
    fn test_forecast_field_required() {
        let endpoint = Endpoint::forecast("linea 1", "balderas").unwrap();
        for body in [json!({"linea": "linea 1"}), json!({"forecast": null})] {
            let err = decode_forecast(&endpoint, &ok(body)).unwrap_err();
            assert!(err.message().starts_with("Error al cargar el pronóstico"));
        }
    }
}
