use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A (line, station) pair as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub linea: String,
    pub estacion: String,
    /// Number of daily records the backend holds for this station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_registros: Option<u64>,
    /// Mean daily ridership over the whole history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promedio_afluencia: Option<f64>,
}

impl Station {
    pub fn new(linea: impl Into<String>, estacion: impl Into<String>) -> Self {
        Self {
            linea: linea.into(),
            estacion: estacion.into(),
            total_registros: None,
            promedio_afluencia: None,
        }
    }
}

/// Distinct lines, sorted lexicographically on the raw string.
pub fn distinct_lines(stations: &[Station]) -> Vec<String> {
    stations
        .iter()
        .map(|s| s.linea.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Stations on exactly `linea`, sorted by station name.
pub fn stations_for_line(stations: &[Station], linea: &str) -> Vec<Station> {
    if linea.is_empty() {
        return Vec::new();
    }

    let mut filtered: Vec<Station> = stations
        .iter()
        .filter(|s| s.linea == linea)
        .cloned()
        .collect();
    filtered.sort_by(|a, b| a.estacion.cmp(&b.estacion));
    filtered
}
