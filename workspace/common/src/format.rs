//! Number formatting for ridership figures and accuracy metrics.

use crate::forecast::TestMetrics;

pub const NOT_AVAILABLE: &str = "N/A";

/// Rounds to an integer and groups thousands with `.`, e.g. `1234567.4`
/// becomes `1.234.567`.
pub fn format_magnitude(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value)
}

/// Coefficient of determination, three decimals, no grouping.
pub fn format_r2(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.3}", value)
}

/// Applies `format` when the value is present, `N/A` otherwise.
pub fn or_na(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format)
}

/// One tile of the accuracy panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCell {
    pub label: &'static str,
    pub value: String,
    pub description: &'static str,
}

/// Accuracy tiles for the validation period. Each metric falls back to
/// `N/A` on its own.
pub fn metric_cells(metrics: &TestMetrics) -> Vec<MetricCell> {
    vec![
        MetricCell {
            label: "RMSE",
            value: or_na(metrics.rmse, format_magnitude),
            description: "Raíz del error cuadrático medio",
        },
        MetricCell {
            label: "MAE",
            value: or_na(metrics.mae, format_magnitude),
            description: "Error absoluto medio",
        },
        MetricCell {
            label: "MAPE",
            value: or_na(metrics.mape, format_percent),
            description: "Error porcentual absoluto medio",
        },
        MetricCell {
            label: "R²",
            value: or_na(metrics.r2, format_r2),
            description: "Coeficiente de determinación",
        },
    ]
}
