use std::rc::Rc;
use yew::prelude::*;
use common::forecast::{anomaly_bands, build_chart_data, trend_points};
use common::{AnomalyBand, AnomalyOverlay, ChartPoint, DashboardError, ForecastBundle, ViewMode};
use plotly::common::{DashType, Fill, Line, Mode};
use plotly::{Layout, Plot, Scatter};
use serde_json::{json, Value};
use web_sys::HtmlElement;
use crate::common::plot::render_plot;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub bundle: Rc<ForecastBundle>,
    pub mode: ViewMode,
    pub div_id: String,
}

fn column(points: &[ChartPoint], field: fn(&ChartPoint) -> Option<f64>) -> Option<Vec<Option<f64>>> {
    let values: Vec<Option<f64>> = points.iter().map(field).collect();
    values.iter().any(Option::is_some).then_some(values)
}

fn line_trace(
    dates: &[String],
    values: Vec<Option<f64>>,
    name: &str,
    line: Line,
) -> Box<Scatter<String, Option<f64>>> {
    Scatter::new(dates.to_vec(), values)
        .mode(Mode::Lines)
        .name(name)
        .line(line)
}

fn build_plot(points: &[ChartPoint], bundle: &ForecastBundle, mode: ViewMode) -> Plot {
    let dates: Vec<String> = points.iter().map(|p| p.fecha.clone()).collect();
    let mut plot = Plot::new();

    // Band first so the lines are drawn on top of it.
    if let (Some(lower), Some(upper)) = (column(points, |p| p.lower), column(points, |p| p.upper)) {
        plot.add_trace(
            Scatter::new(dates.clone(), upper)
                .mode(Mode::Lines)
                .name("Límite superior")
                .line(Line::new().width(0.0))
                .show_legend(false),
        );
        plot.add_trace(
            Scatter::new(dates.clone(), lower)
                .mode(Mode::Lines)
                .name("Intervalo de confianza")
                .line(Line::new().width(0.0))
                .fill(Fill::ToNextY)
                .fill_color("rgba(34, 197, 94, 0.15)"),
        );
    }

    if let Some(actual) = column(points, |p| p.actual) {
        plot.add_trace(line_trace(
            &dates,
            actual,
            "Real",
            Line::new().color("rgb(59, 130, 246)").width(2.0),
        ));
    }
    if let Some(fitted) = column(points, |p| p.fitted) {
        plot.add_trace(line_trace(
            &dates,
            fitted,
            "Ajuste (entrenamiento)",
            Line::new().color("rgb(107, 114, 128)").width(1.5).dash(DashType::Dash),
        ));
    }
    if let Some(validation) = column(points, |p| p.validation_predicted) {
        plot.add_trace(line_trace(
            &dates,
            validation,
            "Predicción (validación)",
            Line::new().color("rgb(249, 115, 22)").width(2.0),
        ));
    }
    if let Some(predicted) = column(points, |p| p.predicted) {
        plot.add_trace(line_trace(
            &dates,
            predicted,
            "Pronóstico",
            Line::new().color("rgb(34, 197, 94)").width(2.0),
        ));
    }

    if mode == ViewMode::All {
        let trend = trend_points(bundle);
        if trend.iter().any(|t| t.trend.is_some()) {
            let trend_dates: Vec<String> = trend.iter().map(|t| t.fecha.clone()).collect();
            let values: Vec<Option<f64>> = trend.iter().map(|t| t.trend).collect();
            plot.add_trace(line_trace(
                &trend_dates,
                values,
                "Tendencia",
                Line::new().color("rgb(156, 163, 175)").width(1.0).dash(DashType::Dot),
            ));
        }
    }

    plot.set_layout(
        Layout::new()
            .x_axis(plotly::layout::Axis::new().title("Fecha"))
            .y_axis(plotly::layout::Axis::new().title("Afluencia"))
            .height(450),
    );
    plot
}

/// Layout additions for the anomaly overlay: one shaded band and one label
/// per anomaly, regardless of the view mode.
fn anomaly_overlay(bands: &[AnomalyBand]) -> Value {
    let shapes: Vec<Value> = bands
        .iter()
        .map(|band| {
            json!({
                "type": "rect",
                "xref": "x",
                "yref": "paper",
                "x0": band.start,
                "x1": band.end,
                "y0": 0,
                "y1": 1,
                "fillcolor": "rgba(239, 68, 68, 0.12)",
                "line": {"width": 0},
                "layer": "below"
            })
        })
        .collect();
    let annotations: Vec<Value> = bands
        .iter()
        .map(|band| {
            json!({
                "x": band.start,
                "y": 1,
                "xref": "x",
                "yref": "paper",
                "text": band.label,
                "showarrow": false,
                "xanchor": "left",
                "yanchor": "bottom",
                "font": {"size": 11, "color": "rgb(185, 28, 28)"}
            })
        })
        .collect();

    json!({
        "shapes": shapes,
        "annotations": annotations,
        "hovermode": "x unified",
        "legend": {"orientation": "h"}
    })
}

/// Non-fatal: the chart still renders next to it.
fn render_warning(issue: &DashboardError) -> Html {
    html! {
        <div class="alert alert-warning mb-2">
            <i class="fas fa-exclamation-triangle"></i>
            <span>{issue.to_string()}</span>
        </div>
    }
}

#[function_component(ForecastChart)]
pub fn forecast_chart(props: &Props) -> Html {
    let container_ref = use_node_ref();
    let data = use_memo((props.bundle.clone(), props.mode), |(bundle, mode)| {
        build_chart_data(bundle, *mode)
    });
    let overlay: Rc<AnomalyOverlay> = use_memo(props.bundle.clone(), |bundle| anomaly_bands(bundle));

    use_effect_with(
        (
            container_ref.clone(),
            data.clone(),
            overlay.clone(),
            props.bundle.clone(),
            props.mode,
            props.div_id.clone(),
        ),
        move |(container_ref, data, overlay, bundle, mode, div_id)| {
            if let Some(element) = container_ref.cast::<HtmlElement>() {
                element.set_id(div_id);
                let plot = build_plot(&data.points, bundle, *mode);
                render_plot(div_id, &plot, anomaly_overlay(&overlay.bands));
            }
            || ()
        },
    );

    let warnings = [data.rendering_issue(), overlay.rendering_issue()];

    html! {
        <>
            { for warnings.iter().flatten().map(render_warning) }
            if data.points.is_empty() {
                <div class="text-center py-8 text-gray-500">
                    <p>{format!("No hay datos para el modo \"{}\".", props.mode)}</p>
                </div>
            }
            <div ref={container_ref} style="width:100%; height:450px;"></div>
        </>
    }
}
