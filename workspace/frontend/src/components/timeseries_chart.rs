use std::rc::Rc;
use yew::prelude::*;
use common::format::{format_magnitude, or_na};
use common::{RidershipSeries, StationStats, TimeSeries, ValueField};
use plotly::common::{HoverInfo, Line, Mode};
use plotly::{Layout, Plot, Scatter};
use serde_json::json;
use web_sys::HtmlElement;
use crate::common::plot::render_plot;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub data: Rc<TimeSeries>,
    pub linea: String,
    pub estacion: String,
}

fn series_name(field: ValueField) -> &'static str {
    match field {
        ValueField::Afluencia => "Afluencia",
        ValueField::Mean => "Afluencia promedio",
    }
}

#[function_component(TimeSeriesChart)]
pub fn timeseries_chart(props: &Props) -> Html {
    let series = &props.data.series;

    let body = if series.is_empty() {
        html! {
            <div class="text-center py-8 text-gray-500">
                <i class="fas fa-chart-line text-4xl mb-4 opacity-50"></i>
                <p>{"No hay datos para esta estación."}</p>
            </div>
        }
    } else if series.has_no_valid_points() {
        html! {
            <div class="text-center py-8 text-gray-500">
                <i class="fas fa-filter text-4xl mb-4 opacity-50"></i>
                <p>{"Los datos recibidos no contienen valores válidos."}</p>
                <p class="text-sm mt-2">{format!("{} registros descartados por no tener fecha o afluencia.", series.received)}</p>
            </div>
        }
    } else {
        let div_id = format!("timeseries-{}-{}", props.linea, props.estacion)
            .replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', "_");
        html! {
            <>
                <RidershipPlot series={Rc::new(series.clone())} div_id={div_id} />
                { summary_panel(series) }
            </>
        }
    };

    html! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h3 class="card-title text-lg">{"Afluencia histórica"}</h3>
                <p class="text-sm text-gray-500 mb-4">{format!("{} · {}", props.linea, props.estacion)}</p>
                {body}
                { props.data.stats.as_ref().map(stats_panel).unwrap_or_default() }
            </div>
        </div>
    }
}

fn summary_panel(series: &RidershipSeries) -> Html {
    if !series.has_range() {
        return html! {};
    }
    let Some(summary) = series.summary() else {
        return html! {};
    };

    html! {
        <div class="grid grid-cols-1 md:grid-cols-3 gap-4 mt-4">
            <div class="stat bg-base-200 rounded-lg">
                <div class="stat-title">{"Promedio"}</div>
                <div class="stat-value text-lg">{format_magnitude(summary.mean)}</div>
                <div class="stat-desc">{format!("{} periodos", summary.count)}</div>
            </div>
            <div class="stat bg-base-200 rounded-lg">
                <div class="stat-title">{"Máximo"}</div>
                <div class="stat-value text-lg text-success">{format_magnitude(summary.max)}</div>
            </div>
            <div class="stat bg-base-200 rounded-lg">
                <div class="stat-title">{"Mínimo"}</div>
                <div class="stat-value text-lg text-error">{format_magnitude(summary.min)}</div>
            </div>
        </div>
    }
}

fn stats_panel(stats: &StationStats) -> Html {
    let extreme = |e: &Option<common::Extreme>| match e {
        Some(e) => format!(
            "{} ({})",
            or_na(e.valor, format_magnitude),
            e.fecha.clone().unwrap_or_else(|| "sin fecha".to_string())
        ),
        None => "N/A".to_string(),
    };
    let span = match (&stats.fecha_inicio, &stats.fecha_fin) {
        (Some(start), Some(end)) => format!("{} a {}", start, end),
        _ => "N/A".to_string(),
    };

    html! {
        <div class="overflow-x-auto mt-6">
            <table class="table table-sm">
                <tbody>
                    <tr><th>{"Registros diarios"}</th><td>{stats.total_registros.map(|n| n.to_string()).unwrap_or_else(|| "N/A".to_string())}</td></tr>
                    <tr><th>{"Periodo"}</th><td>{span}</td></tr>
                    <tr><th>{"Promedio diario"}</th><td>{or_na(stats.promedio_diario, format_magnitude)}</td></tr>
                    <tr><th>{"Máximo histórico"}</th><td>{extreme(&stats.maximo_historico)}</td></tr>
                    <tr><th>{"Mínimo histórico"}</th><td>{extreme(&stats.minimo_historico)}</td></tr>
                </tbody>
            </table>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct RidershipPlotProps {
    series: Rc<RidershipSeries>,
    div_id: String,
}

#[function_component(RidershipPlot)]
fn ridership_plot(props: &RidershipPlotProps) -> Html {
    let container_ref = use_node_ref();

    use_effect_with((container_ref.clone(), props.series.clone(), props.div_id.clone()), move |(container_ref, series, div_id)| {
        if let Some(element) = container_ref.cast::<HtmlElement>() {
            element.set_id(div_id);

            let dates: Vec<String> = series.points.iter().map(|p| p.fecha.clone()).collect();
            let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
            let hover: Vec<String> = series
                .points
                .iter()
                .map(|p| {
                    let mut text = format!("{}<br>{}: {}", p.fecha, series_name(series.field), format_magnitude(p.value));
                    if let Some(min) = p.min {
                        text.push_str(&format!("<br>Mínimo: {}", format_magnitude(min)));
                    }
                    if let Some(max) = p.max {
                        text.push_str(&format!("<br>Máximo: {}", format_magnitude(max)));
                    }
                    text
                })
                .collect();

            let trace = Scatter::new(dates, values)
                .mode(Mode::LinesMarkers)
                .name(series_name(series.field))
                .text_array(hover)
                .hover_info(HoverInfo::Text)
                .line(Line::new().color("rgb(59, 130, 246)").width(2.0));

            let layout = Layout::new()
                .x_axis(plotly::layout::Axis::new().title("Fecha"))
                .y_axis(plotly::layout::Axis::new().title(series_name(series.field)))
                .height(400);

            let mut plot = Plot::new();
            plot.add_trace(trace);
            plot.set_layout(layout);

            render_plot(div_id, &plot, json!({}));
        }
        || ()
    });

    html! {
        <div ref={container_ref} style="width:100%; height:400px;"></div>
    }
}
