use std::rc::Rc;
use yew::prelude::*;
use common::format::format_magnitude;
use common::station::{distinct_lines, stations_for_line};
use common::{Station, StationSelection};
use crate::api_client::ApiClient;
use crate::common::error::ErrorDisplay;
use crate::common::fetch_hook::use_fetch_with_refetch;
use crate::common::loading::{Loading, LoadingSize};
use crate::hooks::FetchState;

#[derive(Properties, PartialEq)]
pub struct Props {
    /// Receives `(linea, estacion)` once both are chosen.
    pub on_select: Callback<(String, String)>,
}

fn station_label(station: &Station) -> String {
    match station.promedio_afluencia.filter(|v| v.is_finite()) {
        Some(mean) => format!("{} · {} diarios", station.estacion, format_magnitude(mean)),
        None => station.estacion.clone(),
    }
}

#[function_component(StationSelector)]
pub fn station_selector(props: &Props) -> Html {
    let client = use_context::<ApiClient>().unwrap_or_else(ApiClient::from_settings);
    let (fetch_state, refetch) = use_fetch_with_refetch(move || {
        let client = client.clone();
        async move {
            client
                .list_stations()
                .await
                .map(Rc::new)
                .map_err(|e| e.to_string())
        }
    });
    let selection = use_state(StationSelection::default);

    let stations: Rc<Vec<Station>> = fetch_state.data().cloned().unwrap_or_default();
    let lines = use_memo(stations.clone(), |stations| distinct_lines(stations));
    let candidates = use_memo(
        (stations.clone(), selection.linea.clone()),
        |(stations, linea)| stations_for_line(stations, linea),
    );

    let on_line_change = {
        let selection = selection.clone();
        Callback::from(move |e: Event| {
            if let Some(target) = e.target_dyn_into::<web_sys::HtmlSelectElement>() {
                let linea = target.value();
                log::debug!("Line selected: {}", linea);
                let mut next = (*selection).clone();
                next.choose_line(&linea);
                selection.set(next);
            }
        })
    };

    let on_station_change = {
        let selection = selection.clone();
        let on_select = props.on_select.clone();
        Callback::from(move |e: Event| {
            if let Some(target) = e.target_dyn_into::<web_sys::HtmlSelectElement>() {
                let mut next = (*selection).clone();
                if let Some(pair) = next.choose_station(&target.value()) {
                    log::debug!("Station selected: {} / {}", pair.0, pair.1);
                    on_select.emit(pair);
                }
                selection.set(next);
            }
        })
    };

    // The station select is keyed by line so it remounts on every line
    // change; transfer stations share a name across lines.
    let content = match &*fetch_state {
        FetchState::NotStarted => html! {},
        FetchState::Loading => html! {
            <Loading size={LoadingSize::Small} text={Some("Cargando estaciones...".to_string())} />
        },
        FetchState::Error(error) => html! {
            <ErrorDisplay message={error.clone()} on_retry={Some(refetch.clone())} compact={true} />
        },
        FetchState::Success(list) if list.is_empty() => html! {
            <div class="alert alert-info">
                <i class="fas fa-info-circle"></i>
                <span>{"No hay estaciones disponibles."}</span>
            </div>
        },
        FetchState::Success(_) => html! {
            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                <label class="form-control w-full">
                    <div class="label"><span class="label-text">{"Línea"}</span></div>
                    <select class="select select-bordered w-full" onchange={on_line_change}>
                        <option value="" selected={selection.linea.is_empty()}>{"Seleccione una línea"}</option>
                        { for lines.iter().map(|linea| html! {
                            <option key={linea.clone()} value={linea.clone()} selected={*linea == selection.linea}>
                                {linea.clone()}
                            </option>
                        }) }
                    </select>
                </label>
                <label class="form-control w-full">
                    <div class="label"><span class="label-text">{"Estación"}</span></div>
                    <select
                        key={selection.linea.clone()}
                        class="select select-bordered w-full"
                        disabled={selection.linea.is_empty()}
                        onchange={on_station_change}
                    >
                        <option value="" selected={selection.estacion.is_empty()}>{"Seleccione una estación"}</option>
                        { for candidates.iter().map(|station| html! {
                            <option
                                key={station.estacion.clone()}
                                value={station.estacion.clone()}
                                selected={station.estacion == selection.estacion}
                            >
                                {station_label(station)}
                            </option>
                        }) }
                    </select>
                </label>
            </div>
        },
    };

    html! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h3 class="card-title text-lg">{"Estación"}</h3>
                {content}
            </div>
        </div>
    }
}
