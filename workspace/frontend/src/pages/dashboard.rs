use std::rc::Rc;
use yew::prelude::*;
use common::{RequestSequence, TimeSeries};
use crate::api_client::ApiClient;
use crate::common::error::ErrorDisplay;
use crate::common::loading::{Loading, LoadingSize};
use crate::components::forecast::ForecastView;
use crate::components::layout::Layout;
use crate::components::station_selector::StationSelector;
use crate::components::timeseries_chart::TimeSeriesChart;
use crate::hooks::FetchState;

/// Top-level page. Owns the current selection, the held time series and the
/// forecast toggle.
#[function_component(DashboardPage)]
pub fn dashboard_page() -> Html {
    let client = use_context::<ApiClient>().unwrap_or_else(ApiClient::from_settings);
    let selection = use_state(|| None::<(String, String)>);
    let series_state = use_state(|| FetchState::<Rc<TimeSeries>>::NotStarted);
    let show_forecast = use_state(|| false);
    let sequence = use_memo((), |_| RequestSequence::new());

    let load = {
        let series_state = series_state.clone();
        let show_forecast = show_forecast.clone();
        let sequence = sequence.clone();

        Callback::from(move |(linea, estacion): (String, String)| {
            let ticket = sequence.issue();
            log::debug!("Loading time series for {} / {} ({:?})", linea, estacion, ticket);
            show_forecast.set(false);
            series_state.set(FetchState::Loading);

            let series_state = series_state.clone();
            let sequence = sequence.clone();
            let client = client.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.get_time_series(&linea, &estacion).await;
                if !sequence.is_current(ticket) {
                    log::debug!("Dropping stale time series response for {} / {}", linea, estacion);
                    return;
                }
                match result {
                    Ok(series) => series_state.set(FetchState::Success(Rc::new(series))),
                    Err(err) => series_state.set(FetchState::Error(err.to_string())),
                }
            });
        })
    };

    let on_select = {
        let selection = selection.clone();
        let load = load.clone();
        Callback::from(move |pair: (String, String)| {
            selection.set(Some(pair.clone()));
            load.emit(pair);
        })
    };

    let on_retry = {
        let selection = selection.clone();
        let load = load.clone();
        Callback::from(move |_| {
            if let Some(pair) = (*selection).clone() {
                log::info!("Retrying time series for {} / {}", pair.0, pair.1);
                load.emit(pair);
            }
        })
    };

    let on_toggle = {
        let show_forecast = show_forecast.clone();
        Callback::from(move |_: MouseEvent| show_forecast.set(!*show_forecast))
    };

    let content = match (&*selection, &*series_state) {
        (None, _) | (_, FetchState::NotStarted) => html! {
            <div class="card bg-base-100 shadow">
                <div class="card-body text-center text-gray-500">
                    <i class="fas fa-map-marker-alt text-4xl mb-4 opacity-50"></i>
                    <p>{"Seleccione una línea y una estación para ver su afluencia."}</p>
                </div>
            </div>
        },
        (Some(_), FetchState::Loading) => html! {
            <Loading size={LoadingSize::Large} text={Some("Cargando serie temporal...".to_string())} />
        },
        (Some(_), FetchState::Error(error)) => html! {
            <ErrorDisplay
                message={format!("{}. Intente de nuevo.", error.trim_end_matches('.'))}
                on_retry={Some(on_retry)}
            />
        },
        (Some((linea, estacion)), FetchState::Success(series)) => {
            let toggle_label = if *show_forecast { "Ver serie histórica" } else { "Ver pronóstico" };
            html! {
                <>
                    <div class="flex justify-end">
                        <button class="btn btn-outline btn-sm" onclick={on_toggle}>
                            <i class="fas fa-chart-area"></i>
                            {" "}{toggle_label}
                        </button>
                    </div>
                    if *show_forecast {
                        <ForecastView
                            key={format!("{}/{}", linea, estacion)}
                            linea={linea.clone()}
                            estacion={estacion.clone()}
                        />
                    } else {
                        <TimeSeriesChart
                            data={series.clone()}
                            linea={linea.clone()}
                            estacion={estacion.clone()}
                        />
                    }
                </>
            }
        }
    };

    html! {
        <Layout
            title="Afluencia del Metro"
            subtitle={Some("Serie histórica y pronóstico por estación".to_string())}
        >
            <StationSelector on_select={on_select} />
            {content}
        </Layout>
    }
}
