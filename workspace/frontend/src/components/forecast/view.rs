use yew::prelude::*;
use common::forecast::anomaly_bands;
use common::request::ForecastAction;
use common::{ForecastRequest, RequestSequence, ViewMode};
use std::rc::Rc;
use super::anomalies::AnomalyList;
use super::chart::ForecastChart;
use super::metrics::ForecastMetrics;
use crate::api_client::ApiClient;
use crate::common::error::ErrorDisplay;
use crate::common::loading::Loading;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub linea: String,
    pub estacion: String,
}

#[function_component(ForecastView)]
pub fn forecast_view(props: &Props) -> Html {
    let client = use_context::<ApiClient>().unwrap_or_else(ApiClient::from_settings);
    let request = use_state(ForecastRequest::default);
    let mode = use_state(ViewMode::default);
    let sequence = use_memo((), |_| RequestSequence::new());

    // A response arriving after unmount must not be applied.
    {
        let sequence = sequence.clone();
        use_effect_with((), move |_| move || sequence.invalidate());
    }

    let on_action = {
        let request = request.clone();
        let sequence = sequence.clone();
        let linea = props.linea.clone();
        let estacion = props.estacion.clone();

        Callback::from(move |_: MouseEvent| match request.on_action() {
            ForecastAction::Ignore => log::trace!("Forecast already loading, click ignored"),
            ForecastAction::Discard => {
                log::debug!("Discarding forecast for {} / {}", linea, estacion);
                sequence.invalidate();
                request.set(ForecastRequest::Idle);
            }
            ForecastAction::Fetch => {
                let ticket = sequence.issue();
                request.set(ForecastRequest::Loading);

                let request = request.clone();
                let sequence = sequence.clone();
                let client = client.clone();
                let linea = linea.clone();
                let estacion = estacion.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = client.get_forecast(&linea, &estacion).await;
                    if !sequence.is_current(ticket) {
                        log::debug!("Dropping stale forecast response for {} / {}", linea, estacion);
                        return;
                    }
                    match result {
                        Ok(bundle) => request.set(ForecastRequest::Loaded(Rc::new(bundle))),
                        Err(err) => request.set(ForecastRequest::Error(err.to_string())),
                    }
                });
            }
        })
    };

    let mode_buttons = ViewMode::ALL.iter().map(|m| {
        let mode_handle = mode.clone();
        let m = *m;
        let class = if *mode == m { "btn btn-sm join-item btn-active" } else { "btn btn-sm join-item" };
        html! {
            <button class={class} onclick={Callback::from(move |_| mode_handle.set(m))}>
                {m.label()}
            </button>
        }
    });

    let body = match &*request {
        ForecastRequest::Idle => html! {
            <p class="text-sm text-gray-500">
                {"Genere un pronóstico para ver el ajuste del modelo, la validación y la proyección futura."}
            </p>
        },
        ForecastRequest::Loading => html! {
            <Loading text={Some("Generando pronóstico, esto puede tardar...".to_string())} />
        },
        ForecastRequest::Error(error) => html! {
            <ErrorDisplay message={error.clone()} compact={true} />
        },
        ForecastRequest::Loaded(bundle) => {
            let div_id = format!("forecast-{}-{}", props.linea, props.estacion)
                .replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', "_");
            html! {
                <>
                    <div class="join mb-4">{ for mode_buttons }</div>
                    <ForecastChart bundle={bundle.clone()} mode={*mode} div_id={div_id} />
                    <AnomalyList bands={anomaly_bands(bundle).bands} />
                    if let Some(metrics) = bundle.test_metrics() {
                        <ForecastMetrics metrics={metrics.clone()} />
                    }
                </>
            }
        }
    };

    html! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <div class="flex justify-between items-center mb-4">
                    <h3 class="card-title text-lg">{"Pronóstico de afluencia"}</h3>
                    <button
                        class="btn btn-primary btn-sm"
                        disabled={request.is_loading()}
                        onclick={on_action}
                    >
                        {request.button_label()}
                    </button>
                </div>
                {body}
            </div>
        </div>
    }
}
