use yew::prelude::*;
use common::format::metric_cells;
use common::TestMetrics;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub metrics: TestMetrics,
}

/// Accuracy over the validation period.
#[function_component(ForecastMetrics)]
pub fn forecast_metrics(props: &Props) -> Html {
    html! {
        <div class="card bg-base-100 shadow mt-6">
            <div class="card-body">
                <h3 class="card-title text-lg">{"Precisión en validación"}</h3>
                <div class="grid grid-cols-2 md:grid-cols-4 gap-4 mt-2">
                    { for metric_cells(&props.metrics).into_iter().map(|cell| html! {
                        <div class="stat bg-base-200 rounded-lg">
                            <div class="stat-title">{cell.label}</div>
                            <div class="stat-value text-lg">{cell.value}</div>
                            <div class="stat-desc">{cell.description}</div>
                        </div>
                    }) }
                </div>
            </div>
        </div>
    }
}
