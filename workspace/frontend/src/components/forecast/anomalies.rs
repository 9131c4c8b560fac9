use yew::prelude::*;
use common::AnomalyBand;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub bands: Vec<AnomalyBand>,
}

#[function_component(AnomalyList)]
pub fn anomaly_list(props: &Props) -> Html {
    if props.bands.is_empty() {
        return html! {};
    }

    html! {
        <div class="mt-4">
            <h4 class="font-semibold text-sm mb-2">{"Periodos anómalos"}</h4>
            <ul class="flex flex-wrap gap-2">
                { for props.bands.iter().map(|band| html! {
                    <li class="badge badge-error badge-outline gap-1">
                        <i class="fas fa-exclamation-triangle"></i>
                        {format!("{}: {} a {}", band.label, band.start, band.end)}
                    </li>
                }) }
            </ul>
        </div>
    }
}
