use yew::prelude::*;

const DEFAULT_TEXT: &str = "Cargando...";

#[derive(Clone, Copy, PartialEq, Default)]
pub enum LoadingSize {
    /// Inline row, used inside cards next to form controls.
    Small,
    #[default]
    Medium,
    /// Full-width block that stands in for a whole chart.
    Large,
}

#[derive(Properties, PartialEq)]
pub struct LoadingProps {
    #[prop_or_default]
    pub size: LoadingSize,
    #[prop_or_default]
    pub text: Option<String>,
}

#[function_component(Loading)]
pub fn loading(props: &LoadingProps) -> Html {
    let text = props.text.as_deref().unwrap_or(DEFAULT_TEXT);

    match props.size {
        LoadingSize::Small => html! {
            <div class="flex items-center gap-2 py-2 text-sm text-gray-500">
                <span class="loading loading-spinner loading-sm"></span>
                <span>{text}</span>
            </div>
        },
        LoadingSize::Medium => html! {
            <div class="flex flex-col justify-center items-center py-12 gap-4">
                <span class="loading loading-spinner loading-md"></span>
                <p class="text-sm text-gray-500">{text}</p>
            </div>
        },
        LoadingSize::Large => html! {
            <div class="card bg-base-100 shadow">
                <div class="card-body items-center py-24 gap-4" aria-busy="true">
                    <span class="loading loading-bars loading-lg text-primary"></span>
                    <p class="text-gray-500">{text}</p>
                </div>
            </div>
        },
    }
}
