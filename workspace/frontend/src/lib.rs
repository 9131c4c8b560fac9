use yew::prelude::*;

mod components;
mod pages;
pub mod api_client;
pub mod hooks;
pub mod common;
pub mod settings;

use api_client::ApiClient;
use pages::dashboard::DashboardPage;

#[function_component(App)]
pub fn app() -> Html {
    let client = use_memo((), |_| {
        let client = ApiClient::from_settings();
        log::debug!("API client created for {}", client.base_url());
        client
    });

    html! {
        <ContextProvider<ApiClient> context={(*client).clone()}>
            <DashboardPage />
        </ContextProvider<ApiClient>>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    // Settings must exist before the logger reads its level
    settings::init_settings();

    let settings = settings::get_settings();
    wasm_logger::init(wasm_logger::Config::new(settings.log_level));

    log::info!("=== Afluencia Dashboard Starting ===");
    log::info!("Application settings: {:?}", settings);
    log::debug!("API base URL: {}", settings.api_base_url());
    log::debug!("Debug mode: {}", settings.debug_mode);

    log::trace!("Initializing Yew renderer");
    yew::Renderer::<App>::new().render();
    log::info!("Application initialized successfully");
}
