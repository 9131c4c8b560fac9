use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub children: Children,
    pub title: String,
    #[prop_or_default]
    pub subtitle: Option<String>,
}

#[derive(Properties, PartialEq)]
struct NavbarProps {
    title: String,
    subtitle: Option<String>,
}

#[function_component(Navbar)]
fn navbar(props: &NavbarProps) -> Html {
    html! {
        <div class="navbar bg-base-100 shadow-sm z-40 sticky top-0">
            <div class="flex-1 px-4 gap-3">
                <i class="fas fa-subway text-xl text-primary"></i>
                <div class="flex flex-col">
                    <h1 class="text-xl font-bold" id="page-title">{ &props.title }</h1>
                    if let Some(subtitle) = &props.subtitle {
                        <span class="text-xs text-gray-500">{ subtitle }</span>
                    }
                </div>
            </div>
        </div>
    }
}

/// Single-page shell: header bar plus a centered content column.
#[function_component(Layout)]
pub fn layout(props: &Props) -> Html {
    html! {
        <div class="flex flex-col min-h-screen bg-base-200">
            <Navbar title={props.title.clone()} subtitle={props.subtitle.clone()} />
            <main class="flex-1 p-6 overflow-y-auto">
                <div class="max-w-6xl mx-auto flex flex-col gap-6">
                    { for props.children.iter() }
                </div>
            </main>
        </div>
    }
}
