use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-compass-drafting"></i> {" Blueprint Analyzer"}</h1>
            <p class="subtitle">{"Upload a floor plan, get an instant analysis, then ask about it"}</p>
        </header>
    }
}
