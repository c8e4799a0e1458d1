use super::super::{Model, Msg};
use super::utils::debounce;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(session) = model.conversation.session() else {
        return html! {};
    };
    let link = ctx.link().clone();

    html! {
        <div id="preview-container">
            <h2 title={session.file_name.clone()}>
                <i class="fa-solid fa-map"></i>{ format!(" {}", display_name(&session.file_name)) }
            </h2>
            { render_blueprint_image(model) }
            <p class="blueprint-id">{ format!("Blueprint {}", session.id) }</p>
            <div class="button-container">
                <button
                    class="analyze-btn"
                    style="background-color: var(--danger-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.callback(|_| Msg::Reset).emit(())
                    })}
                >
                    <i class="fa-solid fa-rotate-left"></i>{" New Analysis"}
                </button>
            </div>
        </div>
    }
}

fn render_blueprint_image(model: &Model) -> Html {
    match &model.preview_url {
        Some(url) => html! {
            <img id="actual-image-preview" src={url.to_string()} alt="Blueprint" />
        },
        None => html! {
            <div class="unavailable-preview">
                <p>{"Preview unavailable"}</p>
            </div>
        },
    }
}

fn display_name(file_name: &str) -> String {
    if file_name.chars().count() > 30 {
        let head: String = file_name.chars().take(27).collect();
        format!("{}...", head)
    } else {
        file_name.to_string()
    }
}
