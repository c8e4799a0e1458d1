use super::super::{Model, Msg};
use shared::conversation::{ANALYZING_MARKER, QUICK_QUESTIONS, Role, Turn};
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

/// The chat panel: transcript, quick questions, and the question input.
pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let conversation = &model.conversation;

    html! {
        <div class="results-container chat-panel">
            <div class="result-header">
                <h2><i class="fa-solid fa-comments"></i>{" Analysis"}</h2>
            </div>
            <div class="chat-messages">
                { for conversation.turns().iter().map(render_turn) }
                {
                    if conversation.is_busy()
                        && conversation.turns().last().is_some_and(|turn| turn.role == Role::User)
                    {
                        html! {
                            <div class="chat-message assistant thinking">
                                <i class="fa-solid fa-spinner fa-spin"></i>{" Thinking..."}
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
            { render_quick_questions(model, ctx) }
            { render_input_area(model, ctx) }
        </div>
    }
}

fn render_turn(turn: &Turn) -> Html {
    let analyzing = turn.role == Role::Assistant && turn.content.contains(ANALYZING_MARKER);

    html! {
        <div class={classes!("chat-message", turn.role.to_string(), analyzing.then_some("analyzing"))}>
            {
                if analyzing {
                    html! { <i class="fa-solid fa-spinner fa-spin"></i> }
                } else {
                    html! {}
                }
            }
            <div class="message-content">{ &turn.content }</div>
        </div>
    }
}

fn render_quick_questions(model: &Model, ctx: &Context<Model>) -> Html {
    if !model.conversation.offers_quick_questions() {
        return html! {};
    }

    let link = ctx.link();
    html! {
        <div class="quick-questions">
            <h3>{"Quick questions"}</h3>
            <div class="quick-question-list">
                { for QUICK_QUESTIONS.iter().map(|&question| html! {
                    <button
                        class="quick-question"
                        onclick={link.callback(move |_| Msg::QuickQuestion(question))}
                    >
                        { question }
                    </button>
                })}
            </div>
        </div>
    }
}

fn render_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let enabled = model.conversation.accepts_questions();

    let on_input = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::InputChanged(input.value())
    });
    let on_keydown = link.batch_callback(|e: KeyboardEvent| {
        (e.key() == "Enter" && !e.shift_key()).then_some(Msg::SubmitQuestion)
    });
    let on_audio = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input
            .files()
            .and_then(|files| files.item(0))
            .map(gloo_file::File::from);
        input.set_value("");
        file.map(Msg::AudioChosen)
    });

    let transcribing = model.transcription.is_busy();
    let placeholder = if transcribing {
        "Transcribing audio..."
    } else if enabled {
        "Ask a follow-up question about the blueprint"
    } else {
        "Waiting for the analysis to finish..."
    };

    html! {
        <div class="chat-input-area">
            <input
                type="text"
                class="chat-input"
                value={model.question_input.clone()}
                placeholder={placeholder}
                disabled={!enabled || transcribing}
                oninput={on_input}
                onkeydown={on_keydown}
            />
            <label
                class={classes!("analyze-btn", "audio-btn", (!enabled || transcribing).then_some("disabled"))}
                title="Upload a recorded question"
            >
                {
                    if transcribing {
                        html! { <i class="fa-solid fa-spinner fa-spin"></i> }
                    } else {
                        html! { <i class="fa-solid fa-microphone"></i> }
                    }
                }
                <input
                    type="file"
                    accept="audio/*"
                    style="display: none;"
                    disabled={!enabled || transcribing}
                    onchange={on_audio}
                />
            </label>
            <button
                class="analyze-btn"
                disabled={!enabled || model.question_input.trim().is_empty()}
                onclick={link.callback(|_| Msg::SubmitQuestion)}
            >
                <i class="fa-solid fa-paper-plane"></i>{" Send"}
            </button>
        </div>
    }
}
