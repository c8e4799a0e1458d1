mod api;
mod components;

use components::handlers::{
    dispatch, handle_audio_chosen, handle_blueprint_loaded, handle_drop, handle_file_chosen,
    handle_paste, handle_reset, handle_submit_question, handle_transcribed,
};
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::{TranscriptionTicket, render_error_message};
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::conversation::{Conversation, Event as ConversationEvent, Phase};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Yew msg components
enum Msg {
    // Blueprint
    FileChosen(GlooFile),
    BlueprintLoaded {
        file_name: String,
        bytes: Vec<u8>,
        preview: ObjectUrl,
    },
    Reset,

    // Conversation
    Conversation(ConversationEvent),
    InputChanged(String),
    SubmitQuestion,
    QuickQuestion(&'static str),
    AudioChosen(GlooFile),
    Transcribed(u64, Result<String, String>),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
struct Model {
    conversation: Conversation,
    preview_url: Option<ObjectUrl>,
    question_input: String,
    transcription: TranscriptionTicket,
    error: Option<String>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            conversation: Conversation::new(),
            preview_url: None,
            question_input: String::new(),
            transcription: TranscriptionTicket::default(),
            error: None,
            is_dragging: false,
            paste_listener: None,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // Blueprint
            Msg::FileChosen(file) => handle_file_chosen(self, ctx, file),
            Msg::BlueprintLoaded {
                file_name,
                bytes,
                preview,
            } => handle_blueprint_loaded(self, ctx, file_name, bytes, preview),
            Msg::Reset => handle_reset(self, ctx),

            // Conversation
            Msg::Conversation(event) => dispatch(self, ctx, event),
            Msg::InputChanged(value) => {
                self.question_input = value;
                true
            }
            Msg::SubmitQuestion => handle_submit_question(self, ctx),
            Msg::QuickQuestion(question) => {
                dispatch(self, ctx, ConversationEvent::QuestionAsked(question.to_string()))
            }
            Msg::AudioChosen(file) => handle_audio_chosen(self, ctx, file),
            Msg::Transcribed(ticket, result) => handle_transcribed(self, ticket, result),

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handle_paste(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                {
                    if self.conversation.phase() == Phase::NoBlueprint {
                        render_upload_section(self, ctx)
                    } else {
                        html! {
                            <div class="workspace">
                                { render_preview_area(self, ctx) }
                                { render_results(self, ctx) }
                            </div>
                        }
                    }
                }
                { render_error_message(self) }
                </main>

                <footer class="app-footer">
                    <p>{"Blueprint Analyzer | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
