use super::super::{Model, Msg};
use super::utils::{first_blueprint_file, upload_timestamp};
use crate::api;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::conversation::{Effect, Event, Phase};
use std::sync::Arc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

/// Feeds an event to the conversation and carries out the effects it asks for.
pub fn dispatch(model: &mut Model, ctx: &Context<Model>, event: Event) -> bool {
    let conversation = std::mem::take(&mut model.conversation);
    let (conversation, effects) = conversation.step(event);
    model.conversation = conversation;

    for effect in effects {
        run_effect(ctx, effect);
    }

    true
}

fn run_effect(ctx: &Context<Model>, effect: Effect) {
    match effect {
        Effect::RequestAnalysis(request) => {
            let link = ctx.link().clone();
            spawn_local(async move {
                let outcome = api::analyze_blueprint(&request).await;
                link.send_message(Msg::Conversation(Event::AnalysisCompleted {
                    request_id: request.request_id,
                    outcome,
                }));
            });
        }
    }
}

pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    if model.conversation.phase() != Phase::NoBlueprint {
        log::warn!("Ignoring {}: a blueprint is already loaded", file.name());
        return false;
    }

    model.error = None;
    let link = ctx.link().clone();
    spawn_local(async move {
        match gloo_file::futures::read_as_bytes(&file).await {
            Ok(bytes) => link.send_message(Msg::BlueprintLoaded {
                file_name: file.name(),
                preview: ObjectUrl::from(file),
                bytes,
            }),
            Err(e) => link.send_message(Msg::SetError(Some(format!(
                "Failed to read {}: {}",
                file.name(),
                e
            )))),
        }
    });

    true
}

pub fn handle_blueprint_loaded(
    model: &mut Model,
    ctx: &Context<Model>,
    file_name: String,
    bytes: Vec<u8>,
    preview: ObjectUrl,
) -> bool {
    if model.conversation.phase() != Phase::NoBlueprint {
        return false;
    }

    let id = upload_timestamp();
    log::info!("Blueprint {} loaded as {}", file_name, id);

    model.preview_url = Some(preview);
    model.question_input.clear();
    dispatch(
        model,
        ctx,
        Event::Uploaded {
            id: id.into(),
            file_name,
            image: Arc::from(bytes),
        },
    )
}

pub fn handle_submit_question(model: &mut Model, ctx: &Context<Model>) -> bool {
    let question = model.question_input.trim().to_string();
    if question.is_empty() || !model.conversation.accepts_questions() {
        return false;
    }

    model.question_input.clear();
    model.error = None;
    dispatch(model, ctx, Event::QuestionAsked(question))
}

pub fn handle_audio_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    if model.transcription.is_busy() || !model.conversation.accepts_questions() {
        return false;
    }

    let ticket = model.transcription.start();
    model.error = None;
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = api::transcribe_audio(file).await;
        link.send_message(Msg::Transcribed(ticket, result));
    });

    true
}

/// A transcription fills the question input so it can be checked before sending.
pub fn handle_transcribed(model: &mut Model, ticket: u64, result: Result<String, String>) -> bool {
    if !model.transcription.finish(ticket) {
        log::info!("Dropping transcription {} that finished after a reset", ticket);
        return false;
    }
    match result {
        Ok(text) => model.question_input = text,
        Err(reason) => model.error = Some(format!("Error: {}", reason)),
    }
    true
}

pub fn handle_reset(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.preview_url = None;
    model.question_input.clear();
    model.error = None;
    model.transcription.cancel();
    dispatch(model, ctx, Event::Reset)
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        process_file_list(ctx, file_list);
    }

    true
}

pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if model.conversation.phase() != Phase::NoBlueprint {
        return false;
    }

    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        if file_list.length() > 0 {
            event.prevent_default();
            process_file_list(ctx, file_list);
            return true;
        }
    }
    false
}

pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    match first_blueprint_file(&file_list) {
        Some(file) => ctx.link().send_message(Msg::FileChosen(file)),
        None => {
            log::warn!("No blueprint among {} dropped file(s)", file_list.length());
            ctx.link().send_message(Msg::SetError(Some(
                "Skipped files: only images and PDFs can be analysed.".into(),
            )));
        }
    }
}
