mod config;
mod error;
mod form;
mod routes;
mod speech;
mod storage;
mod vision;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use routes::configure_routes;
use speech::google::GoogleSpeechRecognizer;
use speech::whisper::WhisperRecognizer;
use speech::{SpeechRecognizer, Transcriber};
use std::env;
use std::sync::Arc;
use storage::upload_store::UploadStore;
use vision::BlueprintAnalyzer;
use vision::openai::OpenAiVisionModel;

fn build_transcriber(config: &AppConfig) -> Transcriber {
    let mut strategies: Vec<Box<dyn SpeechRecognizer>> =
        vec![Box::new(WhisperRecognizer::new(config))];

    match &config.google_speech_api_key {
        Some(key) => strategies.push(Box::new(GoogleSpeechRecognizer::new(
            key.clone(),
            config.google_speech_language.clone(),
        ))),
        None => log::warn!("GOOGLE_SPEECH_API_KEY not set; transcription has no fallback recognizer"),
    }

    Transcriber::new(strategies)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    if config.openai_api_key.is_none() {
        log::warn!("OPENAI_API_KEY is not set. Analyses will return error results.");
    }

    let store = UploadStore::new(&config.upload_dir).map_err(|e| {
        log::error!("Failed to create upload directory: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    log::info!("Uploads stored in {}", store.dir().display());

    let analyzer = web::Data::new(BlueprintAnalyzer::new(Arc::new(OpenAiVisionModel::new(
        &config,
    ))));
    let transcriber = web::Data::new(build_transcriber(&config));
    log::info!(
        "Vision model: {}; transcription strategies: {}",
        config.openai_model,
        transcriber.strategy_names().join(" -> ")
    );
    let store = web::Data::new(store);

    let frontend_dir = config.frontend_dir.clone();
    let bind_address = config.bind_address();

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(analyzer.clone())
            .app_data(transcriber.clone())
            .app_data(store.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
