use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttsplice_backend::domain::tts::{AudioAssembler, SpliceService};
use ttsplice_backend::infrastructure::config::{Config, LogFormat};
use ttsplice_backend::infrastructure::http::start_http_server;
use ttsplice_backend::infrastructure::repositories::{GradioTtsRepository, TtsRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TTSplice Backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        tts_predict_url = %config.tts_predict_url(),
        file_url_prefix = %config.file_url_prefix(),
        "TTS backend configured"
    );

    // Transient downloads live under this directory, one subdir per request
    tokio::fs::create_dir_all(&config.download_dir).await?;
    tracing::info!(
        download_dir = %config.download_dir.display(),
        "Download directory ready"
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate the backend repository (inject shared HTTP client)
    let http_client = reqwest::Client::new();
    let tts_repo: Arc<dyn TtsRepository> = Arc::new(GradioTtsRepository::new(
        http_client,
        config.tts_predict_url(),
        config.file_url_prefix(),
    ));

    // 2. Instantiate the assembler and splice service
    let assembler = AudioAssembler::new(tts_repo.clone(), config.download_dir.clone());
    let splice_service = Arc::new(SpliceService::new(
        tts_repo,
        assembler,
        config.output_path.clone(),
        config.max_split_depth,
    ));

    // 3. Instantiate the controller (inject service)
    let tts_controller = Arc::new(ttsplice_backend::controllers::TtsController::new(
        splice_service,
        config.output_path.clone(),
    ));

    // Start HTTP server with all routes
    start_http_server(config, tts_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "ttsplice_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "ttsplice_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
