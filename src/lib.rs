pub mod ai;
pub mod assistant;
pub mod capture;
pub mod config;
pub mod error;
pub mod session;
pub mod subject;

pub use ai::{AIResponse, GeminiClient, GenerativeBackend};
pub use assistant::StudyAssistant;
pub use capture::{ImagePayload, PendingInput};
pub use config::AppConfig;
pub use error::{AiError, ErrorKind, UserNotice};
pub use session::{HistoryId, HistoryItem, SessionStore};
pub use subject::Subject;

/// Installs the `env_logger` backend, defaulting to `info` unless `RUST_LOG` says otherwise.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Loads configuration from the per-user directory and builds a ready assistant.
pub fn init() -> anyhow::Result<StudyAssistant> {
    init_logging();

    let config = match AppConfig::default_dir() {
        Some(dir) => AppConfig::load(&dir),
        None => {
            log::warn!("No config directory on this platform; using defaults");
            AppConfig::default()
        }
    };
    if config.gemini_api_key.is_empty() {
        log::warn!("GEMINI_API_KEY is not set; requests will fail until it is configured");
    }

    let assistant = StudyAssistant::from_config(&config)?;
    log::info!("Study copilot initialized (model: {})", config.gemini_model);
    Ok(assistant)
}
