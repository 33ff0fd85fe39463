use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Session Store Args ---
    /// Session store type (api, local)
    #[arg(long, env = "STORE_TYPE", default_value = "local")]
    pub store_type: String,

    /// Base URL of the CompareIntel API for authenticated sessions
    #[arg(long, env = "API_BASE_URL", default_value = "http://127.0.0.1:4000")]
    pub api_base_url: String,

    /// API key sent as a bearer token to the remote session store
    #[arg(long, env = "API_KEY")]
    pub api_key: Option<String>,

    /// Directory holding anonymous session files for the local store
    #[arg(long, env = "DATA_DIR", default_value = ".compareintel/sessions")]
    pub data_dir: String,

    // --- Replay Args ---
    /// Session id to load and replay
    #[arg(long, env = "SESSION_ID")]
    pub session_id: Option<String>,

    /// List saved sessions instead of replaying one
    #[arg(long, default_value = "false")]
    pub list: bool,

    /// Window in milliseconds within which identical replies from the
    /// same model are suppressed as double-submission artifacts
    #[arg(long, env = "DUPLICATE_WINDOW_MS", default_value = "1000")]
    pub duplicate_window_ms: i64,

    /// Output format for transcripts (text, json)
    #[arg(long, env = "OUTPUT_FORMAT", default_value = "text")]
    pub output_format: String,
}
