use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::gemini::{self, SharedGenerator};
use crate::metadata::{DEFAULT_API_BASE, DEFAULT_MODEL, PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::quiz::{DEFAULT_DIFFICULTY, DEFAULT_QUESTION_COUNT};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server
    Serve,
    /// Show the resolved configuration
    Status,
    /// Print version information
    Version,
    /// Answer a single question from the command line
    Ask {
        /// Subject the question belongs to
        subject: String,
        /// Question text
        question: String,
    },
    /// Print a multiple-choice quiz as JSON
    Quiz {
        subject: String,
        /// Number of questions
        #[arg(long, default_value_t = DEFAULT_QUESTION_COUNT)]
        count: usize,
        /// Difficulty hint passed to the model
        #[arg(long, default_value = DEFAULT_DIFFICULTY)]
        difficulty: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Directory holding study_schedules.json and ai_cache.json
    #[arg(long, global = true, env = "STUDY_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// HTTP bind address
    #[arg(long, global = true, env = "STUDY_HTTP_ADDR", default_value = "0.0.0.0:5000")]
    pub http_addr: String,

    /// Gemini API key; AI features are disabled without it
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Gemini REST base URL
    #[arg(long, global = true, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Timeout for a single model call, in seconds
    #[arg(long, global = true, env = "GEMINI_TIMEOUT_SECS", default_value_t = 60)]
    pub ai_timeout_secs: u64,
}

impl Settings {
    pub fn default_settings() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            http_addr: "0.0.0.0:5000".to_string(),
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            ai_timeout_secs: 60,
        }
    }

    /// Validate CLI/environment-derived arguments.
    pub fn validate(&self) -> Result<(), String> {
        self.socket_addr()?;
        if self.model.trim().is_empty() {
            return Err("GEMINI_MODEL cannot be empty".to_string());
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!(
                "Invalid GEMINI_API_BASE '{}': expected an http(s) URL",
                self.api_base
            ));
        }
        if self.ai_timeout_secs == 0 {
            return Err("GEMINI_TIMEOUT_SECS must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        self.http_addr
            .parse()
            .map_err(|e| format!("Invalid STUDY_HTTP_ADDR '{}': {e}", self.http_addr))
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    /// `None` when no usable credential is configured.
    pub fn generator(&self) -> Option<SharedGenerator> {
        gemini::create_generator(
            self.gemini_api_key.as_deref(),
            &self.model,
            &self.api_base,
            self.ai_timeout(),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .is_some_and(|k| !k.is_empty() && k != gemini::PLACEHOLDER_API_KEY)
    }
}
