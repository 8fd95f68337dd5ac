use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::panel::FailurePolicy;

/// Config file picked up from the working directory when none is given.
const CWD_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Host to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Show failed submissions as error entries
    #[arg(long, env = "SURFACE_ERRORS")]
    pub surface_errors: Option<bool>,

    /// Emit JSON log lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub surface_errors: bool,
    pub placeholder: String,
    pub session_timeout_secs: u64,
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<Suggestion>,
}

/// Example prompt offered on an empty transcript.
#[derive(Debug, Deserialize, serde::Serialize, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub heading: String,
    pub message: String,
}

impl Suggestion {
    /// Suggestion whose heading is its message.
    #[must_use]
    pub fn same(text: &str) -> Self {
        Self {
            heading: text.to_string(),
            message: text.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub timeout_secs: u64,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

fn default_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::same("How IIT Bombay produces the best Engineers in India"),
        Suggestion::same("What is the meaning and purpose of life?"),
        Suggestion::same("Reviews of Chandigarh University"),
    ]
}

impl ChatConfig {
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::from_surface_errors(self.surface_errors)
    }

    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

impl LlmConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layer defaults, config file, `COGNO_` env vars and CLI flags.
    ///
    /// Priority: CLI flag > CLI env var > `COGNO_*` env > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("chat.surface_errors", true)?
            .set_default("chat.placeholder", "Ask a question...")?
            .set_default("chat.session_timeout_secs", 30 * 60)?
            .set_default("llm.timeout_secs", 60)?
            .set_default("logging.json", false)?;

        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::with_name(path).required(true));
            }
            None if Path::new(CWD_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(CWD_CONFIG_FILE).required(false));
            }
            None => {}
        }

        // E.g. COGNO_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("COGNO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(surface) = cli.surface_errors {
            builder = builder.set_override("chat.surface_errors", surface)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        builder.build()?.try_deserialize()
    }
}
