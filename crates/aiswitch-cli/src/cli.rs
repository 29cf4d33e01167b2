use clap::{Parser, Subcommand};

/// aiswitch - administrative console for LLM providers and request logs
#[derive(Parser)]
#[command(name = "aiswitch", version)]
#[command(
    about = "Manage aiswitch providers and presets, and review request logs",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "AISWITCH_CONFIG",
        global = true
    )]
    pub config: Option<String>,

    /// API root of the backend, e.g. http://localhost:3400/api/
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage providers and the active provider
    #[command(subcommand)]
    Providers(ProviderCommand),

    /// Manage a provider's presets
    #[command(subcommand)]
    Presets(PresetCommand),

    /// Browse the request log
    #[command(subcommand)]
    Logs(LogCommand),

    /// Inspect the backend configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ProviderCommand {
    /// List providers; the active one is marked with '*'
    List {
        /// Show API keys in clear text
        #[arg(long)]
        reveal: bool,
    },
    /// Create a provider
    Add {
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        /// Endpoint URL
        #[arg(long, default_value = "")]
        url: String,
        /// API key
        #[arg(long, default_value = "")]
        key: String,
    },
    /// Change a provider's name, URL or key
    Edit {
        /// Provider to edit
        provider: String,
        /// Provider ids cannot change; passing a different id is rejected
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        key: Option<String>,
    },
    /// Delete a provider
    Delete {
        provider: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Activate a provider, or deactivate it if it is already active
    Toggle { provider: String },
    /// Make a provider the active one
    Activate { provider: String },
    /// Clear the active provider
    Deactivate,
}

#[derive(Subcommand)]
pub enum PresetCommand {
    /// List a provider's presets; the selected one is marked with '*'
    List { provider: String },
    /// Edit a preset, or create one with --create
    Edit {
        provider: String,
        /// Preset to edit (defaults to the provider's selected preset)
        #[arg(long, conflicts_with = "create")]
        preset: Option<String>,
        /// Start a new preset with this name; the id is derived from it
        #[arg(long, value_name = "NAME")]
        create: Option<String>,
        /// Preset id; an id that does not exist yet creates a new preset
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Set an override (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Remove an override (repeatable)
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Select a provider's preset, or clear the selection when omitted
    Use {
        provider: String,
        preset: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LogCommand {
    /// List one page of log entries
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        size: u32,
        /// Sort column (timestamp, provider_id, prompt_tokens, completion_tokens,
        /// request_time, response_time, chat, model, speed)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Show the transcript of one log entry
    Show {
        id: String,
        /// Print the raw entry as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the backend's full configuration
    Show {
        /// Show API keys in clear text
        #[arg(long)]
        reveal: bool,
    },
}

/// Parse `KEY=VALUE`; the value may itself contain '='
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}
