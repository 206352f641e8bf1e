use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::agent_engine::summarizer::SummaryFormat;
use crate::errors::{T3aError, T3aResult};
use crate::perception::traits::DescriptionStrategyKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub episode: EpisodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    pub active_provider: String,
    #[serde(default)]
    pub providers: HashMap<String, ProviderEntry>,
    /// Role-to-model mapping. If a role is absent, falls back to active_provider defaults.
    #[serde(default)]
    pub roles: RolesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub display_name: String,
    /// Full chat-completions endpoint URL.
    pub api_base: String,
    /// Default model for this provider (used as fallback when no role config exists).
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Optional API key stored in config.toml (falls back to env var T3A_<ID>_API_KEY).
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Maps agent roles to specific provider+model combinations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RolesConfig {
    /// Chooses the next action.
    pub action: Option<RoleEntry>,
    /// Summarizes the outcome of a step.
    pub summary: Option<RoleEntry>,
    /// Selects relevant elements for the model-assisted description.
    pub ui_filter: Option<RoleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Must match a key under [llm.providers.*].
    pub provider: String,
    /// Model name sent to the API.
    pub model: String,
    #[serde(default)]
    pub stream: bool,
    /// Overrides the provider-level temperature for this role.
    pub temperature: Option<f32>,
}

fn default_temperature() -> f32 {
    0.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_strategy")]
    pub description_strategy: DescriptionStrategyKind,
    #[serde(default)]
    pub summary_format: SummaryFormat,
    /// Second model call that rebuilds the action JSON from the per-action template.
    #[serde(default)]
    pub refine_action_json: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Append the raw element JSON to model-assisted descriptions.
    #[serde(default)]
    pub append_raw_elements: bool,
    /// Settle delay after executing an action, keyed by action type. Kinds not listed wait zero.
    #[serde(default = "default_settle_delays")]
    pub settle_delays_ms: BTreeMap<String, u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            description_strategy: default_strategy(),
            summary_format: SummaryFormat::default(),
            refine_action_json: false,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            append_raw_elements: false,
            settle_delays_ms: default_settle_delays(),
        }
    }
}

fn default_strategy() -> DescriptionStrategyKind {
    DescriptionStrategyKind::EnhancedFilter
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_settle_delays() -> BTreeMap<String, u64> {
    BTreeMap::from([
        (ActionKind::Click.as_str().to_string(), 2000),
        (ActionKind::OpenApp.as_str().to_string(), 3000),
    ])
}

impl AgentConfig {
    /// Settle delays keyed by parsed action kind.
    pub fn settle_delays(&self) -> T3aResult<HashMap<ActionKind, u64>> {
        self.settle_delays_ms
            .iter()
            .map(|(name, ms)| {
                ActionKind::parse(name)
                    .map(|kind| (kind, *ms))
                    .ok_or_else(|| {
                        T3aError::Config(format!("agent.settle_delays_ms: unknown action type '{name}'"))
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    /// 0 disables the wall-clock limit.
    #[serde(default)]
    pub max_duration_minutes: u32,
    /// 0 disables the limit.
    #[serde(default)]
    pub max_consecutive_failures: u32,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            max_duration_minutes: 0,
            max_consecutive_failures: 0,
        }
    }
}

fn default_max_steps() -> u32 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for per-episode JSONL step logs. Unset means the platform data dir.
    pub step_log_dir: Option<PathBuf>,
    /// Embed before/after screenshots as base64 PNG in step logs.
    #[serde(default)]
    pub include_screenshots: bool,
}

pub fn resolve_config_path() -> T3aResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(T3aError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> T3aResult<AppConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> T3aResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = from_toml_str(&content)?;
    tracing::info!(
        path = %path.display(),
        provider = %config.llm.active_provider,
        strategy = ?config.agent.description_strategy,
        "config loaded"
    );
    Ok(config)
}

pub fn from_toml_str(content: &str) -> T3aResult<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    if config.episode.max_steps == 0 {
        return Err(T3aError::Config("episode.max_steps must be at least 1".into()));
    }
    config.agent.settle_delays()?;
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> T3aResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
