pub mod action;
pub mod agent_engine;
pub mod config;
pub mod device;
pub mod errors;
pub mod llm;
pub mod perception;
pub mod prompts;

use std::sync::Arc;

use crate::agent_engine::{run_episode, EpisodeLimits, EpisodeResult, T3aAgent};
use crate::config::AppConfig;
use crate::device::DeviceEnv;
use crate::errors::T3aResult;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default `info` level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Load `.env` (if present) and `config.toml`.
pub fn load_environment() -> T3aResult<AppConfig> {
    // A missing .env is fine; keys may already be exported.
    let _ = dotenvy::dotenv();
    config::load_config()
}

/// Build an agent from config and run one episode on `device`.
pub async fn run_task(
    device: Arc<dyn DeviceEnv>,
    config: &AppConfig,
    goal: &str,
) -> T3aResult<EpisodeResult> {
    let mut agent = T3aAgent::from_config(device, config)?;
    agent.reset(true).await?;
    let limits = EpisodeLimits::from_config(&config.episode);
    let result = run_episode(&mut agent, goal, &limits).await?;
    tracing::info!(
        done = result.done,
        steps = result.steps,
        stop_reason = ?result.stop_reason,
        "task finished"
    );
    Ok(result)
}
