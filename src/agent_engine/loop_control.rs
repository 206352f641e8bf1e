// Episode driver: repeats agent steps until the goal is reached or a limit trips.
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::agent_engine::engine::T3aAgent;
use crate::agent_engine::state::StepResult;
use crate::config::EpisodeConfig;
use crate::errors::T3aResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeLimits {
    pub max_steps: u32,
    pub max_duration: Option<Duration>,
    pub max_consecutive_failures: Option<u32>,
}

impl EpisodeLimits {
    pub fn steps(max_steps: u32) -> Self {
        Self {
            max_steps,
            max_duration: None,
            max_consecutive_failures: None,
        }
    }

    pub fn from_config(config: &EpisodeConfig) -> Self {
        Self {
            max_steps: config.max_steps,
            max_duration: (config.max_duration_minutes > 0)
                .then(|| Duration::from_secs(u64::from(config.max_duration_minutes) * 60)),
            max_consecutive_failures: (config.max_consecutive_failures > 0)
                .then_some(config.max_consecutive_failures),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    GoalReached,
    MaxSteps,
    TimeLimit,
    TooManyFailures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeResult {
    pub done: bool,
    pub steps: u32,
    pub stop_reason: StopReason,
    pub last_summary: Option<String>,
}

pub struct LoopController {
    limits: EpisodeLimits,
    start_time: Instant,
    steps: u32,
    consecutive_failures: u32,
}

impl LoopController {
    pub fn new(limits: EpisodeLimits) -> Self {
        Self {
            limits,
            start_time: Instant::now(),
            steps: 0,
            consecutive_failures: 0,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn record(&mut self, result: &StepResult) {
        self.steps += 1;
        if result.outcome.is_success() {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
        }
    }

    /// Checked before each step.
    pub fn should_stop(&self) -> Option<StopReason> {
        if self.steps >= self.limits.max_steps {
            return Some(StopReason::MaxSteps);
        }
        if let Some(max) = self.limits.max_duration {
            if self.start_time.elapsed() >= max {
                return Some(StopReason::TimeLimit);
            }
        }
        if let Some(max) = self.limits.max_consecutive_failures {
            if self.consecutive_failures >= max {
                return Some(StopReason::TooManyFailures);
            }
        }
        None
    }
}

/// Drive `agent` towards `goal` until it reports done or a limit is hit.
pub async fn run_episode(
    agent: &mut T3aAgent,
    goal: &str,
    limits: &EpisodeLimits,
) -> T3aResult<EpisodeResult> {
    let mut control = LoopController::new(*limits);
    let mut last_summary = None;
    tracing::info!(goal, max_steps = limits.max_steps, episode = %agent.episode_id(), "episode started");

    loop {
        if let Some(stop_reason) = control.should_stop() {
            tracing::warn!(?stop_reason, steps = control.steps(), "episode stopped before the goal was reached");
            return Ok(EpisodeResult {
                done: false,
                steps: control.steps(),
                stop_reason,
                last_summary,
            });
        }

        let result = agent.step(goal).await?;
        control.record(&result);
        last_summary = Some(result.summary);

        if result.done {
            tracing::info!(steps = control.steps(), "episode finished");
            return Ok(EpisodeResult {
                done: true,
                steps: control.steps(),
                stop_reason: StopReason::GoalReached,
                last_summary,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_engine::settle::WaitPolicy;
    use crate::agent_engine::state::StepOutcome;
    use crate::agent_engine::testing::{reply, FakeDevice, ScriptedModel};
    use crate::errors::T3aError;
    use crate::llm::model::Prediction;
    use std::sync::Arc;

    const CLICK: &str = "Reason: r\nAction: {\"action_type\": \"click\", \"index\": 0}";
    const DONE: &str = "Reason: r\nAction: {\"action_type\": \"status\", \"goal_status\": \"complete\"}";

    fn agent(replies: Vec<Prediction>) -> T3aAgent {
        T3aAgent::new(Arc::new(FakeDevice::new()), Arc::new(ScriptedModel::new(replies)))
            .with_wait_policy(WaitPolicy::none())
    }

    #[test]
    fn zero_config_values_disable_limits() {
        let limits = EpisodeLimits::from_config(&EpisodeConfig::default());
        assert_eq!(limits, EpisodeLimits::steps(30));

        let limits = EpisodeLimits::from_config(&EpisodeConfig {
            max_steps: 5,
            max_duration_minutes: 2,
            max_consecutive_failures: 3,
        });
        assert_eq!(limits.max_duration, Some(Duration::from_secs(120)));
        assert_eq!(limits.max_consecutive_failures, Some(3));
    }

    #[test]
    fn failures_reset_on_success() {
        let mut control = LoopController::new(EpisodeLimits {
            max_consecutive_failures: Some(2),
            ..EpisodeLimits::steps(10)
        });
        let failed = StepResult {
            done: false,
            step: 1,
            outcome: StepOutcome::MalformedOutput,
            summary: String::new(),
        };
        let executed = StepResult {
            outcome: StepOutcome::Executed {
                action_type: crate::action::ActionKind::Wait,
            },
            ..failed.clone()
        };

        control.record(&failed);
        control.record(&executed);
        control.record(&failed);
        assert_eq!(control.should_stop(), None);
        control.record(&failed);
        assert_eq!(control.should_stop(), Some(StopReason::TooManyFailures));
    }

    #[tokio::test]
    async fn stops_when_goal_reached() {
        let mut agent = agent(vec![reply(CLICK), reply("clicked"), reply(DONE)]);
        let result = run_episode(&mut agent, "g", &EpisodeLimits::steps(10)).await.unwrap();
        assert!(result.done);
        assert_eq!(result.steps, 2);
        assert_eq!(result.stop_reason, StopReason::GoalReached);
        assert_eq!(agent.history().len(), 2);
    }

    #[tokio::test]
    async fn stops_at_step_budget() {
        let mut agent = agent(vec![reply(CLICK), reply("clicked"), reply(CLICK), reply("clicked")]);
        let result = run_episode(&mut agent, "g", &EpisodeLimits::steps(2)).await.unwrap();
        assert!(!result.done);
        assert_eq!(result.steps, 2);
        assert_eq!(result.stop_reason, StopReason::MaxSteps);
        assert!(result.last_summary.unwrap().ends_with("clicked"));
    }

    #[tokio::test]
    async fn stops_after_consecutive_failures() {
        let mut agent = agent(vec![reply("hmm"), reply("hmm"), reply(DONE)]);
        let limits = EpisodeLimits {
            max_consecutive_failures: Some(2),
            ..EpisodeLimits::steps(10)
        };
        let result = run_episode(&mut agent, "g", &limits).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::TooManyFailures);
        assert_eq!(result.steps, 2);
    }

    #[tokio::test]
    async fn fatal_step_error_aborts_episode() {
        let mut agent = agent(vec![reply(CLICK), reply("clicked")]);
        let err = run_episode(&mut agent, "g", &EpisodeLimits::steps(5)).await.unwrap_err();
        assert!(matches!(err, T3aError::ModelUnavailable(_)));
        assert_eq!(agent.history().len(), 1);
    }
}
