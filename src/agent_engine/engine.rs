use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tracing::Instrument;
use uuid::Uuid;

use crate::action::{extract_json, parse_reason_action, Action, GoalStatus};
use crate::agent_engine::history::{History, JsonlStepLog, StepObserver, StepRecord};
use crate::agent_engine::settle::WaitPolicy;
use crate::agent_engine::state::{StepOutcome, StepPhase, StepResult};
use crate::agent_engine::summarizer::{interpret_summary, SummaryFormat};
use crate::config::AppConfig;
use crate::device::DeviceEnv;
use crate::errors::{T3aError, T3aResult};
use crate::llm::model::{RoleModel, TextModel};
use crate::llm::registry::{ModelRole, ProviderRegistry};
use crate::perception::annotator::mark_element;
use crate::perception::registry::StrategyRegistry;
use crate::perception::traits::DescriptionStrategyKind;
use crate::perception::types::{FrameBoundary, Orientation, ScreenSize, UIElement};
use crate::prompts::{action_execution_prompt, action_selection_prompt, summarize_prompt};

const FORMAT_ERROR: &str =
    "Output for action selection is not in the correct format, so no action is performed.";
const PARSE_ERROR: &str = "Can not parse the output to a valid action. Please make sure to pick \
the action from the list with the correct json format!";
const INDEX_ERROR: &str =
    "The parameter index is out of range. Remember the index must be in the UI element list!";
const GOAL_REACHED: &str = "Agent thinks the request has been completed.";
const ACTION_MODEL_ERROR: &str = "Error calling LLM in action selection phase.";
const SUMMARY_MODEL_ERROR: &str = "Error calling LLM in summarization phase.";
const SUMMARY_VETOED: &str = "Summary triggered LLM safety classifier.";
const SAFETY_OVERRIDE: &str = "Reason: Triggered LLM safety classifier.\n\
Action: {\"action_type\": \"status\", \"goal_status\": \"infeasible\"}";

/// Text-only agent driving one Android session.
pub struct T3aAgent {
    name: String,
    device: Arc<dyn DeviceEnv>,
    action_model: Arc<dyn TextModel>,
    summary_model: Arc<dyn TextModel>,
    strategies: StrategyRegistry,
    strategy: DescriptionStrategyKind,
    summary_format: SummaryFormat,
    refine_action_json: bool,
    wait_policy: WaitPolicy,
    observers: Vec<Arc<dyn StepObserver>>,
    history: History,
    guidelines: Option<Vec<String>>,
    episode_id: Uuid,
    phase: StepPhase,
}

impl T3aAgent {
    /// One model for both phases, enhanced-filter descriptions, default waits.
    pub fn new(device: Arc<dyn DeviceEnv>, model: Arc<dyn TextModel>) -> Self {
        Self {
            name: "T3A".into(),
            device,
            summary_model: model.clone(),
            action_model: model,
            strategies: StrategyRegistry::with_defaults(None, false),
            strategy: DescriptionStrategyKind::EnhancedFilter,
            summary_format: SummaryFormat::Plain,
            refine_action_json: false,
            wait_policy: WaitPolicy::default(),
            observers: Vec::new(),
            history: History::default(),
            guidelines: None,
            episode_id: Uuid::new_v4(),
            phase: StepPhase::Idle,
        }
    }

    /// Build the agent and its model clients from `config.toml` settings.
    pub fn from_config(device: Arc<dyn DeviceEnv>, config: &AppConfig) -> T3aResult<Self> {
        let providers = ProviderRegistry::from_config(&config.llm);
        let agent = &config.agent;
        let retry_delay = Duration::from_millis(agent.retry_delay_ms);
        let role_model = |role| -> T3aResult<Arc<dyn TextModel>> {
            let model = RoleModel::for_role(&providers, role, agent.max_retries, retry_delay)?;
            Ok(Arc::new(model))
        };

        let filter_model = match agent.description_strategy {
            DescriptionStrategyKind::ModelAssisted => Some(role_model(ModelRole::UiFilter)?),
            _ => None,
        };
        let strategies = StrategyRegistry::with_defaults(filter_model, agent.append_raw_elements);
        let step_log = JsonlStepLog::from_config(
            config.logging.step_log_dir.clone(),
            config.logging.include_screenshots,
        )?;

        tracing::info!(
            strategy = %agent.description_strategy,
            summary_format = ?agent.summary_format,
            refine = agent.refine_action_json,
            providers = ?providers.list_names(),
            "agent configured"
        );

        Ok(Self::new(device, role_model(ModelRole::Action)?)
            .with_summary_model(role_model(ModelRole::Summary)?)
            .with_strategies(strategies, agent.description_strategy)?
            .with_summary_format(agent.summary_format)
            .with_refinement(agent.refine_action_json)
            .with_wait_policy(WaitPolicy::from_config(agent)?)
            .with_observer(Arc::new(step_log)))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_summary_model(mut self, model: Arc<dyn TextModel>) -> Self {
        self.summary_model = model;
        self
    }

    pub fn with_strategies(
        mut self,
        strategies: StrategyRegistry,
        active: DescriptionStrategyKind,
    ) -> T3aResult<Self> {
        strategies.get(active)?;
        self.strategies = strategies;
        self.strategy = active;
        Ok(self)
    }

    pub fn with_summary_format(mut self, format: SummaryFormat) -> Self {
        self.summary_format = format;
        self
    }

    pub fn with_refinement(mut self, enabled: bool) -> Self {
        self.refine_action_json = enabled;
        self
    }

    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn episode_id(&self) -> Uuid {
        self.episode_id
    }

    pub fn set_task_guidelines(&mut self, guidelines: Vec<String>) {
        self.guidelines = Some(guidelines);
    }

    /// Start a new episode: forget history, reset the device and hide the
    /// automation overlay.
    pub async fn reset(&mut self, go_home: bool) -> T3aResult<()> {
        self.history.clear();
        self.episode_id = Uuid::new_v4();
        self.phase = StepPhase::Idle;
        self.device.reset(go_home).await?;
        self.device.hide_automation_ui().await?;
        tracing::info!(agent = %self.name, episode = %self.episode_id, go_home, "agent reset");
        Ok(())
    }

    /// Run one observe, decide, act, summarize cycle towards `goal`.
    ///
    /// Only an unreachable action model or a failed first capture return an
    /// error; every other failure is recorded as the step's summary.
    pub async fn step(&mut self, goal: &str) -> T3aResult<StepResult> {
        let step = self.history.len() + 1;
        let span = tracing::info_span!("step", step, episode = %self.episode_id);
        let result = self.run_step(goal, step).instrument(span).await;
        self.phase = StepPhase::Idle;
        result
    }

    async fn run_step(&mut self, goal: &str, step: usize) -> T3aResult<StepResult> {
        tracing::info!(agent = %self.name, goal, "step started");
        let mut record = StepRecord::new(step, self.episode_id, goal);
        let strategy = self.strategies.get(self.strategy)?;

        self.phase = StepPhase::CapturingBefore;
        let before = self.device.get_post_transition_state().await?;
        let screen = self.device.logical_screen_size();
        let before_description = strategy.describe(&before.ui_elements, screen, goal).await;
        record.before_screenshot = Some(before.screenshot);
        record.before_elements = before.ui_elements;
        record.before_description = Some(before_description.clone());

        self.phase = StepPhase::SelectingAction;
        let summaries = self.history.summaries();
        let action_prompt = action_selection_prompt(
            goal,
            &summaries,
            &before_description,
            self.guidelines.as_deref(),
        );
        let prediction = self.action_model.predict(&action_prompt).await;
        record.action_prompt = Some(action_prompt);

        let action_output = if prediction.is_vetoed() {
            tracing::warn!("action output blocked by safety classifier, declaring infeasible");
            SAFETY_OVERRIDE.to_string()
        } else {
            prediction.text
        };
        let Some(raw_response) = prediction.raw_response else {
            tracing::error!(model = self.action_model.model_name(), "{ACTION_MODEL_ERROR}");
            return Err(T3aError::ModelUnavailable(ACTION_MODEL_ERROR.into()));
        };
        tracing::debug!(output = %action_output, "action output");
        record.action_output = Some(action_output.clone());
        record.action_raw_response = Some(raw_response);

        self.phase = StepPhase::ParsingAction;
        let (Some(reason), Some(mut action_text)) = parse_reason_action(&action_output) else {
            tracing::warn!("action output is not in the Reason/Action format");
            return Ok(self.finish(record, false, StepOutcome::MalformedOutput, FORMAT_ERROR.into()));
        };
        record.reason = Some(reason.clone());
        record.action_text = Some(action_text.clone());

        let mut action = match decode_action(&action_text) {
            Ok(action) => action,
            Err(error) => {
                tracing::warn!(%error, action = %action_text, "cannot convert output to an action");
                let outcome = StepOutcome::UnparsableAction { error };
                return Ok(self.finish(record, false, outcome, PARSE_ERROR.into()));
            }
        };

        if self.refine_action_json {
            let refined = self
                .refine_action(goal, &summaries, &before_description, &action, &mut record)
                .await;
            if let Some((refined, text)) = refined {
                action = refined;
                action_text = text;
            }
        }
        tracing::info!(action = %action, reason = %reason, "action selected");
        record.action = Some(action.clone());
        let kind = action.kind();

        let element_count = record.before_elements.len();
        if let Some(index) = action.target_indices().into_iter().find(|&i| i >= element_count) {
            tracing::warn!(index, element_count, "action index out of range");
            let outcome = StepOutcome::IndexOutOfRange {
                index,
                element_count,
            };
            return Ok(self.finish(record, false, outcome, INDEX_ERROR.into()));
        }
        self.mark_targets(&action, &mut record, screen).await;

        if let Action::Status { goal_status } = action {
            match goal_status {
                GoalStatus::Complete => tracing::info!("agent reports the goal complete"),
                GoalStatus::Infeasible => {
                    tracing::warn!("agent stopped since it thinks the goal is infeasible")
                }
            }
            let outcome = StepOutcome::GoalReached { goal_status };
            return Ok(self.finish(record, true, outcome, GOAL_REACHED.into()));
        }
        if let Action::Answer { text } = &action {
            tracing::info!(answer = %text, "agent answered");
        }

        self.phase = StepPhase::Executing;
        if let Err(e) = self
            .device
            .execute_action(&action, &record.before_elements)
            .await
        {
            tracing::warn!(error = %e, action_type = %kind, "action execution failed");
            let outcome = StepOutcome::ExecutionFailed {
                action_type: kind,
                error: e.to_string(),
            };
            let summary = format!("Some error happened executing the action {kind}");
            return Ok(self.finish(record, false, outcome, summary));
        }

        self.phase = StepPhase::Settling;
        let delay = self.wait_policy.delay_for(kind);
        if !delay.is_zero() {
            let delay_ms = delay.as_millis() as u64;
            tracing::debug!(action_type = %kind, delay_ms, "waiting for UI to settle");
            tokio::time::sleep(delay).await;
        }

        self.phase = StepPhase::CapturingAfter;
        let after = match self.device.get_post_transition_state().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "after-action capture failed");
                let outcome = StepOutcome::ObservationFailed {
                    action_type: kind,
                    error: e.to_string(),
                };
                let summary =
                    format!("Could not observe the screen after executing the action {kind}");
                return Ok(self.finish(record, false, outcome, summary));
            }
        };
        let after_screen = self.device.logical_screen_size();
        let after_description = strategy.describe(&after.ui_elements, after_screen, goal).await;
        record.after_screenshot = Some(after.screenshot);
        record.after_elements = Some(after.ui_elements);
        record.after_description = Some(after_description.clone());

        self.phase = StepPhase::Summarizing;
        let summary_prompt = summarize_prompt(
            self.summary_format,
            goal,
            &action_text,
            &reason,
            &before_description,
            &after_description,
        );
        let started = std::time::Instant::now();
        let prediction = self.summary_model.predict(&summary_prompt).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(elapsed_ms, "summarization finished");
        record.summary_prompt = Some(summary_prompt);

        let summary = if prediction.is_unavailable() {
            tracing::error!(model = self.summary_model.model_name(), "{SUMMARY_MODEL_ERROR}");
            SUMMARY_MODEL_ERROR.to_string()
        } else if prediction.is_vetoed() {
            tracing::warn!("summary blocked by safety classifier");
            record.summary_output = Some(SUMMARY_VETOED.into());
            format!("Action selected: {action_text}. {SUMMARY_VETOED}")
        } else {
            let (line, assessment) = interpret_summary(self.summary_format, &prediction.text);
            record.summary_output = Some(prediction.text.clone());
            record.assessment = assessment;
            format!("Action selected: {action_text}. {line}")
        };
        record.summary_raw_response = prediction.raw_response;

        Ok(self.finish(record, false, StepOutcome::Executed { action_type: kind }, summary))
    }

    /// Ask for the final JSON using the chosen kind's template. Returns
    /// `None` to keep the first-stage action.
    async fn refine_action(
        &self,
        goal: &str,
        summaries: &[String],
        ui_description: &str,
        action: &Action,
        record: &mut StepRecord,
    ) -> Option<(Action, String)> {
        let prompt = action_execution_prompt(
            action.kind(),
            goal,
            summaries,
            ui_description,
            self.guidelines.as_deref(),
        );
        let prediction = self.action_model.predict(&prompt).await;
        record.refinement_prompt = Some(prompt);
        if prediction.is_unavailable() || prediction.is_vetoed() {
            tracing::warn!("action refinement unavailable, keeping first-stage action");
            return None;
        }
        record.refinement_output = Some(prediction.text.clone());

        let (_, refined_text) = parse_reason_action(&prediction.text);
        let text = refined_text.unwrap_or_else(|| prediction.text.trim().to_string());
        match decode_action(&text) {
            Ok(refined) => {
                if refined.kind() != action.kind() {
                    tracing::info!(from = %action.kind(), to = %refined.kind(), "refinement changed action type");
                }
                Some((refined, text))
            }
            Err(error) => {
                tracing::warn!(%error, "refined action unreadable, keeping first-stage action");
                None
            }
        }
    }

    async fn mark_targets(&self, action: &Action, record: &mut StepRecord, screen: ScreenSize) {
        let indices = action.target_indices();
        if indices.is_empty() {
            return;
        }
        let frame = match self.device.physical_frame_boundary().await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read frame boundary, target not marked");
                return;
            }
        };
        let orientation = match self.device.orientation().await {
            Ok(o) => o,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read orientation, target not marked");
                return;
            }
        };
        if let Some(canvas) = record.before_screenshot.as_mut() {
            mark_all(canvas, &record.before_elements, &indices, screen, frame, orientation);
        }
    }

    fn finish(
        &mut self,
        mut record: StepRecord,
        done: bool,
        outcome: StepOutcome,
        summary: String,
    ) -> StepResult {
        record.summary = summary.clone();
        record.outcome = Some(outcome.clone());
        record.finished_at = Some(chrono::Utc::now());

        for observer in &self.observers {
            if let Err(e) = observer.on_step(&record) {
                tracing::warn!(error = %e, "step observer failed");
            }
        }
        tracing::info!(done, outcome = ?outcome, summary = %summary, "step finished");

        let result = StepResult {
            done,
            step: record.step,
            outcome,
            summary,
        };
        self.history.push(record);
        result
    }
}

fn decode_action(text: &str) -> Result<Action, String> {
    let map = extract_json(text).ok_or_else(|| "no JSON object found".to_string())?;
    Action::from_map(&map).map_err(|e| e.to_string())
}

fn mark_all(
    canvas: &mut RgbaImage,
    elements: &[UIElement],
    indices: &[usize],
    screen: ScreenSize,
    frame: FrameBoundary,
    orientation: Orientation,
) {
    for &index in indices {
        if let Err(e) = mark_element(canvas, &elements[index], index, screen, frame, orientation) {
            tracing::warn!(index, error = %e, "cannot mark target element");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, ScrollDirection};
    use crate::agent_engine::testing::{blank_screen, elements, reply, vetoed, FakeDevice, ScriptedModel};
    use crate::device::DeviceState;
    use crate::llm::model::Prediction;
    use std::sync::Mutex;

    const CLICK_OK: &str = "Reason: confirm the dialog\nAction: {\"action_type\": \"click\", \"index\": 0}";

    fn agent(device: Arc<FakeDevice>, model: Arc<ScriptedModel>) -> T3aAgent {
        T3aAgent::new(device, model).with_wait_policy(WaitPolicy::none())
    }

    #[tokio::test]
    async fn executed_step_summarizes_and_feeds_history() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply(CLICK_OK),
            reply("Clicked OK, dialog closed."),
            reply("Reason: done\nAction: {\"action_type\": \"status\", \"goal_status\": \"complete\"}"),
        ]));
        let mut agent = agent(device.clone(), model.clone());

        let result = agent.step("Close the dialog").await.unwrap();
        assert!(!result.done);
        assert_eq!(result.outcome, StepOutcome::Executed { action_type: ActionKind::Click });
        assert_eq!(
            result.summary,
            "Action selected: {\"action_type\": \"click\", \"index\": 0}. Clicked OK, dialog closed."
        );
        assert_eq!(device.executed(), vec![Action::Click { index: 0 }]);
        assert_eq!(device.captures_taken(), 2);

        let record = agent.history().last().unwrap();
        assert_eq!(record.reason.as_deref(), Some("confirm the dialog"));
        assert!(record.after_elements.is_some());
        assert!(record.summary_prompt.as_deref().unwrap().contains("Based on the reason: confirm the dialog"));
        // Target got marked on the before screenshot.
        let shot = record.before_screenshot.as_ref().unwrap();
        assert_ne!(shot, &blank_screen());

        let second = agent.step("Close the dialog").await.unwrap();
        assert!(second.done);
        let prompts = model.prompts();
        assert!(prompts[0].contains("You just started, no action has been performed yet."));
        assert!(prompts[2].contains("Step 1: Action selected: {\"action_type\": \"click\", \"index\": 0}."));
        assert!(prompts[2].contains("UI element 0: This is a clickable UI element with label 'OK'"));
        assert_eq!(agent.history().len(), 2);
    }

    #[tokio::test]
    async fn malformed_output_performs_nothing() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![reply("I will click OK.")]));
        let mut agent = agent(device.clone(), model);

        let result = agent.step("g").await.unwrap();
        assert!(!result.done);
        assert_eq!(result.outcome, StepOutcome::MalformedOutput);
        assert_eq!(result.summary, FORMAT_ERROR);
        assert!(device.executed().is_empty());
        assert_eq!(agent.history().len(), 1);
    }

    #[tokio::test]
    async fn unparsable_action_is_recorded() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply("Reason: r\nAction: {\"action_type\": \"swipe\"}"),
            reply("Reason: r\nAction: click the button"),
        ]));
        let mut agent = agent(device.clone(), model);

        for _ in 0..2 {
            let result = agent.step("g").await.unwrap();
            assert_eq!(result.summary, PARSE_ERROR);
            assert!(matches!(result.outcome, StepOutcome::UnparsableAction { .. }));
        }
        assert!(device.executed().is_empty());
        assert_eq!(agent.history().len(), 2);
    }

    #[tokio::test]
    async fn index_must_be_inside_the_snapshot() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply("Reason: r\nAction: {\"action_type\": \"click\", \"index\": 3}"),
            reply("Reason: r\nAction: {\"action_type\": \"fill_form\", \"form\": [{\"text\": \"a\", \"index\": 1}, {\"text\": \"b\", \"index\": 9}]}"),
            reply("Reason: r\nAction: {\"action_type\": \"click\", \"index\": 2}"),
            reply("ok"),
        ]));
        let mut agent = agent(device.clone(), model);

        let result = agent.step("g").await.unwrap();
        assert_eq!(result.summary, INDEX_ERROR);
        assert_eq!(result.outcome, StepOutcome::IndexOutOfRange { index: 3, element_count: 3 });

        let result = agent.step("g").await.unwrap();
        assert_eq!(result.outcome, StepOutcome::IndexOutOfRange { index: 9, element_count: 3 });
        assert!(device.executed().is_empty());

        // Last element is in range; it has no bounding box so marking only logs.
        let result = agent.step("g").await.unwrap();
        assert_eq!(result.outcome, StepOutcome::Executed { action_type: ActionKind::Click });
        assert_eq!(device.executed(), vec![Action::Click { index: 2 }]);
    }

    #[tokio::test]
    async fn status_ends_the_episode_without_executing() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![reply(
            "Reason: already on\nAction: {\"action_type\": \"status\", \"goal_status\": \"complete\"}",
        )]));
        let mut agent = agent(device.clone(), model.clone());

        let result = agent.step("Turn on Wi-Fi").await.unwrap();
        assert!(result.done);
        assert_eq!(result.summary, GOAL_REACHED);
        assert_eq!(result.outcome, StepOutcome::GoalReached { goal_status: GoalStatus::Complete });
        assert!(device.executed().is_empty());
        // Only the before-step capture and the action-selection call happen.
        assert_eq!(device.captures_taken(), 1);
        assert_eq!(model.prompts().len(), 1);
        assert!(agent.history().last().unwrap().after_elements.is_none());
    }

    #[tokio::test]
    async fn safety_veto_declares_infeasible() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![vetoed(CLICK_OK)]));
        let mut agent = agent(device.clone(), model);

        let result = agent.step("g").await.unwrap();
        assert!(result.done);
        assert_eq!(result.outcome, StepOutcome::GoalReached { goal_status: GoalStatus::Infeasible });
        let record = agent.history().last().unwrap();
        assert_eq!(record.action_output.as_deref(), Some(SAFETY_OVERRIDE));
        assert_eq!(record.reason.as_deref(), Some("Triggered LLM safety classifier."));
        assert!(device.executed().is_empty());
    }

    #[tokio::test]
    async fn unreachable_action_model_is_fatal() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![Prediction::failed()]));
        let mut agent = agent(device, model);

        let err = agent.step("g").await.unwrap_err();
        assert!(matches!(err, T3aError::ModelUnavailable(_)));
        assert_eq!(err.to_string(), ACTION_MODEL_ERROR);
        assert!(agent.history().is_empty());
        assert_eq!(agent.phase(), StepPhase::Idle);
    }

    #[tokio::test]
    async fn failed_first_capture_is_fatal() {
        let device = Arc::new(FakeDevice::new());
        device.push_capture(Err(T3aError::Device("no display".into())));
        let model = Arc::new(ScriptedModel::new(vec![]));
        let mut agent = agent(device, model.clone());

        assert!(matches!(agent.step("g").await, Err(T3aError::Device(_))));
        assert!(model.prompts().is_empty());
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn execution_error_is_summarized() {
        let device = Arc::new(FakeDevice::failing_execution());
        let model = Arc::new(ScriptedModel::new(vec![reply(
            "Reason: r\nAction: {\"action_type\": \"open_app\", \"app_name\": \"Clock\"}",
        )]));
        let mut agent = agent(device, model);

        let result = agent.step("g").await.unwrap();
        assert!(!result.done);
        assert_eq!(result.summary, "Some error happened executing the action open_app");
        assert!(matches!(result.outcome, StepOutcome::ExecutionFailed { action_type: ActionKind::OpenApp, .. }));
    }

    #[tokio::test]
    async fn failed_after_capture_is_summarized() {
        let device = Arc::new(FakeDevice::new());
        device.push_capture(Ok(DeviceState {
            ui_elements: elements(),
            screenshot: blank_screen(),
        }));
        device.push_capture(Err(T3aError::Device("screencap failed".into())));
        let model = Arc::new(ScriptedModel::new(vec![reply(
            "Reason: r\nAction: {\"action_type\": \"scroll\", \"direction\": \"down\"}",
        )]));
        let mut agent = agent(device.clone(), model);

        let result = agent.step("g").await.unwrap();
        assert_eq!(result.summary, "Could not observe the screen after executing the action scroll");
        assert_eq!(
            device.executed(),
            vec![Action::Scroll { direction: ScrollDirection::Down, index: None }]
        );
    }

    #[tokio::test]
    async fn summary_failures_are_recorded() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply(CLICK_OK),
            vetoed("whatever"),
            reply(CLICK_OK),
            Prediction::failed(),
        ]));
        let mut agent = agent(device, model);

        let result = agent.step("g").await.unwrap();
        assert_eq!(
            result.summary,
            format!("Action selected: {{\"action_type\": \"click\", \"index\": 0}}. {SUMMARY_VETOED}")
        );
        let result = agent.step("g").await.unwrap();
        assert_eq!(result.summary, SUMMARY_MODEL_ERROR);
        assert!(!result.done);
    }

    #[tokio::test]
    async fn structured_summary_is_condensed() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply(CLICK_OK),
            reply("{\"summary\": \"Closed dialog\", \"status\": \"successful\", \"reason\": \"gone\", \"status_detail\": \"successful\", \"ui_changed\": true, \"new_knowledge\": \"None\"}"),
        ]));
        let mut agent = agent(device, model.clone()).with_summary_format(SummaryFormat::Structured);

        let result = agent.step("g").await.unwrap();
        assert!(result.summary.ends_with(". Closed dialog (status: successful/successful)"));
        assert!(agent.history().last().unwrap().assessment.is_some());
        assert!(model.prompts()[1].contains("\"new_knowledge\""));
    }

    #[tokio::test]
    async fn refinement_replaces_the_first_stage_action() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply("Reason: search\nAction: {\"action_type\": \"input_text\", \"text\": \"x\", \"index\": 0}"),
            reply("Reason: the search box\nAction: {\"action_type\": \"input_text\", \"text\": \"weather\", \"index\": 1}"),
            reply("typed"),
        ]));
        let mut agent = agent(device.clone(), model.clone()).with_refinement(true);

        let result = agent.step("Search weather").await.unwrap();
        assert_eq!(
            device.executed(),
            vec![Action::InputText { text: "weather".into(), index: 1 }]
        );
        assert!(result.summary.contains("\"index\": 1"));
        assert!(model.prompts()[1].starts_with("You have selected the `input_text` action."));
    }

    #[tokio::test]
    async fn unreadable_refinement_keeps_first_stage_action() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![
            reply(CLICK_OK),
            reply("sorry, no idea"),
            reply("clicked"),
        ]));
        let mut agent = agent(device.clone(), model).with_refinement(true);

        agent.step("g").await.unwrap();
        assert_eq!(device.executed(), vec![Action::Click { index: 0 }]);
    }

    #[tokio::test]
    async fn guidelines_and_reset() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![reply("no format"), reply("no format")]));
        let mut agent = agent(device.clone(), model.clone()).with_name("clock-runner");
        assert_eq!(agent.name(), "clock-runner");
        agent.set_task_guidelines(vec!["Use the Clock app.".into()]);

        agent.step("g").await.unwrap();
        assert!(model.prompts()[0].contains("For The Current Task:\n- Use the Clock app.\n"));
        let first_episode = agent.episode_id();

        agent.reset(true).await.unwrap();
        agent.reset(false).await.unwrap();
        assert!(agent.history().is_empty());
        assert_ne!(agent.episode_id(), first_episode);
        assert_eq!(*device.resets.lock().unwrap(), vec![true, false]);
        assert_eq!(device.hidden.load(std::sync::atomic::Ordering::SeqCst), 2);

        let result = agent.step("g").await.unwrap();
        assert_eq!(result.step, 1);
    }

    struct Collect(Mutex<Vec<(usize, String)>>);

    impl StepObserver for Collect {
        fn on_step(&self, record: &StepRecord) -> T3aResult<()> {
            self.0.lock().unwrap().push((record.step, record.summary.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn observers_see_every_step() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![reply("x"), reply("y")]));
        let observer = Arc::new(Collect(Mutex::new(Vec::new())));
        let mut agent = agent(device, model).with_observer(observer.clone());

        agent.step("g").await.unwrap();
        agent.step("g").await.unwrap();
        let seen = observer.0.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, FORMAT_ERROR.to_string()), (2, FORMAT_ERROR.to_string())]);
        let recorded: Vec<usize> = agent.history().records().iter().map(|r| r.step).collect();
        assert_eq!(recorded, vec![1, 2]);
    }

    #[tokio::test]
    async fn full_strategy_can_be_selected() {
        let device = Arc::new(FakeDevice::new());
        let model = Arc::new(ScriptedModel::new(vec![reply("x")]));
        let mut agent = agent(device, model.clone())
            .with_strategies(StrategyRegistry::with_defaults(None, false), DescriptionStrategyKind::Full)
            .unwrap();

        agent.step("g").await.unwrap();
        assert!(model.prompts()[0].contains("UI element 0: UIElement(text=\"OK\""));
        assert!(T3aAgent::new(Arc::new(FakeDevice::new()), model)
            .with_strategies(StrategyRegistry::new(), DescriptionStrategyKind::Full)
            .is_err());
    }
}
