use std::io::{Cursor, Write};
use std::path::PathBuf;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::Serialize;
use uuid::Uuid;

use crate::action::Action;
use crate::agent_engine::state::StepOutcome;
use crate::agent_engine::summarizer::StepAssessment;
use crate::errors::T3aResult;
use crate::perception::types::UIElement;

/// Everything captured during one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub episode_id: Uuid,
    pub goal: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub before_screenshot: Option<RgbaImage>,
    #[serde(skip)]
    pub after_screenshot: Option<RgbaImage>,
    pub before_elements: Vec<UIElement>,
    pub after_elements: Option<Vec<UIElement>>,
    pub before_description: Option<String>,
    pub after_description: Option<String>,
    pub action_prompt: Option<String>,
    pub action_output: Option<String>,
    pub action_raw_response: Option<serde_json::Value>,
    pub refinement_prompt: Option<String>,
    pub refinement_output: Option<String>,
    pub reason: Option<String>,
    pub action_text: Option<String>,
    pub action: Option<Action>,
    pub summary_prompt: Option<String>,
    pub summary_output: Option<String>,
    pub summary_raw_response: Option<serde_json::Value>,
    pub assessment: Option<StepAssessment>,
    /// The one line later steps see.
    pub summary: String,
    pub outcome: Option<StepOutcome>,
}

impl StepRecord {
    pub fn new(step: usize, episode_id: Uuid, goal: &str) -> Self {
        Self {
            step,
            episode_id,
            goal: goal.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            before_screenshot: None,
            after_screenshot: None,
            before_elements: Vec::new(),
            after_elements: None,
            before_description: None,
            after_description: None,
            action_prompt: None,
            action_output: None,
            action_raw_response: None,
            refinement_prompt: None,
            refinement_output: None,
            reason: None,
            action_text: None,
            action: None,
            summary_prompt: None,
            summary_output: None,
            summary_raw_response: None,
            assessment: None,
            summary: String::new(),
            outcome: None,
        }
    }
}

/// Append-only step history of one episode.
#[derive(Debug, Default)]
pub struct History {
    records: Vec<StepRecord>,
}

impl History {
    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn summaries(&self) -> Vec<String> {
        self.records.iter().map(|r| r.summary.clone()).collect()
    }
}

/// Receives each finished step.
pub trait StepObserver: Send + Sync {
    fn on_step(&self, record: &StepRecord) -> T3aResult<()>;
}

/// Writes one JSON line per step to `steps_<episode>.jsonl`.
pub struct JsonlStepLog {
    dir: PathBuf,
    include_screenshots: bool,
}

impl JsonlStepLog {
    pub fn new(dir: PathBuf, include_screenshots: bool) -> T3aResult<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            include_screenshots,
        })
    }

    /// Log under the configured directory, else the platform data dir.
    pub fn from_config(dir: Option<PathBuf>, include_screenshots: bool) -> T3aResult<Self> {
        Self::new(dir.unwrap_or_else(data_dir_or_cwd), include_screenshots)
    }

    pub fn path_for(&self, episode_id: Uuid) -> PathBuf {
        self.dir.join(format!("steps_{episode_id}.jsonl"))
    }

    fn to_line(&self, record: &StepRecord) -> T3aResult<String> {
        let mut value = serde_json::to_value(record)?;
        if self.include_screenshots {
            for (key, shot) in [
                ("before_screenshot_png", &record.before_screenshot),
                ("after_screenshot_png", &record.after_screenshot),
            ] {
                if let Some(img) = shot {
                    value[key] = serde_json::Value::String(png_base64(img)?);
                }
            }
        }
        Ok(serde_json::to_string(&value)?)
    }
}

impl StepObserver for JsonlStepLog {
    fn on_step(&self, record: &StepRecord) -> T3aResult<()> {
        let path = self.path_for(record.episode_id);
        let line = self.to_line(record)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        writeln!(file, "{}", line)?;
        tracing::debug!(path = %path.display(), step = record.step, "step record flushed");
        Ok(())
    }
}

fn png_base64(img: &RgbaImage) -> T3aResult<String> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buf.into_inner()))
}

/// `<data dir>/t3a/steps`, falling back to the working directory.
fn data_dir_or_cwd() -> PathBuf {
    if let Some(base) = dirs::data_dir() {
        return base.join("t3a").join("steps");
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
