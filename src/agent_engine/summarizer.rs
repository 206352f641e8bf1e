//! Turns summarization output into the one-line history entry.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::extract::decode_object;

/// Shape of the summary the model is asked to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFormat {
    /// One free-text line.
    #[default]
    Plain,
    /// A JSON object decoded into [`StepAssessment`].
    Structured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Successful,
    Failed,
}

/// Self-assessment of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAssessment {
    pub summary: String,
    pub status: StepStatus,
    pub reason: String,
    pub status_detail: String,
    pub ui_changed: bool,
    /// `None` when the model reported no new knowledge.
    pub new_knowledge: Option<String>,
}

impl StepAssessment {
    /// Decode the object embedded in `text` (code fences and prose allowed).
    pub fn parse(text: &str) -> Option<Self> {
        let (first, last) = (text.find('{')?, text.rfind('}')?);
        if first >= last {
            return None;
        }
        match decode_object(&text[first..=last]) {
            Ok(map) => Self::from_map(&map),
            Err(e) => {
                tracing::warn!(error = %e, "cannot decode structured summary");
                None
            }
        }
    }

    fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let summary = map.get("summary")?.as_str()?.trim().to_string();
        let status = match map.get("status")?.as_str()?.trim().to_ascii_lowercase().as_str() {
            "successful" | "success" => StepStatus::Successful,
            "failed" | "failure" => StepStatus::Failed,
            other => {
                tracing::warn!(status = other, "unknown step status in summary");
                return None;
            }
        };
        let text_field = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let ui_changed = match map.get("ui_changed") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        };
        let new_knowledge = map
            .get("new_knowledge")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.eq_ignore_ascii_case("none"))
            .map(str::to_string);

        Some(Self {
            summary,
            status,
            reason: text_field("reason"),
            status_detail: text_field("status_detail"),
            ui_changed,
            new_knowledge,
        })
    }

    pub fn history_line(&self) -> String {
        let status = match self.status {
            StepStatus::Successful => "successful",
            StepStatus::Failed => "failed",
        };
        match &self.new_knowledge {
            Some(k) => format!(
                "{} (status: {}/{}; new knowledge: {})",
                self.summary, status, self.status_detail, k
            ),
            None => format!("{} (status: {}/{})", self.summary, status, self.status_detail),
        }
    }
}

/// Summary text for the history plus the decoded assessment, if any.
pub fn interpret_summary(format: SummaryFormat, output: &str) -> (String, Option<StepAssessment>) {
    match format {
        SummaryFormat::Plain => (output.trim().to_string(), None),
        SummaryFormat::Structured => match StepAssessment::parse(output) {
            Some(assessment) => (assessment.history_line(), Some(assessment)),
            None => {
                tracing::warn!("structured summary unreadable, keeping raw text");
                (output.trim().to_string(), None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENCED: &str = "```\n{\n  \"summary\": \"Opened Clock\",\n  \"status\": \"successful\",\n  \"reason\": \"clock UI shown\",\n  \"status_detail\": \"successful\",\n  \"ui_changed\": true,\n  \"new_knowledge\": \"open_app launches Clock directly\"\n}\n```";

    #[test]
    fn plain_is_trimmed_text() {
        let (line, assessment) = interpret_summary(SummaryFormat::Plain, "  Clicked send.\n");
        assert_eq!(line, "Clicked send.");
        assert!(assessment.is_none());
    }

    #[test]
    fn structured_is_decoded_from_fences() {
        let (line, assessment) = interpret_summary(SummaryFormat::Structured, FENCED);
        let assessment = assessment.unwrap();
        assert_eq!(assessment.status, StepStatus::Successful);
        assert!(assessment.ui_changed);
        assert_eq!(
            line,
            "Opened Clock (status: successful/successful; new knowledge: open_app launches Clock directly)"
        );
    }

    #[test]
    fn none_knowledge_is_omitted() {
        let text = "{'summary': 'Scrolled', 'status': 'failed', 'reason': 'same list', \
                    'status_detail': 'scroll_no_effect', 'ui_changed': False, 'new_knowledge': 'None'}";
        let (line, assessment) = interpret_summary(SummaryFormat::Structured, text);
        assert_eq!(assessment.unwrap().new_knowledge, None);
        assert_eq!(line, "Scrolled (status: failed/scroll_no_effect)");
    }

    #[test]
    fn unreadable_structured_falls_back_to_text() {
        let (line, assessment) = interpret_summary(SummaryFormat::Structured, " It worked. ");
        assert_eq!(line, "It worked.");
        assert!(assessment.is_none());

        let (_, assessment) =
            interpret_summary(SummaryFormat::Structured, r#"{"summary": "x", "status": "maybe"}"#);
        assert!(assessment.is_none());
    }
}
