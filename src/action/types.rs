use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Missing or invalid field: action_type")]
    MissingActionType,
    #[error("Unknown action type: {0}")]
    UnknownAction(String),
    #[error("Missing or invalid field `{field}` for action `{action}`")]
    InvalidField {
        action: ActionKind,
        field: &'static str,
    },
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),
}

/// Every key an action object may carry, across all action types.
/// Keys in this set that a given action does not use are ignored.
const KNOWN_FIELDS: &[&str] = &[
    "action_type",
    "index",
    "x",
    "y",
    "text",
    "direction",
    "goal_status",
    "app_name",
    "keycode",
    "clear_text",
    "form",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    LongPress,
    InputText,
    FillForm,
    Answer,
    Status,
    KeyboardEnter,
    NavigateHome,
    NavigateBack,
    Scroll,
    OpenApp,
    Wait,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Click,
        ActionKind::LongPress,
        ActionKind::InputText,
        ActionKind::FillForm,
        ActionKind::Answer,
        ActionKind::Status,
        ActionKind::KeyboardEnter,
        ActionKind::NavigateHome,
        ActionKind::NavigateBack,
        ActionKind::Scroll,
        ActionKind::OpenApp,
        ActionKind::Wait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::LongPress => "long_press",
            ActionKind::InputText => "input_text",
            ActionKind::FillForm => "fill_form",
            ActionKind::Answer => "answer",
            ActionKind::Status => "status",
            ActionKind::KeyboardEnter => "keyboard_enter",
            ActionKind::NavigateHome => "navigate_home",
            ActionKind::NavigateBack => "navigate_back",
            ActionKind::Scroll => "scroll",
            ActionKind::OpenApp => "open_app",
            ActionKind::Wait => "wait",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Complete,
    Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub text: String,
    pub index: usize,
}

/// A device action chosen by the model.
///
/// Only built through [`Action::from_map`], which checks that every required
/// field is present and well-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum Action {
    Click {
        index: usize,
    },
    LongPress {
        index: usize,
    },
    InputText {
        text: String,
        index: usize,
    },
    FillForm {
        form: Vec<FormField>,
    },
    Answer {
        text: String,
    },
    Status {
        goal_status: GoalStatus,
    },
    KeyboardEnter,
    NavigateHome,
    NavigateBack,
    Scroll {
        direction: ScrollDirection,
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    OpenApp {
        app_name: String,
    },
    Wait,
}

impl Action {
    /// Build an action from a decoded JSON object.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ActionError> {
        if let Some(key) = map.keys().find(|k| !KNOWN_FIELDS.contains(&k.as_str())) {
            return Err(ActionError::UnexpectedField(key.clone()));
        }

        let name = map
            .get("action_type")
            .and_then(Value::as_str)
            .ok_or(ActionError::MissingActionType)?;
        let kind = ActionKind::parse(name.trim())
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;

        let action = match kind {
            ActionKind::Click => Action::Click {
                index: get_index(map, kind, "index")?,
            },
            ActionKind::LongPress => Action::LongPress {
                index: get_index(map, kind, "index")?,
            },
            ActionKind::InputText => Action::InputText {
                text: get_text(map, kind, "text")?,
                index: get_index(map, kind, "index")?,
            },
            ActionKind::FillForm => Action::FillForm {
                form: get_form(map)?,
            },
            ActionKind::Answer => Action::Answer {
                text: get_text(map, kind, "text")?,
            },
            ActionKind::Status => {
                let goal_status = match get_text(map, kind, "goal_status")?.trim() {
                    "complete" => GoalStatus::Complete,
                    "infeasible" => GoalStatus::Infeasible,
                    _ => {
                        return Err(ActionError::InvalidField {
                            action: kind,
                            field: "goal_status",
                        })
                    }
                };
                Action::Status { goal_status }
            }
            ActionKind::KeyboardEnter => Action::KeyboardEnter,
            ActionKind::NavigateHome => Action::NavigateHome,
            ActionKind::NavigateBack => Action::NavigateBack,
            ActionKind::Scroll => {
                let direction = match get_text(map, kind, "direction")?
                    .trim()
                    .to_lowercase()
                    .as_str()
                {
                    "up" => ScrollDirection::Up,
                    "down" => ScrollDirection::Down,
                    "left" => ScrollDirection::Left,
                    "right" => ScrollDirection::Right,
                    _ => {
                        return Err(ActionError::InvalidField {
                            action: kind,
                            field: "direction",
                        })
                    }
                };
                let index = match map.get("index") {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(get_index(map, kind, "index")?),
                };
                Action::Scroll { direction, index }
            }
            ActionKind::OpenApp => Action::OpenApp {
                app_name: get_text(map, kind, "app_name")?,
            },
            ActionKind::Wait => Action::Wait,
        };

        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Click { .. } => ActionKind::Click,
            Action::LongPress { .. } => ActionKind::LongPress,
            Action::InputText { .. } => ActionKind::InputText,
            Action::FillForm { .. } => ActionKind::FillForm,
            Action::Answer { .. } => ActionKind::Answer,
            Action::Status { .. } => ActionKind::Status,
            Action::KeyboardEnter => ActionKind::KeyboardEnter,
            Action::NavigateHome => ActionKind::NavigateHome,
            Action::NavigateBack => ActionKind::NavigateBack,
            Action::Scroll { .. } => ActionKind::Scroll,
            Action::OpenApp { .. } => ActionKind::OpenApp,
            Action::Wait => ActionKind::Wait,
        }
    }

    /// Element indices this action targets, in the order they are used.
    pub fn target_indices(&self) -> Vec<usize> {
        match self {
            Action::Click { index }
            | Action::LongPress { index }
            | Action::InputText { index, .. } => vec![*index],
            Action::FillForm { form } => form.iter().map(|f| f.index).collect(),
            Action::Scroll { index, .. } => index.iter().copied().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{{\"action_type\": \"{}\"}}", self.kind()),
        }
    }
}

// Helpers for pulling typed values out of the decoded object.

fn get_index(
    map: &Map<String, Value>,
    action: ActionKind,
    field: &'static str,
) -> Result<usize, ActionError> {
    let invalid = || ActionError::InvalidField { action, field };
    match map.get(field) {
        Some(Value::Number(n)) => n.as_u64().map(|v| v as usize).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<usize>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn get_text(
    map: &Map<String, Value>,
    action: ActionKind,
    field: &'static str,
) -> Result<String, ActionError> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(ActionError::InvalidField { action, field }),
    }
}

fn get_form(map: &Map<String, Value>) -> Result<Vec<FormField>, ActionError> {
    let invalid = || ActionError::InvalidField {
        action: ActionKind::FillForm,
        field: "form",
    };
    let entries = map.get("form").and_then(Value::as_array).ok_or_else(invalid)?;
    if entries.is_empty() {
        return Err(invalid());
    }

    entries
        .iter()
        .map(|entry| {
            let obj = entry.as_object().ok_or_else(invalid)?;
            Ok(FormField {
                text: get_text(obj, ActionKind::FillForm, "text")?,
                index: get_index(obj, ActionKind::FillForm, "index")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn builds_every_flat_action() {
        let cases = vec![
            (json!({"action_type": "click", "index": 2}), Action::Click { index: 2 }),
            (json!({"action_type": "long_press", "index": 1}), Action::LongPress { index: 1 }),
            (
                json!({"action_type": "input_text", "text": "hello", "index": 3}),
                Action::InputText { text: "hello".into(), index: 3 },
            ),
            (
                json!({"action_type": "answer", "text": "You have no events today."}),
                Action::Answer { text: "You have no events today.".into() },
            ),
            (
                json!({"action_type": "status", "goal_status": "infeasible"}),
                Action::Status { goal_status: GoalStatus::Infeasible },
            ),
            (json!({"action_type": "keyboard_enter"}), Action::KeyboardEnter),
            (json!({"action_type": "navigate_home"}), Action::NavigateHome),
            (json!({"action_type": "navigate_back"}), Action::NavigateBack),
            (
                json!({"action_type": "scroll", "direction": "down"}),
                Action::Scroll { direction: ScrollDirection::Down, index: None },
            ),
            (
                json!({"action_type": "open_app", "app_name": "Calendar"}),
                Action::OpenApp { app_name: "Calendar".into() },
            ),
            (json!({"action_type": "wait"}), Action::Wait),
        ];

        for (input, expected) in cases {
            assert_eq!(Action::from_map(&obj(input)).unwrap(), expected);
        }
    }

    #[test]
    fn fill_form_keeps_entry_order() {
        let map = obj(json!({
            "action_type": "fill_form",
            "form": [{"text": "John", "index": 2}, {"text": "Doe", "index": 3}]
        }));
        let action = Action::from_map(&map).unwrap();
        assert_eq!(action.target_indices(), vec![2, 3]);
    }

    #[test]
    fn numeric_string_index_is_accepted() {
        let map = obj(json!({"action_type": "click", "index": "7"}));
        assert_eq!(Action::from_map(&map).unwrap(), Action::Click { index: 7 });
    }

    #[test]
    fn missing_required_field_fails() {
        let map = obj(json!({"action_type": "input_text", "text": "hi"}));
        assert_eq!(
            Action::from_map(&map),
            Err(ActionError::InvalidField { action: ActionKind::InputText, field: "index" })
        );
    }

    #[test]
    fn negative_index_fails() {
        let map = obj(json!({"action_type": "click", "index": -1}));
        assert!(Action::from_map(&map).is_err());
    }

    #[test]
    fn unknown_action_type_fails() {
        let map = obj(json!({"action_type": "swipe"}));
        assert_eq!(Action::from_map(&map), Err(ActionError::UnknownAction("swipe".into())));
    }

    #[test]
    fn invalid_goal_status_fails() {
        let map = obj(json!({"action_type": "status", "goal_status": "done"}));
        assert!(Action::from_map(&map).is_err());
    }

    #[test]
    fn known_but_unused_fields_are_ignored() {
        let map = obj(json!({"action_type": "navigate_back", "index": 4}));
        assert_eq!(Action::from_map(&map).unwrap(), Action::NavigateBack);
    }

    #[test]
    fn foreign_fields_fail() {
        let map = obj(json!({"action_type": "click", "index": 1, "confidence": 0.9}));
        assert_eq!(
            Action::from_map(&map),
            Err(ActionError::UnexpectedField("confidence".into()))
        );
    }

    #[test]
    fn empty_form_fails() {
        let map = obj(json!({"action_type": "fill_form", "form": []}));
        assert!(Action::from_map(&map).is_err());
    }

    #[test]
    fn display_is_compact_json() {
        let action = Action::Status { goal_status: GoalStatus::Complete };
        assert_eq!(action.to_string(), r#"{"action_type":"status","goal_status":"complete"}"#);
        assert_eq!(Action::Wait.to_string(), r#"{"action_type":"wait"}"#);
    }
}
