pub mod extract;
pub mod types;

pub use extract::{extract_json, parse_reason_action};
pub use types::{Action, ActionError, ActionKind, FormField, GoalStatus, ScrollDirection};
