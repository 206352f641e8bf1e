//! Pure prompt builders.
use crate::action::ActionKind;
use crate::agent_engine::summarizer::SummaryFormat;
use crate::prompts::action_execution::prompt_for;
use crate::prompts::templates::{
    ACTION_EXECUTION, ACTION_SELECTION, GUIDANCE, PROMPT_PREFIX, SUMMARY_PLAIN,
    SUMMARY_STRUCTURED, UI_FILTER,
};

const NO_HISTORY: &str = "You just started, no action has been performed yet.";
const NOT_AVAILABLE: &str = "Not available";

/// Substitute `{name}` placeholders in one pass. Substituted values are never
/// rescanned, and unknown braces are kept verbatim.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `Step {n}: {summary}` lines, 1-based.
pub fn render_history(summaries: &[String]) -> String {
    if summaries.is_empty() {
        return NO_HISTORY.to_string();
    }
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Step {}: {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_guidelines(guidelines: Option<&[String]>) -> String {
    match guidelines {
        Some(list) if !list.is_empty() => {
            let mut block = String::from("For The Current Task:\n");
            for g in list {
                block.push_str("- ");
                block.push_str(g);
                block.push('\n');
            }
            block
        }
        _ => String::new(),
    }
}

fn or_not_available(text: &str) -> &str {
    if text.is_empty() {
        NOT_AVAILABLE
    } else {
        text
    }
}

pub fn action_selection_prompt(
    goal: &str,
    summaries: &[String],
    ui_description: &str,
    guidelines: Option<&[String]>,
) -> String {
    let history = render_history(summaries);
    let extra = render_guidelines(guidelines);
    fill(
        ACTION_SELECTION,
        &[
            ("prefix", PROMPT_PREFIX),
            ("goal", goal),
            ("history", history.as_str()),
            ("ui_elements_description", or_not_available(ui_description)),
            ("guidance", GUIDANCE),
            ("additional_guidelines", extra.as_str()),
        ],
    )
}

pub fn summarize_prompt(
    format: SummaryFormat,
    goal: &str,
    action: &str,
    reason: &str,
    before_elements: &str,
    after_elements: &str,
) -> String {
    let template = match format {
        SummaryFormat::Plain => SUMMARY_PLAIN,
        SummaryFormat::Structured => SUMMARY_STRUCTURED,
    };
    fill(
        template,
        &[
            ("prefix", PROMPT_PREFIX),
            ("goal", goal),
            ("before_elements", or_not_available(before_elements)),
            ("after_elements", or_not_available(after_elements)),
            ("action", action),
            ("reason", reason),
        ],
    )
}

/// Second-stage prompt asking for the final JSON of an already chosen kind.
pub fn action_execution_prompt(
    kind: ActionKind,
    goal: &str,
    summaries: &[String],
    ui_description: &str,
    guidelines: Option<&[String]>,
) -> String {
    let history = render_history(summaries);
    let extra = render_guidelines(guidelines);
    fill(
        ACTION_EXECUTION,
        &[
            ("prompt_for_selected_action", prompt_for(kind)),
            ("goal", goal),
            ("history", history.as_str()),
            ("ui_elements_description", or_not_available(ui_description)),
            ("additional_guidelines", extra.as_str()),
        ],
    )
}

pub fn ui_filter_prompt(goal: &str, elements_json: &str) -> String {
    fill(UI_FILTER, &[("goal", goal), ("elements_json", elements_json)])
}
