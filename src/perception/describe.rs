//! The three description strategies.
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::llm::model::TextModel;
use crate::perception::filter::{filter_meaningful, filter_valid};
use crate::perception::traits::{DescriptionStrategy, DescriptionStrategyKind};
use crate::perception::types::{non_blank, IndexedElement, ScreenSize, UIElement};
use crate::prompts::ui_filter_prompt;

const ENHANCED_HEADER: &str = "Each UI element is indexed. Use this index directly when choosing \
elements to interact with. (Indices refer to the original UI layout.)";
const NO_LABEL: &str = "<no label>";
const NO_RELEVANT_ELEMENTS: &str = "No relevant UI elements found.";

const FORM_FIELDS: [&str; 5] = ["name", "phone", "email", "search", "contact"];
const WIDE_FIELDS: [&str; 9] = [
    "name", "phone", "email", "search", "contact", "amount", "note", "date", "time",
];

fn interaction_tags(e: &UIElement) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if e.is_clickable {
        tags.push("clickable");
    }
    if e.is_editable {
        tags.push("editable (text input field)");
    }
    if e.is_scrollable {
        tags.push("scrollable");
    }
    tags
}

/// First vocabulary word contained in the label or hint.
fn guess_field(label: &str, hint: &str, vocabulary: &[&'static str]) -> Option<&'static str> {
    let combined = format!("{label} {hint}").to_lowercase();
    vocabulary.iter().copied().find(|f| combined.contains(f))
}

fn hint_of(e: &UIElement) -> &str {
    non_blank(e.hint_text.as_deref()).unwrap_or("")
}

fn enhanced_line(item: &IndexedElement<'_>) -> String {
    let e = item.element;
    let tags = interaction_tags(e);
    let tags = if tags.is_empty() {
        "non-interactive".to_string()
    } else {
        tags.join(" / ")
    };
    let label = e.label().unwrap_or(NO_LABEL);
    let hint = hint_of(e);

    let mut line = format!(
        "UI element {}: This is a {} UI element with label '{}'",
        item.index, tags, label
    );
    if !hint.is_empty() {
        line.push_str(&format!(" and hint '{hint}'"));
    }
    if let Some(field) = guess_field(label, hint, &FORM_FIELDS) {
        line.push_str(&format!(" (likely field: {field})"));
    }
    line.push_str(&format!(". Type: {}.", e.short_class_name()));
    line
}

pub fn render_enhanced(items: &[IndexedElement<'_>]) -> String {
    std::iter::once(ENHANCED_HEADER.to_string())
        .chain(items.iter().map(enhanced_line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON view of the filtered elements handed to the filter model.
pub fn elements_json(items: &[IndexedElement<'_>]) -> serde_json::Value {
    let list: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            let e = item.element;
            let label = e.label().unwrap_or(NO_LABEL);
            let hint = hint_of(e);
            json!({
                "index": item.index,
                "label": label,
                "hint": non_blank(Some(hint)),
                "tags": interaction_tags(e),
                "type": e.short_class_name(),
                "bbox": e.bbox_pixels,
                "likely_field": guess_field(label, hint, &WIDE_FIELDS),
            })
        })
        .collect();
    serde_json::Value::Array(list)
}

/// Raw attribute dump of every valid element.
pub struct FullDescription;

#[async_trait]
impl DescriptionStrategy for FullDescription {
    fn kind(&self) -> DescriptionStrategyKind {
        DescriptionStrategyKind::Full
    }

    async fn describe(&self, elements: &[UIElement], screen: ScreenSize, _goal: &str) -> String {
        filter_valid(elements, screen)
            .iter()
            .map(|item| format!("UI element {}: {}\n", item.index, item.element))
            .collect()
    }
}

pub struct EnhancedFilterDescription;

#[async_trait]
impl DescriptionStrategy for EnhancedFilterDescription {
    fn kind(&self) -> DescriptionStrategyKind {
        DescriptionStrategyKind::EnhancedFilter
    }

    async fn describe(&self, elements: &[UIElement], _screen: ScreenSize, _goal: &str) -> String {
        render_enhanced(&filter_meaningful(elements))
    }
}

/// Lets a model pick the elements relevant to the goal.
pub struct ModelAssistedDescription {
    model: Arc<dyn TextModel>,
    append_raw: bool,
}

impl ModelAssistedDescription {
    pub fn new(model: Arc<dyn TextModel>, append_raw: bool) -> Self {
        Self { model, append_raw }
    }
}

#[async_trait]
impl DescriptionStrategy for ModelAssistedDescription {
    fn kind(&self) -> DescriptionStrategyKind {
        DescriptionStrategyKind::ModelAssisted
    }

    async fn describe(&self, elements: &[UIElement], _screen: ScreenSize, goal: &str) -> String {
        let items = filter_meaningful(elements);
        let raw = serde_json::to_string_pretty(&elements_json(&items)).unwrap_or_default();
        let prompt = ui_filter_prompt(goal, &raw);

        let prediction = self.model.predict(&prompt).await;
        let selected = if prediction.is_unavailable() {
            tracing::warn!(model = self.model.model_name(), "filter model unavailable");
            None
        } else if prediction.is_vetoed() {
            tracing::warn!(model = self.model.model_name(), "filter output blocked by safety classifier");
            None
        } else {
            non_blank(Some(prediction.text.as_str())).map(|t| t.trim().to_string())
        };
        let mut description = selected.unwrap_or_else(|| NO_RELEVANT_ELEMENTS.to_string());
        tracing::debug!(chars = description.len(), "model-assisted description ready");

        if self.append_raw {
            description.push_str("\n\nRaw UI elements:\n");
            description.push_str(&raw);
        }
        description
    }
}
