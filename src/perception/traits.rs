use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::perception::types::{ScreenSize, UIElement};

/// Identifier of a UI description pipeline, as written in config.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionStrategyKind {
    /// Attribute dump of every valid element.
    Full,
    /// Heuristically filtered natural-language lines.
    EnhancedFilter,
    /// Filtered elements re-selected by a model.
    ModelAssisted,
}

impl fmt::Display for DescriptionStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptionStrategyKind::Full => "full",
            DescriptionStrategyKind::EnhancedFilter => "enhanced_filter",
            DescriptionStrategyKind::ModelAssisted => "model_assisted",
        };
        f.write_str(name)
    }
}

/// Strategy trait for turning an accessibility snapshot into prompt text.
///
/// Indices printed by any implementation are positions in `elements`.
#[async_trait]
pub trait DescriptionStrategy: Send + Sync {
    fn kind(&self) -> DescriptionStrategyKind;

    async fn describe(&self, elements: &[UIElement], screen: ScreenSize, goal: &str) -> String;
}
