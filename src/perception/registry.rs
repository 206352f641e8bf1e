use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{T3aError, T3aResult};
use crate::llm::model::TextModel;
use crate::perception::describe::{
    EnhancedFilterDescription, FullDescription, ModelAssistedDescription,
};
use crate::perception::traits::{DescriptionStrategy, DescriptionStrategyKind};

/// Description strategies available to an agent, keyed by identifier.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<DescriptionStrategyKind, Arc<dyn DescriptionStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deterministic strategies, plus the model-assisted one when a
    /// filter model is supplied.
    pub fn with_defaults(filter_model: Option<Arc<dyn TextModel>>, append_raw: bool) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FullDescription));
        registry.register(Arc::new(EnhancedFilterDescription));
        if let Some(model) = filter_model {
            registry.register(Arc::new(ModelAssistedDescription::new(model, append_raw)));
        }
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn DescriptionStrategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    pub fn get(&self, kind: DescriptionStrategyKind) -> T3aResult<Arc<dyn DescriptionStrategy>> {
        self.strategies
            .get(&kind)
            .cloned()
            .ok_or_else(|| T3aError::Config(format!("description strategy '{kind}' not registered")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_assisted_requires_a_model() {
        let registry = StrategyRegistry::with_defaults(None, false);
        assert!(registry.get(DescriptionStrategyKind::Full).is_ok());
        assert_eq!(
            registry.get(DescriptionStrategyKind::EnhancedFilter).unwrap().kind(),
            DescriptionStrategyKind::EnhancedFilter
        );
        assert!(matches!(
            registry.get(DescriptionStrategyKind::ModelAssisted),
            Err(T3aError::Config(_))
        ));
    }
}
