use std::collections::HashMap;
use std::time::Duration;

use crate::action::ActionKind;
use crate::config::AgentConfig;
use crate::errors::T3aResult;

/// How long to let the UI settle after each kind of action.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPolicy {
    delays: HashMap<ActionKind, Duration>,
}

impl WaitPolicy {
    /// No waiting at all. Handy for tests and replayed devices.
    pub fn none() -> Self {
        Self {
            delays: HashMap::new(),
        }
    }

    pub fn from_millis(delays: HashMap<ActionKind, u64>) -> Self {
        Self {
            delays: delays
                .into_iter()
                .map(|(kind, ms)| (kind, Duration::from_millis(ms)))
                .collect(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> T3aResult<Self> {
        Ok(Self::from_millis(config.settle_delays()?))
    }

    pub fn delay_for(&self, kind: ActionKind) -> Duration {
        self.delays.get(&kind).copied().unwrap_or(Duration::ZERO)
    }
}

impl Default for WaitPolicy {
    /// App launches wait 3 s, clicks 2 s, everything else 0.
    fn default() -> Self {
        Self::from_millis(HashMap::from([
            (ActionKind::Click, 2000),
            (ActionKind::OpenApp, 3000),
        ]))
    }
}
