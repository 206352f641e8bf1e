pub mod engine;
pub mod history;
pub mod loop_control;
pub mod settle;
pub mod state;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::T3aAgent;
pub use loop_control::{run_episode, EpisodeLimits, EpisodeResult, StopReason};
pub use state::{StepOutcome, StepResult};
