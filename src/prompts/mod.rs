pub mod action_execution;
pub mod assembler;
pub mod templates;

pub use assembler::{
    action_execution_prompt, action_selection_prompt, summarize_prompt, ui_filter_prompt,
};
