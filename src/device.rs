//! Boundary to the device-control layer.
use async_trait::async_trait;
use image::RgbaImage;

use crate::action::Action;
use crate::errors::T3aResult;
use crate::perception::types::{FrameBoundary, Orientation, ScreenSize, UIElement};

/// Screen state captured after the UI settled.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub ui_elements: Vec<UIElement>,
    pub screenshot: RgbaImage,
}

/// Everything the agent needs from an Android session.
#[async_trait]
pub trait DeviceEnv: Send + Sync {
    async fn get_post_transition_state(&self) -> T3aResult<DeviceState>;

    fn logical_screen_size(&self) -> ScreenSize;

    /// Index-addressed actions refer to positions in `elements`.
    async fn execute_action(&self, action: &Action, elements: &[UIElement]) -> T3aResult<()>;

    async fn physical_frame_boundary(&self) -> T3aResult<FrameBoundary>;

    async fn orientation(&self) -> T3aResult<Orientation>;

    async fn hide_automation_ui(&self) -> T3aResult<()>;

    async fn reset(&self, go_home: bool) -> T3aResult<()>;
}
