//! Scripted collaborators for agent tests.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use serde_json::json;

use crate::action::Action;
use crate::device::{DeviceEnv, DeviceState};
use crate::errors::{T3aError, T3aResult};
use crate::llm::model::{Prediction, TextModel};
use crate::perception::types::{BoundingBox, FrameBoundary, Orientation, ScreenSize, UIElement};

pub fn elements() -> Vec<UIElement> {
    vec![
        UIElement {
            text: Some("OK".into()),
            class_name: Some("android.widget.Button".into()),
            bbox_pixels: Some(BoundingBox::new(10, 10, 50, 30)),
            is_clickable: true,
            is_visible: true,
            ..Default::default()
        },
        UIElement {
            hint_text: Some("Search".into()),
            class_name: Some("android.widget.EditText".into()),
            bbox_pixels: Some(BoundingBox::new(10, 40, 90, 60)),
            is_editable: true,
            is_visible: true,
            ..Default::default()
        },
        UIElement {
            text: Some("Welcome".into()),
            class_name: Some("android.widget.TextView".into()),
            is_visible: true,
            ..Default::default()
        },
    ]
}

pub fn blank_screen() -> RgbaImage {
    RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]))
}

pub struct FakeDevice {
    pub captures: Mutex<VecDeque<T3aResult<DeviceState>>>,
    pub captures_taken: AtomicUsize,
    pub executed: Mutex<Vec<Action>>,
    pub fail_execution: bool,
    pub resets: Mutex<Vec<bool>>,
    pub hidden: AtomicUsize,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            captures: Mutex::new(VecDeque::new()),
            captures_taken: AtomicUsize::new(0),
            executed: Mutex::new(Vec::new()),
            fail_execution: false,
            resets: Mutex::new(Vec::new()),
            hidden: AtomicUsize::new(0),
        }
    }

    pub fn failing_execution() -> Self {
        Self {
            fail_execution: true,
            ..Self::new()
        }
    }

    /// Queue a capture result; an empty queue yields the default screen.
    pub fn push_capture(&self, capture: T3aResult<DeviceState>) {
        self.captures.lock().unwrap().push_back(capture);
    }

    pub fn executed(&self) -> Vec<Action> {
        self.executed.lock().unwrap().clone()
    }

    pub fn captures_taken(&self) -> usize {
        self.captures_taken.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceEnv for FakeDevice {
    async fn get_post_transition_state(&self) -> T3aResult<DeviceState> {
        self.captures_taken.fetch_add(1, Ordering::SeqCst);
        self.captures.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(DeviceState {
                ui_elements: elements(),
                screenshot: blank_screen(),
            })
        })
    }

    fn logical_screen_size(&self) -> ScreenSize {
        ScreenSize::new(100, 100)
    }

    async fn execute_action(&self, action: &Action, _elements: &[UIElement]) -> T3aResult<()> {
        if self.fail_execution {
            return Err(T3aError::Device("adb: device offline".into()));
        }
        self.executed.lock().unwrap().push(action.clone());
        Ok(())
    }

    async fn physical_frame_boundary(&self) -> T3aResult<FrameBoundary> {
        Ok(FrameBoundary {
            x_min: 0,
            y_min: 0,
            x_max: 100,
            y_max: 100,
        })
    }

    async fn orientation(&self) -> T3aResult<Orientation> {
        Ok(Orientation::Portrait)
    }

    async fn hide_automation_ui(&self) -> T3aResult<()> {
        self.hidden.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reset(&self, go_home: bool) -> T3aResult<()> {
        self.resets.lock().unwrap().push(go_home);
        Ok(())
    }
}

/// Replies in order; once exhausted every call fails.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Prediction>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Prediction>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn predict(&self, prompt: &str) -> Prediction {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Prediction::failed)
    }
}

pub fn reply(text: &str) -> Prediction {
    Prediction {
        text: text.to_string(),
        is_safe: None,
        raw_response: Some(json!({ "text": text })),
    }
}

pub fn vetoed(text: &str) -> Prediction {
    Prediction {
        is_safe: Some(false),
        ..reply(text)
    }
}
