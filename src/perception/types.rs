use std::fmt;

use serde::{Deserialize, Serialize};

/// Pixel rectangle in logical screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// One accessibility node captured from the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UIElement {
    pub text: Option<String>,
    pub content_description: Option<String>,
    pub class_name: Option<String>,
    pub bbox_pixels: Option<BoundingBox>,
    pub hint_text: Option<String>,
    pub is_checked: bool,
    pub is_checkable: bool,
    pub is_clickable: bool,
    pub is_editable: bool,
    pub is_enabled: bool,
    pub is_focused: bool,
    pub is_focusable: bool,
    pub is_long_clickable: bool,
    pub is_scrollable: bool,
    pub is_selected: bool,
    pub is_visible: bool,
    pub package_name: Option<String>,
    pub resource_name: Option<String>,
}

impl UIElement {
    /// Text, else content description, when non-blank.
    pub fn label(&self) -> Option<&str> {
        non_blank(self.text.as_deref()).or_else(|| non_blank(self.content_description.as_deref()))
    }

    /// Last segment of the class name, e.g. `EditText` for `android.widget.EditText`.
    pub fn short_class_name(&self) -> &str {
        self.class_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .and_then(|c| c.rsplit('.').next())
            .unwrap_or("unknown")
    }
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

fn write_opt_str(f: &mut fmt::Formatter<'_>, name: &str, value: &Option<String>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{name}={v:?}"),
        None => write!(f, "{name}=None"),
    }
}

/// Attribute dump used by the full-description strategy.
impl fmt::Display for UIElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UIElement(")?;
        write_opt_str(f, "text", &self.text)?;
        f.write_str(", ")?;
        write_opt_str(f, "content_description", &self.content_description)?;
        f.write_str(", ")?;
        write_opt_str(f, "class_name", &self.class_name)?;
        match &self.bbox_pixels {
            Some(b) => write!(
                f,
                ", bbox_pixels=BoundingBox(x_min={}, x_max={}, y_min={}, y_max={})",
                b.x_min, b.x_max, b.y_min, b.y_max
            )?,
            None => f.write_str(", bbox_pixels=None")?,
        }
        f.write_str(", ")?;
        write_opt_str(f, "hint_text", &self.hint_text)?;
        write!(
            f,
            ", is_checked={}, is_checkable={}, is_clickable={}, is_editable={}, is_enabled={}, \
             is_focused={}, is_focusable={}, is_long_clickable={}, is_scrollable={}, \
             is_selected={}, is_visible={}, ",
            self.is_checked,
            self.is_checkable,
            self.is_clickable,
            self.is_editable,
            self.is_enabled,
            self.is_focused,
            self.is_focusable,
            self.is_long_clickable,
            self.is_scrollable,
            self.is_selected,
            self.is_visible,
        )?;
        write_opt_str(f, "package_name", &self.package_name)?;
        f.write_str(", ")?;
        write_opt_str(f, "resource_name", &self.resource_name)?;
        f.write_str(")")
    }
}

/// An element paired with its position in the unfiltered snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedElement<'a> {
    pub index: usize,
    pub element: &'a UIElement,
}

/// Logical screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Physical display area occupied by the device frame, in screenshot pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameBoundary {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

/// Display rotation as reported by the device (0 to 3 quarter turns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

impl Orientation {
    pub fn from_rotation(rotation: u8) -> Self {
        match rotation % 4 {
            0 => Orientation::Portrait,
            1 => Orientation::Landscape,
            2 => Orientation::ReversePortrait,
            _ => Orientation::ReverseLandscape,
        }
    }
}
