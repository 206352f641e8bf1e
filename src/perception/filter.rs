//! Element predicates shared by the description strategies.
//!
//! Every filter here keeps the element's position in the unfiltered snapshot,
//! so an index shown to the model always addresses the same element the
//! device reported.
use crate::perception::types::{non_blank, IndexedElement, ScreenSize, UIElement};

/// Structural containers and decorative icons.
const IGNORED_CLASSES: [&str; 4] = [
    "android.widget.ImageView",
    "android.widget.FrameLayout",
    "android.widget.LinearLayout",
    "android.widget.ScrollView",
];

/// Visible, and when a bounding box is present it is non-degenerate and
/// overlaps the screen.
pub fn is_valid(element: &UIElement, screen: ScreenSize) -> bool {
    if !element.is_visible {
        return false;
    }
    let Some(b) = element.bbox_pixels else {
        return true;
    };
    let (w, h) = (screen.width as i64, screen.height as i64);
    let (x_min, x_max, y_min, y_max) = (
        b.x_min as i64,
        b.x_max as i64,
        b.y_min as i64,
        b.y_max as i64,
    );
    !(x_min >= x_max || x_min >= w || x_max <= 0 || y_min >= y_max || y_min >= h || y_max <= 0)
}

/// Whether an element is worth showing to the model.
pub fn is_meaningful(element: &UIElement) -> bool {
    let interactive = element.is_clickable || element.is_editable;
    if let Some(class) = element.class_name.as_deref() {
        if IGNORED_CLASSES.contains(&class) && !interactive {
            return false;
        }
    }

    if element
        .content_description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains("notification"))
    {
        return false;
    }

    element.is_visible
        && (interactive
            || element.is_scrollable
            || element.is_checkable
            || non_blank(element.text.as_deref()).is_some()
            || non_blank(element.content_description.as_deref()).is_some())
}

pub fn filter_valid(elements: &[UIElement], screen: ScreenSize) -> Vec<IndexedElement<'_>> {
    keep_indexed(elements, |e| is_valid(e, screen))
}

pub fn filter_meaningful(elements: &[UIElement]) -> Vec<IndexedElement<'_>> {
    keep_indexed(elements, is_meaningful)
}

fn keep_indexed<'a>(
    elements: &'a [UIElement],
    keep: impl Fn(&UIElement) -> bool,
) -> Vec<IndexedElement<'a>> {
    let kept: Vec<IndexedElement<'a>> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            if keep(element) {
                Some(IndexedElement { index, element })
            } else {
                tracing::debug!(index, element = %element, "filtered out UI element");
                None
            }
        })
        .collect();

    tracing::info!(before = elements.len(), after = kept.len(), "filtered UI elements");
    kept
}
