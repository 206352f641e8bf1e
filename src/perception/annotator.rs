//! Marks the element an action targets on the before-step screenshot.
//!
//! Element boxes are reported in logical coordinates while the screenshot is
//! physical pixels of a possibly rotated display, so corners go through
//! [`logical_to_physical`] before drawing.
use image::RgbaImage;

use crate::errors::{T3aError, T3aResult};
use crate::perception::types::{FrameBoundary, Orientation, ScreenSize, UIElement};

const MARK_COLOUR: [u8; 4] = [0, 230, 64, 230];

/// Map a logical point onto the physical frame for the given rotation.
pub fn logical_to_physical(
    (x, y): (f64, f64),
    logical: ScreenSize,
    frame: FrameBoundary,
    orientation: Orientation,
) -> (i32, i32) {
    let (lx, ly) = (logical.width.max(1) as f64, logical.height.max(1) as f64);
    let (px0, py0) = (frame.x_min as f64, frame.y_min as f64);
    let px = (frame.x_max - frame.x_min) as f64;
    let py = (frame.y_max - frame.y_min) as f64;

    let (fx, fy) = match orientation {
        Orientation::Portrait => (x * px / lx + px0, y * py / ly + py0),
        Orientation::Landscape => (px - y * px / ly + px0, x * py / lx + py0),
        Orientation::ReversePortrait => (px - x * px / lx + px0, py - y * py / ly + py0),
        Orientation::ReverseLandscape => (y * px / ly + px0, py - x * py / lx + py0),
    };
    (fx.round() as i32, fy.round() as i32)
}

/// Draw a box and the element's index around `element` on `canvas`.
pub fn mark_element(
    canvas: &mut RgbaImage,
    element: &UIElement,
    index: usize,
    logical: ScreenSize,
    frame: FrameBoundary,
    orientation: Orientation,
) -> T3aResult<()> {
    let bbox = element
        .bbox_pixels
        .ok_or_else(|| T3aError::Device(format!("element {index} has no bounding box")))?;

    let a = logical_to_physical((bbox.x_min as f64, bbox.y_min as f64), logical, frame, orientation);
    let b = logical_to_physical((bbox.x_max as f64, bbox.y_max as f64), logical, frame, orientation);
    let (x1, x2) = (a.0.min(b.0), a.0.max(b.0));
    let (y1, y2) = (a.1.min(b.1), a.1.max(b.1));

    let (w, h) = canvas.dimensions();
    if x2 < 0 || y2 < 0 || x1 >= w as i32 || y1 >= h as i32 {
        return Err(T3aError::Device(format!(
            "element {index} maps outside the screenshot ({x1},{y1})-({x2},{y2})"
        )));
    }

    // Thicker strokes on high-res screens so the mark survives downscaling.
    let scale: u32 = if w > 1600 { 2 } else { 1 };
    draw_rect(canvas, (x1, y1), (x2, y2), (scale * 3) as i32);
    draw_index_label(canvas, x1, y1, index, scale);
    tracing::debug!(index, x1, y1, x2, y2, ?orientation, "marked target element");
    Ok(())
}

/// Loops only over the part of each edge that lies on the canvas.
fn draw_rect(canvas: &mut RgbaImage, (x1, y1): (i32, i32), (x2, y2): (i32, i32), thickness: i32) {
    let (w, h) = canvas.dimensions();
    let (max_x, max_y) = (w as i32 - 1, h as i32 - 1);
    let (cx1, cx2) = (x1.max(0), x2.min(max_x));
    let (cy1, cy2) = (y1.max(0), y2.min(max_y));
    for t in 0..thickness {
        for x in cx1..=cx2 {
            blend(canvas, x, y1.saturating_add(t));
            blend(canvas, x, y2.saturating_sub(t));
        }
        for y in cy1..=cy2 {
            blend(canvas, x1.saturating_add(t), y);
            blend(canvas, x2.saturating_sub(t), y);
        }
    }
}

/// Index digits on a darkened plate just inside the top-left corner.
fn draw_index_label(canvas: &mut RgbaImage, x: i32, y: i32, index: usize, scale: u32) {
    let digits = index.to_string();
    let pad = (2 * scale) as i32;
    let advance = (5 * scale + 1) as i32;
    let plate_w = digits.len() as i32 * advance + pad * 2;
    let plate_h = (5 * scale) as i32 + pad * 2;
    let (ox, oy) = (x.max(0), y.max(0));

    for dy in 0..plate_h {
        for dx in 0..plate_w {
            if let Some(p) = pixel_mut(canvas, ox + dx, oy + dy) {
                for c in p.0.iter_mut().take(3) {
                    *c /= 5;
                }
                p.0[3] = 255;
            }
        }
    }

    for (i, d) in digits.bytes().enumerate() {
        let glyph = DIGITS[(d - b'0') as usize];
        let gx = ox + pad + i as i32 * advance;
        let gy = oy + pad;
        for (row, bits) in glyph.iter().enumerate() {
            for bit in 0..5u32 {
                if (bits >> (4 - bit)) & 1 == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        blend(
                            canvas,
                            gx + (bit * scale + sx) as i32,
                            gy + (row as u32 * scale + sy) as i32,
                        );
                    }
                }
            }
        }
    }
}

fn pixel_mut(canvas: &mut RgbaImage, x: i32, y: i32) -> Option<&mut image::Rgba<u8>> {
    let (w, h) = canvas.dimensions();
    if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
        return None;
    }
    Some(canvas.get_pixel_mut(x as u32, y as u32))
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32) {
    if let Some(p) = pixel_mut(canvas, x, y) {
        let a = MARK_COLOUR[3] as f32 / 255.0;
        for c in 0..3 {
            p.0[c] = (p.0[c] as f32 * (1.0 - a) + MARK_COLOUR[c] as f32 * a).round() as u8;
        }
        p.0[3] = 255;
    }
}

/// 5x5 bitmap digits.
const DIGITS: [[u8; 5]; 10] = [
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00110, 0b01000, 0b11111],
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110],
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110],
    [0b01110, 0b10000, 0b11110, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b00100],
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110],
];
