//! Overlay layout: single-image fit and the compare row.
//!
//! Both layouts are pure functions of the area and parameters, so the same
//! inputs always produce the same boxes.

use crate::geometry::{Area, TileBox};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Layout tuning shared by single and compare modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Fixed padding on every edge of the overlay.
    pub edge_padding: f32,
    /// Gap between compare tiles.
    pub gap: f32,
    /// Floor below which tiles do not shrink.
    pub min_tile_px: f32,
    /// Width taken by an adjacent side panel on the right (0 if closed).
    pub side_panel_width: f32,
    /// Debounce applied to resize-triggered relayout.
    #[serde(with = "millis")]
    pub resize_debounce: Duration,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            edge_padding: 24.0,
            gap: 4.0,
            min_tile_px: 64.0,
            side_panel_width: 0.0,
            resize_debounce: Duration::from_millis(100),
        }
    }
}

/// Result of a compare layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareLayout {
    pub tile_width: f32,
    pub tile_height: f32,
    /// One box per tile, left to right.
    pub boxes: Vec<TileBox>,
}

/// Equal-box row for `count` tiles.
///
/// Each tile gets `(width - 2*edge - side_panel - gap*(count-1)) / count`
/// pixels of width and the full padded height, floored at `min_tile_px`.
/// The row is centered in the area left of the side panel.
pub fn compute_compare_layout(area: Area, count: usize, params: &LayoutParams) -> CompareLayout {
    if count == 0 {
        return CompareLayout {
            tile_width: 0.0,
            tile_height: 0.0,
            boxes: Vec::new(),
        };
    }

    let n = count as f32;
    let gaps = params.gap * (n - 1.0);
    let usable_width =
        area.width - 2.0 * params.edge_padding - params.side_panel_width - gaps;
    let tile_width = (usable_width / n).max(params.min_tile_px);
    let tile_height = (area.height - 2.0 * params.edge_padding).max(params.min_tile_px);

    let row_width = tile_width * n + gaps;
    let content_width = area.width - params.side_panel_width;
    let x0 = (content_width - row_width) / 2.0;
    let y0 = (area.height - tile_height) / 2.0;

    let boxes = (0..count)
        .map(|i| {
            TileBox::new(
                x0 + i as f32 * (tile_width + params.gap),
                y0,
                tile_width,
                tile_height,
            )
        })
        .collect();

    CompareLayout {
        tile_width,
        tile_height,
        boxes,
    }
}

/// Centered box for one image scaled to fit the padded area.
///
/// The aspect ratio is kept when `dimensions` is known; otherwise the image
/// fills the padded box.
pub fn compute_single_layout(
    area: Area,
    dimensions: Option<(u32, u32)>,
    params: &LayoutParams,
) -> TileBox {
    let box_width =
        (area.width - 2.0 * params.edge_padding - params.side_panel_width).max(params.min_tile_px);
    let box_height = (area.height - 2.0 * params.edge_padding).max(params.min_tile_px);

    let (width, height) = match dimensions {
        Some((w, h)) => {
            let (w, h) = (w as f32, h as f32);
            let scale = (box_width / w).min(box_height / h);
            (w * scale, h * scale)
        }
        None => (box_width, box_height),
    };

    let content_width = area.width - params.side_panel_width;
    TileBox::new(
        (content_width - width) / 2.0,
        (area.height - height) / 2.0,
        width,
        height,
    )
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
