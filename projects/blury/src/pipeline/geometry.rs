use crate::pipeline::types::BBox;
use opencv::core::{Rect, Size};

/// Share of the vehicle height skipped from the top of the box.
const PLATE_TOP_RATIO: f64 = 0.30;
/// Share of the vehicle height added below the box.
const PLATE_BOTTOM_RATIO: f64 = 0.10;
/// Share of the vehicle width trimmed from each side.
const PLATE_SIDE_RATIO: f64 = 0.10;

/// Estimate where the license plate sits inside a vehicle box.
///
/// The lower 70% of the box plus a 10% skirt below it, inset by 10% on both
/// sides. Offsets are truncated toward zero.
pub fn plate_region(vehicle: &BBox) -> BBox {
    let h = vehicle.height() as f64;
    let w = vehicle.width() as f64;

    BBox {
        left: vehicle.left + (w * PLATE_SIDE_RATIO) as i32,
        top: vehicle.top + (h * PLATE_TOP_RATIO) as i32,
        right: vehicle.right - (w * PLATE_SIDE_RATIO) as i32,
        bottom: vehicle.bottom + (h * PLATE_BOTTOM_RATIO) as i32,
    }
}

/// Clamp a box to an image of the given size.
///
/// Returns `None` when nothing of the box is left inside the image.
pub fn clamp_to_image(bbox: &BBox, size: Size) -> Option<Rect> {
    let left = bbox.left.clamp(0, size.width);
    let top = bbox.top.clamp(0, size.height);
    let right = bbox.right.clamp(0, size.width);
    let bottom = bbox.bottom.clamp(0, size.height);

    if right <= left || bottom <= top {
        return None;
    }

    Some(Rect::new(left, top, right - left, bottom - top))
}
