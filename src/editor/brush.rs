use super::PixelBuffer;
use crate::error::EditorError;

/// Smallest and largest brush radius the controller allows
pub const MIN_RADIUS: u32 = 1;
pub const MAX_RADIUS: u32 = 50;

/// Disc test: the cell's +0.5 offset center lies within `radius` of the stamp center.
pub fn covers(x: i64, y: i64, cx: i64, cy: i64, radius: u32) -> bool {
    let dx = (x - cx) as f64 + 0.5;
    let dy = (y - cy) as f64 + 0.5;
    (dx * dx + dy * dy).sqrt() <= radius as f64
}

/// Cells covered by a stamp at (`cx`, `cy`), clipped to a `size`x`size` grid.
/// Each cell is yielded once.
pub fn footprint(cx: i64, cy: i64, radius: u32, size: usize) -> impl Iterator<Item = (usize, usize)> {
    let r = radius as i64;
    let max = size as i64 - 1;
    let (x0, x1) = ((cx - r).max(0), (cx + r).min(max));
    let (y0, y1) = ((cy - r).max(0), (cy + r).min(max));

    (y0..=y1).flat_map(move |y| {
        (x0..=x1)
            .filter(move |&x| covers(x, y, cx, cy, radius))
            .map(move |x| (x as usize, y as usize))
    })
}

/// Write `color_index` into every covered cell. Returns the number of cells written.
///
/// The radius is trusted; callers keep it inside [`MIN_RADIUS`, `MAX_RADIUS`].
pub fn stamp(
    buffer: &mut PixelBuffer,
    cx: usize,
    cy: usize,
    radius: u32,
    color_index: u8,
) -> Result<usize, EditorError> {
    let mut written = 0;
    for (x, y) in footprint(cx as i64, cy as i64, radius, buffer.size()) {
        buffer.set(x, y, color_index)?;
        written += 1;
    }
    Ok(written)
}
