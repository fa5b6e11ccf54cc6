use super::PixelBuffer;
use crate::error::EditorError;

/// 4-connected flood fill from (`seed_x`, `seed_y`) with an explicit work stack.
///
/// Returns the number of cells repainted. Filling with the color already under
/// the seed is a no-op that touches nothing.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    seed_x: usize,
    seed_y: usize,
    new_color: u8,
) -> Result<usize, EditorError> {
    let target = buffer.get(seed_x, seed_y)?;
    if target == new_color {
        return Ok(0);
    }

    let size = buffer.size();
    let mut visited = vec![false; size * size];
    let mut stack = vec![(seed_x, seed_y)];
    let mut filled = 0;

    while let Some((x, y)) = stack.pop() {
        let idx = y * size + x;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        if buffer.get(x, y)? != target {
            continue;
        }
        buffer.set(x, y, new_color)?;
        filled += 1;

        let mut push = |nx: usize, ny: usize| {
            if !visited[ny * size + nx] {
                stack.push((nx, ny));
            }
        };
        if x > 0 {
            push(x - 1, y);
        }
        if x + 1 < size {
            push(x + 1, y);
        }
        if y > 0 {
            push(x, y - 1);
        }
        if y + 1 < size {
            push(x, y + 1);
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashSet, VecDeque};

    fn grid(rows: &[&str]) -> PixelBuffer {
        let pixels: Vec<u8> = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| b - b'0'))
            .collect();
        PixelBuffer::from_record(rows.len(), &pixels).unwrap()
    }

    /// Reference region via breadth-first search over the original buffer
    fn region(buffer: &PixelBuffer, sx: usize, sy: usize) -> HashSet<(usize, usize)> {
        let size = buffer.size();
        let target = buffer.get(sx, sy).unwrap();
        let mut seen = HashSet::from([(sx, sy)]);
        let mut queue = VecDeque::from([(sx, sy)]);
        while let Some((x, y)) = queue.pop_front() {
            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx < size && ny < size && buffer.get(nx, ny).unwrap() == target && seen.insert((nx, ny)) {
                    queue.push_back((nx, ny));
                }
            }
        }
        seen
    }

    #[test]
    fn fills_uniform_grid_entirely() {
        let mut buffer = PixelBuffer::new(128, 0).unwrap();
        let filled = flood_fill(&mut buffer, 64, 64, 7).unwrap();
        assert_eq!(filled, 128 * 128);
        assert!(buffer.cells().iter().all(|&c| c == 7));
    }

    #[test]
    fn same_color_is_a_no_op() {
        let mut buffer = grid(&["0110", "0110", "0000", "2222"]);
        let before = buffer.clone();
        assert_eq!(flood_fill(&mut buffer, 1, 0, 1), Ok(0));
        assert_eq!(buffer, before);
    }

    #[test]
    fn diagonal_neighbors_are_not_connected() {
        let mut buffer = grid(&["0100", "1010", "0100", "0000"]);
        flood_fill(&mut buffer, 0, 0, 5).unwrap();
        assert_eq!(buffer, grid(&["5100", "1010", "0100", "0000"]));
    }

    #[test]
    fn fill_stops_at_region_border() {
        let mut buffer = grid(&["0010", "0010", "1110", "0000"]);
        assert_eq!(flood_fill(&mut buffer, 0, 0, 3), Ok(4));
        assert_eq!(buffer, grid(&["3310", "3310", "1110", "0000"]));
    }

    #[test]
    fn seed_outside_grid_is_out_of_range() {
        let mut buffer = PixelBuffer::new(4, 0).unwrap();
        let err = flood_fill(&mut buffer, 4, 1, 2).unwrap_err();
        assert!(err.is_out_of_range());
        assert!(buffer.cells().iter().all(|&c| c == 0));
    }

    proptest! {
        #[test]
        fn fill_changes_exactly_the_connected_region(
            pixels in proptest::collection::vec(0u8..3, 100),
            sx in 0usize..10,
            sy in 0usize..10,
            color in 0u8..16,
        ) {
            let original = PixelBuffer::from_record(10, &pixels).unwrap();
            let expected = region(&original, sx, sy);
            let target = original.get(sx, sy).unwrap();

            let mut buffer = original.clone();
            flood_fill(&mut buffer, sx, sy, color).unwrap();

            for y in 0..10 {
                for x in 0..10 {
                    let want = if expected.contains(&(x, y)) { color } else { original.get(x, y).unwrap() };
                    prop_assert_eq!(buffer.get(x, y).unwrap(), want);
                }
            }
            if target != color {
                prop_assert_eq!(flood_fill(&mut buffer, sx, sy, color).unwrap(), 0);
            }
        }

        #[test]
        fn refilling_with_same_color_is_idempotent(
            pixels in proptest::collection::vec(0u8..4, 64),
            sx in 0usize..8,
            sy in 0usize..8,
        ) {
            let mut buffer = PixelBuffer::from_record(8, &pixels).unwrap();
            let color = buffer.get(sx, sy).unwrap();
            let before = buffer.clone();
            flood_fill(&mut buffer, sx, sy, color).unwrap();
            prop_assert_eq!(buffer, before);
        }
    }
}
