use super::{Palette, Rgb, Surface};
use rayon::prelude::*;

/// Offscreen RGB surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height * 3],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Packed RGB bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: Rgb) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            self.data[idx..idx + 3].copy_from_slice(&rgb);
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
        } else {
            None
        }
    }

    /// Map every pixel to its nearest palette index (for indexed encoders)
    pub fn to_indexed(&self, palette: &Palette) -> Vec<u8> {
        self.data
            .par_chunks(3)
            .map(|px| palette.match_color_index(px[0], px[1], px[2]))
            .collect()
    }
}

impl Surface for Canvas {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn clear(&mut self, rgb: Rgb) {
        self.data
            .par_chunks_mut(3)
            .for_each(|px| px.copy_from_slice(&rgb));
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, rgb: Rgb) {
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        for py in y.min(y1)..y1 {
            let row = py * self.width * 3;
            for px in x.min(x1)..x1 {
                let idx = row + px * 3;
                self.data[idx..idx + 3].copy_from_slice(&rgb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(2, 2, 10, 10, [9, 9, 9]);
        assert_eq!(canvas.get_pixel(3, 3), Some([9, 9, 9]));
        assert_eq!(canvas.get_pixel(1, 3), Some([0, 0, 0]));
        assert_eq!(canvas.get_pixel(4, 0), None);
    }

    #[test]
    fn clear_paints_every_pixel() {
        let mut canvas = Canvas::new(3, 2);
        canvas.clear([1, 2, 3]);
        assert!(canvas.data().chunks(3).all(|px| px == [1, 2, 3]));
    }

    #[test]
    fn to_indexed_uses_palette() {
        let palette = Palette::default();
        let mut canvas = Canvas::new(2, 1);
        canvas.set_pixel(1, 0, palette.color_at(12).unwrap());
        assert_eq!(canvas.to_indexed(&palette), vec![0, 12]);
    }
}
