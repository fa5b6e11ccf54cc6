use anyhow::{Context, Result};
use gif::{DisposalMethod, Encoder, Frame, Repeat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::AnimatedEncoder;
use crate::renderer::{Canvas, Palette};

/// Indexed GIF writer over the fixed palette. Frames after the first only carry
/// the bounding box of changed pixels.
pub struct GifEncoder<W: Write = BufWriter<File>> {
    encoder: Encoder<W>,
    palette: Palette,
    width: u16,
    height: u16,
    previous_frame: Option<Vec<u8>>,
}

impl GifEncoder {
    pub fn create(path: &Path, width: usize, height: usize, palette: &Palette, loop_count: u16) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Self::new(BufWriter::new(file), width, height, palette, loop_count)
    }
}

impl<W: Write> GifEncoder<W> {
    pub fn new(writer: W, width: usize, height: usize, palette: &Palette, loop_count: u16) -> Result<Self> {
        let (w, h) = (dimension(width)?, dimension(height)?);
        let mut encoder = Encoder::new(writer, w, h, &palette.flat())?;

        // 0 = infinite
        encoder.set_repeat(if loop_count == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(loop_count)
        })?;

        Ok(Self {
            encoder,
            palette: *palette,
            width: w,
            height: h,
            previous_frame: None,
        })
    }

    fn write_indexed(&mut self, data: Vec<u8>, delay_centiseconds: u16) -> Result<()> {
        let (left, top, width, height, frame_data) = match &self.previous_frame {
            Some(prev) => self.compute_diff(prev, &data),
            None => (0, 0, self.width, self.height, data.clone()),
        };

        let mut frame = Frame::from_indexed_pixels(width, height, frame_data, None);
        frame.delay = delay_centiseconds;
        frame.left = left;
        frame.top = top;
        frame.dispose = DisposalMethod::Keep;

        self.encoder.write_frame(&frame)?;
        self.previous_frame = Some(data);
        Ok(())
    }

    fn compute_diff(&self, prev: &[u8], curr: &[u8]) -> (u16, u16, u16, u16, Vec<u8>) {
        let width = self.width as usize;
        let height = self.height as usize;

        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                if prev[idx] != curr[idx] {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }

        let Some((min_x, min_y, max_x, max_y)) = bounds else {
            // Unchanged: a 1x1 frame keeps the delay
            return (0, 0, 1, 1, vec![curr[0]]);
        };

        let mut frame_data = Vec::with_capacity((max_x - min_x + 1) * (max_y - min_y + 1));
        for y in min_y..=max_y {
            frame_data.extend_from_slice(&curr[y * width + min_x..=y * width + max_x]);
        }

        (
            min_x as u16,
            min_y as u16,
            (max_x - min_x + 1) as u16,
            (max_y - min_y + 1) as u16,
            frame_data,
        )
    }

    pub fn into_inner(self) -> Result<W> {
        Ok(self.encoder.into_inner()?)
    }
}

impl<W: Write> AnimatedEncoder for GifEncoder<W> {
    fn add_frame(&mut self, canvas: &Canvas, delay_centiseconds: u16) -> Result<()> {
        if canvas.width() != self.width as usize || canvas.height() != self.height as usize {
            anyhow::bail!(
                "Frame is {}x{}, encoder expects {}x{}",
                canvas.width(),
                canvas.height(),
                self.width,
                self.height
            );
        }
        let data = canvas.to_indexed(&self.palette);
        self.write_indexed(data, delay_centiseconds)
    }

    fn finish(self) -> Result<()> {
        let mut writer = self.into_inner()?;
        writer.flush()?;
        Ok(())
    }
}

fn dimension(value: usize) -> Result<u16> {
    match u16::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => anyhow::bail!("GIF dimension {} is outside 1..=65535", value),
    }
}
