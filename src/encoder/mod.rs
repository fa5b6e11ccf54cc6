mod gif_encoder;

pub use gif_encoder::GifEncoder;

use anyhow::{Context, Result};
use std::path::Path;

use crate::renderer::{Canvas, Palette};

/// Trait for animated encoders
pub trait AnimatedEncoder {
    fn add_frame(&mut self, canvas: &Canvas, delay_centiseconds: u16) -> Result<()>;
    fn finish(self) -> Result<()>;
}

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Gif,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| Self::from_name(ext))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gif" => Some(OutputFormat::Gif),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::Png => "png",
        }
    }
}

/// Write a single still image
pub fn write_still(path: &Path, format: OutputFormat, canvas: &Canvas, palette: &Palette) -> Result<()> {
    match format {
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::create(path, canvas.width(), canvas.height(), palette, 0)?;
            encoder.add_frame(canvas, 0)?;
            encoder.finish()
        }
        OutputFormat::Png => {
            let image = image::RgbImage::from_raw(
                canvas.width() as u32,
                canvas.height() as u32,
                canvas.data().to_vec(),
            )
            .context("Canvas size does not match its pixel data")?;
            image
                .save_with_format(path, image::ImageFormat::Png)
                .with_context(|| format!("Failed to write PNG: {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Surface;

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.GIF")), Some(OutputFormat::Gif));
        assert_eq!(OutputFormat::from_path(Path::new("art.png")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("art.webm")), None);
        assert_eq!(OutputFormat::from_path(Path::new("art")), None);
    }

    #[test]
    fn png_keeps_exact_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        let palette = Palette::default();
        let mut canvas = Canvas::new(3, 2);
        canvas.clear(palette.color_at(14).unwrap());

        write_still(&path, OutputFormat::Png, &canvas, &palette).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, palette.color_at(14).unwrap());
    }

    #[test]
    fn gif_still_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.gif");
        let palette = Palette::default();
        write_still(&path, OutputFormat::Gif, &Canvas::new(2, 2), &palette).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");
    }
}
