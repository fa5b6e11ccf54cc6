use crate::error::EditorError;

/// Number of entries in the fixed palette
pub const PALETTE_SIZE: usize = 16;

/// An RGB triplet
pub type Rgb = [u8; 3];

const PICO_COLORS: [Rgb; PALETTE_SIZE] = [
    [0x00, 0x00, 0x00], // 0: Black
    [0x1D, 0x2B, 0x53], // 1: Dark Blue
    [0x7E, 0x25, 0x53], // 2: Dark Purple
    [0x00, 0x87, 0x51], // 3: Dark Green
    [0xAB, 0x52, 0x36], // 4: Brown
    [0x5F, 0x57, 0x4F], // 5: Dark Gray
    [0xC2, 0xC3, 0xC7], // 6: Light Gray
    [0xFF, 0xF1, 0xE8], // 7: White
    [0xFF, 0x00, 0x4D], // 8: Red
    [0xFF, 0xA3, 0x00], // 9: Orange
    [0xFF, 0xEC, 0x27], // 10: Yellow
    [0x00, 0xE4, 0x36], // 11: Green
    [0x29, 0xAD, 0xFF], // 12: Blue
    [0x83, 0x76, 0x9C], // 13: Lavender
    [0xFF, 0x77, 0xA8], // 14: Pink
    [0xFF, 0xCC, 0xAA], // 15: Peach
];

/// The fixed session palette. Cells and editor state hold indices into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self { colors: PICO_COLORS }
    }
}

impl Palette {
    pub fn size(&self) -> usize {
        PALETTE_SIZE
    }

    pub fn color_at(&self, index: u8) -> Result<Rgb, EditorError> {
        self.colors
            .get(index as usize)
            .copied()
            .ok_or(EditorError::IndexOutOfRange(index as usize))
    }

    /// Flat RGB table (48 bytes), the layout GIF global color tables expect
    pub fn flat(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    /// Nearest palette index by squared RGB distance. Ties go to the lower index.
    pub fn match_color_index(&self, r: u8, g: u8, b: u8) -> u8 {
        let mut best = 0usize;
        let mut best_distance = i32::MAX;

        for (i, [mr, mg, mb]) in self.colors.iter().enumerate() {
            let dr = r as i32 - *mr as i32;
            let dg = g as i32 - *mg as i32;
            let db = b as i32 - *mb as i32;
            let distance = dr * dr + dg * dg + db * db;
            if distance < best_distance {
                best_distance = distance;
                best = i;
            }
        }

        best as u8
    }

    /// Parse a `#RRGGBB` string into an RGB triplet
    pub fn parse_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some([channel(0)?, channel(2)?, channel(4)?])
    }
}
