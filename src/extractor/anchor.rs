//! Placement of the chip window relative to a coordinate's pixel

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::raster::{PixelIndex, Window};

/// Where a coordinate's pixel sits inside its chip window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowAnchor {
    /// The pixel is the window's top-left corner
    #[default]
    Corner,
    /// The pixel is the window's center
    Center,
}

impl WindowAnchor {
    pub fn name(&self) -> &'static str {
        match self {
            WindowAnchor::Corner => "corner",
            WindowAnchor::Center => "center",
        }
    }
}

impl fmt::Display for WindowAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "corner" => Ok(WindowAnchor::Corner),
            "center" | "centre" => Ok(WindowAnchor::Center),
            other => Err(format!("Unknown window anchor: {}", other)),
        }
    }
}

/// Side length of the chip window for a chip size
pub fn window_size(chip_size: usize) -> usize {
    2 * chip_size + 1
}

/// The square chip window for a pixel
///
/// # Arguments
/// * `pixel` - Pixel the coordinate resolved to
/// * `chip_size` - Padding around the pixel; the window side is `2 * chip_size + 1`
/// * `anchor` - Placement of the pixel inside the window
pub fn chip_window(pixel: PixelIndex, chip_size: usize, anchor: WindowAnchor) -> Window {
    let size = window_size(chip_size);
    match anchor {
        WindowAnchor::Corner => Window::square(pixel.col, pixel.row, size),
        WindowAnchor::Center => {
            let pad = chip_size as i64;
            Window::square(pixel.col - pad, pixel.row - pad, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_anchor_starts_at_pixel() {
        let window = chip_window(PixelIndex::new(7, 3), 2, WindowAnchor::Corner);
        assert_eq!(window, Window::new(3, 7, 5, 5));
    }

    #[test]
    fn center_anchor_surrounds_pixel() {
        let window = chip_window(PixelIndex::new(7, 3), 2, WindowAnchor::Center);
        assert_eq!(window, Window::new(1, 5, 5, 5));
    }

    #[test]
    fn zero_chip_size_is_single_pixel() {
        let window = chip_window(PixelIndex::new(0, 0), 0, WindowAnchor::Center);
        assert_eq!(window, Window::new(0, 0, 1, 1));
    }

    #[test]
    fn parses_anchor_names() {
        assert_eq!("Center".parse::<WindowAnchor>().unwrap(), WindowAnchor::Center);
        assert_eq!("corner".parse::<WindowAnchor>().unwrap(), WindowAnchor::Corner);
        assert!("middle".parse::<WindowAnchor>().is_err());
        assert_eq!(WindowAnchor::default(), WindowAnchor::Corner);
    }
}
