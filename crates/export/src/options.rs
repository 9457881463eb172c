use std::path::PathBuf;

use crate::error::ExportError;

/// CSS pixels per millimetre (96 dpi).
pub const PX_PER_MM: f32 = 96.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// 210 x 297 mm, portrait.
    #[default]
    A4,
}

impl PageSize {
    /// (width, height) in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontChoice {
    /// Built-in PDF Helvetica. ASCII only; `₹` prints as `Rs.`.
    #[default]
    Helvetica,
    /// A TrueType font file, embedded in the PDF. Prints text as-is.
    TrueType(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Device-scale factor; positions snap to a `1/scale` pixel grid.
    pub scale: u32,
    pub page_size: PageSize,
    pub margin_mm: f32,
    pub font: FontChoice,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: 2,
            page_size: PageSize::A4,
            margin_mm: 0.0,
            font: FontChoice::Helvetica,
        }
    }
}

impl ExportOptions {
    pub fn with_font(mut self, font: FontChoice) -> Self {
        self.font = font;
        self
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if !(1..=4).contains(&self.scale) {
            return Err(ExportError::invalid_options(format!(
                "scale must be between 1 and 4, got {}",
                self.scale
            )));
        }
        let (width, height) = self.page_size.dimensions_mm();
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 || self.margin_mm * 2.0 >= width.min(height) {
            return Err(ExportError::invalid_options(format!(
                "margin must be at least 0 and leave room for content, got {} mm",
                self.margin_mm
            )));
        }
        if let FontChoice::TrueType(path) = &self.font {
            if !path.is_file() {
                return Err(ExportError::invalid_options(format!(
                    "font file not found: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Round a pixel position to the device grid.
    pub fn snap(&self, px: f32) -> f32 {
        let scale = self.scale as f32;
        (px * scale).round() / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_a4_at_double_scale_without_margin() {
        let options = ExportOptions::default();
        assert_eq!(options.scale, 2);
        assert_eq!(options.page_size.dimensions_mm(), (210.0, 297.0));
        assert_eq!(options.margin_mm, 0.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn snapping_uses_half_pixels_at_scale_two() {
        let options = ExportOptions::default();
        assert_eq!(options.snap(10.2), 10.0);
        assert_eq!(options.snap(10.3), 10.5);
        assert_eq!(options.snap(10.8), 11.0);
    }

    #[test]
    fn rejects_bad_options() {
        let options = ExportOptions { scale: 0, ..ExportOptions::default() };
        assert!(matches!(options.validate(), Err(ExportError::InvalidOptions(_))));

        let options = ExportOptions { margin_mm: 120.0, ..ExportOptions::default() };
        assert!(options.validate().is_err());

        let options = ExportOptions::default()
            .with_font(FontChoice::TrueType(PathBuf::from("/nonexistent/font.ttf")));
        assert!(options.validate().is_err());
    }
}
