//! Font handling: encodability and text measurement.

use crate::error::ExportError;
use crate::options::FontChoice;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold runs roughly this much wider than the regular face.
const BOLD_FACTOR: f32 = 1.08;

/// Average advance used for embedded fonts, whose metrics are not parsed.
const PROPORTIONAL_ADVANCE: f32 = 0.56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Metrics {
    Helvetica,
    Proportional,
}

impl Metrics {
    pub(crate) fn for_font(font: &FontChoice) -> Self {
        match font {
            FontChoice::Helvetica => Metrics::Helvetica,
            FontChoice::TrueType(_) => Metrics::Proportional,
        }
    }

    /// Text as it will be written to the PDF.
    pub(crate) fn prepare(&self, text: &str) -> Result<String, ExportError> {
        match self {
            Metrics::Helvetica => fold_to_ascii(text),
            Metrics::Proportional => Ok(text.to_string()),
        }
    }

    /// Advance width of `text` in px at `size` px.
    pub(crate) fn width(&self, text: &str, size: f32, bold: bool) -> f32 {
        let em: f32 = match self {
            Metrics::Helvetica => text
                .chars()
                .map(|ch| {
                    let idx = (ch as u32).wrapping_sub(32) as usize;
                    HELVETICA_WIDTHS.get(idx).copied().unwrap_or(556) as f32 / 1000.0
                })
                .sum(),
            Metrics::Proportional => text.chars().count() as f32 * PROPORTIONAL_ADVANCE,
        };
        let width = em * size;
        if bold { width * BOLD_FACTOR } else { width }
    }
}

/// Map text onto the printable ASCII range of the built-in font.
pub(crate) fn fold_to_ascii(text: &str) -> Result<String, ExportError> {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' '..='~' => out.push(ch),
            '₹' => out.push_str("Rs."),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\t' | '\n' | '\r' => out.push(' '),
            other => {
                return Err(ExportError::UnsupportedContent {
                    character: other,
                    font: "Helvetica",
                });
            }
        }
    }
    Ok(out)
}
