use std::fs::File;
use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, Point};

use crate::error::ExportError;
use crate::layout::Mark;
use crate::options::{ExportOptions, FontChoice, PX_PER_MM};
use crate::paginate::Page;

/// CSS px to PDF points.
const PT_PER_PX: f32 = 0.75;

fn mm(px: f32) -> Mm {
    Mm(px / PX_PER_MM)
}

/// PDF y grows upwards from the bottom edge.
fn flipped(page_height_mm: f32, px: f32) -> Mm {
    Mm(page_height_mm - px / PX_PER_MM)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Serialise laid-out pages to PDF bytes, entirely in memory.
pub(crate) fn write_pdf(title: &str, pages: &[Page], options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let (width_mm, height_mm) = options.page_size.dimensions_mm();
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(width_mm), Mm(height_mm), "Layer 1");

    let fonts = match &options.font {
        FontChoice::Helvetica => Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ExportError::Font(e.to_string()))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ExportError::Font(e.to_string()))?,
        },
        FontChoice::TrueType(path) => {
            let font = doc
                .add_external_font(File::open(path)?)
                .map_err(|e| ExportError::Font(format!("{}: {e}", path.display())))?;
            Fonts {
                regular: font.clone(),
                bold: font,
            }
        }
    };

    for (idx, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if idx == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(width_mm), Mm(height_mm), format!("Layer {}", idx + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for mark in &page.marks {
            match mark {
                Mark::Text {
                    x,
                    baseline,
                    size,
                    bold,
                    text,
                } => {
                    let font = if *bold { &fonts.bold } else { &fonts.regular };
                    layer.use_text(text.as_str(), size * PT_PER_PX, mm(*x), flipped(height_mm, *baseline), font);
                }
                Mark::Rule { from, to, width } => {
                    layer.set_outline_thickness(width * PT_PER_PX);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(mm(from.0), flipped(height_mm, from.1)), false),
                            (Point::new(mm(to.0), flipped(height_mm, to.1)), false),
                        ],
                        is_closed: false,
                    });
                }
            }
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(|e| ExportError::Pdf(e.to_string()))?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
