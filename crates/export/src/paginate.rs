use crate::error::ExportError;
use crate::layout::{Band, CONTAINER_PADDING, Mark};
use crate::options::{ExportOptions, PX_PER_MM};

/// Slack when comparing mark edges against a cut line.
const EPSILON: f32 = 0.01;

/// Page box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub padding: f32,
}

impl PageGeometry {
    pub fn from_options(options: &ExportOptions) -> Self {
        let (width_mm, height_mm) = options.page_size.dimensions_mm();
        Self {
            width: width_mm * PX_PER_MM,
            height: height_mm * PX_PER_MM,
            margin: options.margin_mm * PX_PER_MM,
            padding: CONTAINER_PADDING,
        }
    }

    pub fn content_left(&self) -> f32 {
        self.margin + self.padding
    }

    pub fn content_top(&self) -> f32 {
        self.margin + self.padding
    }

    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin - self.padding
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * (self.margin + self.padding)
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }
}

/// Marks of one page, in page pixels from the top-left corner.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub marks: Vec<Mark>,
}

/// Place bands top to bottom, starting a new page whenever the next band
/// does not fit. Bands that fit on a page are never split. A band taller than
/// the content area is cut between lines of text into page-sized pieces, each
/// starting a new page; if no such cut exists the export fails with
/// [`ExportError::ContentTooTall`]. Always yields at least one page.
pub fn paginate(bands: &[Band], geometry: &PageGeometry, options: &ExportOptions) -> Result<Vec<Page>, ExportError> {
    let top = geometry.content_top();
    let bottom = geometry.content_bottom();
    let left = geometry.content_left();
    let limit = geometry.content_height();

    let mut pages = vec![Page::default()];
    let mut cursor = top;

    for band in bands {
        let pieces = if band.height > limit {
            split_band(band, limit)?
        } else {
            vec![band.clone()]
        };

        for piece in &pieces {
            let at_top = cursor <= top;
            if piece.is_spacer() && at_top {
                continue;
            }
            if !at_top && cursor + piece.height > bottom {
                if piece.is_spacer() {
                    continue;
                }
                pages.push(Page::default());
                cursor = top;
            }

            if let Some(page) = pages.last_mut() {
                page.marks
                    .extend(piece.marks.iter().map(|m| m.placed(left, cursor, |v| options.snap(v))));
            }
            cursor += piece.height;
        }
    }

    tracing::debug!(pages = pages.len(), bands = bands.len(), "document paginated");
    Ok(pages)
}

/// Cut `band` into pieces no taller than `limit`. Cuts fall on lines no mark
/// straddles; each mark goes to the piece its top edge lies in.
fn split_band(band: &Band, limit: f32) -> Result<Vec<Band>, ExportError> {
    let extents: Vec<(f32, f32)> = band.marks.iter().map(Mark::vertical_extent).collect();
    let straddled = |y: f32| extents.iter().any(|&(start, end)| start < y - EPSILON && end > y + EPSILON);

    let mut cuts = Vec::new();
    let mut offset = 0.0f32;
    while band.height - offset > limit {
        let reach = offset + limit;
        let cut = extents
            .iter()
            .map(|&(_, end)| end)
            .chain([reach])
            .filter(|&y| y > offset + EPSILON && y <= reach && !straddled(y))
            .max_by(f32::total_cmp)
            .ok_or(ExportError::ContentTooTall {
                height: band.height,
                limit,
            })?;
        cuts.push(cut);
        offset = cut;
    }

    let bounds: Vec<f32> = std::iter::once(0.0).chain(cuts.iter().copied()).collect();
    let mut pieces: Vec<Band> = bounds
        .iter()
        .zip(cuts.iter().copied().chain([band.height]))
        .map(|(&from, to)| Band {
            height: to - from,
            marks: Vec::new(),
        })
        .collect();

    for (mark, &(start, _)) in band.marks.iter().zip(&extents) {
        let idx = cuts.iter().filter(|&&cut| start >= cut - EPSILON).count();
        pieces[idx].marks.push(mark.placed(0.0, -bounds[idx], |v| v));
    }

    tracing::debug!(height = band.height, pieces = pieces.len(), "oversized band split");
    Ok(pieces)
}
