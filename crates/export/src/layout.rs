//! Layout of a rendered invoice into page-independent bands.
//!
//! A band is an unbreakable horizontal strip (a paragraph, a side-by-side
//! block, one table row). Coordinates are CSS pixels relative to the band's
//! top-left corner; the paginator places bands onto pages.

use qikspare_render::document::{Element, Node, Tag, class};

use crate::error::ExportError;
use crate::text::Metrics;

pub const BASE_FONT_SIZE: f32 = 12.0;
/// Padding of the invoice container, repeated on every page.
pub const CONTAINER_PADDING: f32 = 32.0;

const LINE_HEIGHT: f32 = 1.4;
const ASCENT: f32 = 0.8;
const COLUMN_GAP: f32 = 24.0;
const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_Y: f32 = 4.0;
const MIN_COLUMN_WIDTH: f32 = 24.0;
const HEADER_PADDING_BOTTOM: f32 = 12.0;
const RULE_WIDTH: f32 = 1.0;
const HEAVY_RULE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Text {
        x: f32,
        baseline: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Rule {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
    },
}

impl Mark {
    /// The same mark moved by `(dx, dy)`, with coordinates passed through `snap`.
    pub fn placed(&self, dx: f32, dy: f32, snap: impl Fn(f32) -> f32) -> Mark {
        match self {
            Mark::Text {
                x,
                baseline,
                size,
                bold,
                text,
            } => Mark::Text {
                x: snap(x + dx),
                baseline: snap(baseline + dy),
                size: *size,
                bold: *bold,
                text: text.clone(),
            },
            Mark::Rule { from, to, width } => Mark::Rule {
                from: (snap(from.0 + dx), snap(from.1 + dy)),
                to: (snap(to.0 + dx), snap(to.1 + dy)),
                width: *width,
            },
        }
    }

    fn shifted(&self, dx: f32, dy: f32) -> Mark {
        self.placed(dx, dy, |v| v)
    }

    /// Top and bottom of the ink box: the full line box for text, the stroke
    /// for rules.
    pub fn vertical_extent(&self) -> (f32, f32) {
        match self {
            Mark::Text { baseline, size, .. } => {
                let top = baseline - (LINE_HEIGHT - 1.0) * size / 2.0 - size * ASCENT;
                (top, top + size * LINE_HEIGHT)
            }
            Mark::Rule { from, to, width } => (from.1.min(to.1) - width / 2.0, from.1.max(to.1) + width / 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Band {
    pub height: f32,
    pub marks: Vec<Mark>,
}

impl Band {
    fn spacer(height: f32) -> Self {
        Self {
            height,
            marks: Vec::new(),
        }
    }

    /// Vertical whitespace; dropped at the top of a page.
    pub fn is_spacer(&self) -> bool {
        self.marks.is_empty()
    }

    fn stacked(bands: Vec<Band>) -> Band {
        let mut out = Band::default();
        for band in bands {
            let dy = out.height;
            out.marks.extend(band.marks.iter().map(|m| m.shifted(0.0, dy)));
            out.height += band.height;
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    bold: bool,
    align: Align,
}

impl TextStyle {
    fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT
    }

    fn baseline(&self) -> f32 {
        (self.line_height() - self.size) / 2.0 + self.size * ASCENT
    }
}

#[derive(Debug, Clone)]
struct Word {
    text: String,
    bold: bool,
}

#[derive(Debug, Clone, Default)]
struct Segment {
    text: String,
    bold: bool,
    x: f32,
    width: f32,
}

#[derive(Debug, Clone, Default)]
struct Line {
    segments: Vec<Segment>,
    width: f32,
}

pub(crate) struct LayoutEngine {
    metrics: Metrics,
}

impl LayoutEngine {
    pub(crate) fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    /// Bands for the content of `root` (the invoice container) at `width` px.
    pub(crate) fn layout(&self, root: &Element, width: f32) -> Result<Vec<Band>, ExportError> {
        let mut bands = Vec::new();
        for child in root.elements() {
            self.flow(child, width, Align::Left, &mut bands)?;
        }
        Ok(bands)
    }

    fn flow(&self, el: &Element, width: f32, align: Align, out: &mut Vec<Band>) -> Result<(), ExportError> {
        let align = if el.has_class(class::SUMMARY) || el.has_class(class::FOOTER) {
            Align::Right
        } else {
            align
        };
        let (above, below) = spacing(el);
        if above > 0.0 {
            out.push(Band::spacer(above));
        }

        if el.tag == Tag::Table {
            out.extend(self.table(el, width)?);
        } else if el.has_class(class::HEADER) || el.has_class(class::PARTIES) {
            out.push(self.columns(el, width, align)?);
        } else if is_inline_only(el) {
            out.push(self.paragraph(el, width, text_style(el, align))?);
        } else {
            for child in el.elements() {
                self.flow(child, width, align, out)?;
            }
        }

        if below > 0.0 {
            out.push(Band::spacer(below));
        }
        Ok(())
    }

    /// Children side by side in equal columns, as one unbreakable band.
    fn columns(&self, el: &Element, width: f32, align: Align) -> Result<Band, ExportError> {
        let children: Vec<&Element> = el.elements().collect();
        let count = children.len().max(1) as f32;
        let column_width = (width - COLUMN_GAP * (count - 1.0)) / count;

        let mut band = Band::default();
        for (idx, child) in children.into_iter().enumerate() {
            let mut bands = Vec::new();
            self.flow(child, column_width, align, &mut bands)?;
            let column = Band::stacked(bands);
            let dx = idx as f32 * (column_width + COLUMN_GAP);
            band.marks.extend(column.marks.iter().map(|m| m.shifted(dx, 0.0)));
            band.height = band.height.max(column.height);
        }

        if el.has_class(class::HEADER) {
            let y = band.height + HEADER_PADDING_BOTTOM + HEAVY_RULE_WIDTH / 2.0;
            band.marks.push(Mark::Rule {
                from: (0.0, y),
                to: (width, y),
                width: HEAVY_RULE_WIDTH,
            });
            band.height += HEADER_PADDING_BOTTOM + HEAVY_RULE_WIDTH;
        }
        Ok(band)
    }

    fn paragraph(&self, el: &Element, width: f32, style: TextStyle) -> Result<Band, ExportError> {
        let words = self.words(el, style.bold)?;
        let lines = self.break_lines(&words, width, style.size);
        let height = lines.len().max(1) as f32 * style.line_height();
        Ok(Band {
            height,
            marks: place_lines(&lines, 0.0, 0.0, width, style),
        })
    }

    fn table(&self, el: &Element, width: f32) -> Result<Vec<Band>, ExportError> {
        let rows = self.table_rows(el)?;
        let column_count = rows
            .iter()
            .map(|r| r.iter().map(|c| c.span).sum::<usize>())
            .max()
            .unwrap_or(0);
        if column_count == 0 {
            return Ok(Vec::new());
        }

        let mut natural = vec![MIN_COLUMN_WIDTH; column_count];
        for row in &rows {
            let mut col = 0;
            for cell in row {
                if cell.span == 1 {
                    let text_width = self.words_width(&cell.words, BASE_FONT_SIZE);
                    natural[col] = natural[col].max(text_width + 2.0 * CELL_PADDING_X);
                }
                col += cell.span;
            }
        }
        let total: f32 = natural.iter().sum();
        let widths: Vec<f32> = natural.iter().map(|w| w * width / total).collect();
        let mut edges = Vec::with_capacity(column_count + 1);
        edges.push(0.0);
        for w in &widths {
            let last = edges.last().copied().unwrap_or(0.0);
            edges.push(last + w);
        }

        let style = TextStyle {
            size: BASE_FONT_SIZE,
            bold: false,
            align: Align::Left,
        };
        let mut bands = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut cells = Vec::with_capacity(row.len());
            let mut col = 0;
            for cell in row {
                let end = (col + cell.span).min(column_count);
                let (left, right) = (edges[col], edges[end]);
                let lines = self.break_lines(&cell.words, right - left - 2.0 * CELL_PADDING_X, style.size);
                cells.push((left, right, lines));
                col = end;
            }

            let line_count = cells.iter().map(|(_, _, l)| l.len().max(1)).max().unwrap_or(1);
            let height = line_count as f32 * style.line_height() + 2.0 * CELL_PADDING_Y;

            let mut band = Band {
                height,
                marks: Vec::new(),
            };
            band.marks.push(rule((0.0, 0.0), (width, 0.0)));
            band.marks.push(rule((0.0, height), (width, height)));
            band.marks.push(rule((0.0, 0.0), (0.0, height)));
            for (left, right, lines) in &cells {
                band.marks.push(rule((*right, 0.0), (*right, height)));
                band.marks.extend(place_lines(
                    lines,
                    left + CELL_PADDING_X,
                    CELL_PADDING_Y,
                    right - left - 2.0 * CELL_PADDING_X,
                    style,
                ));
            }
            bands.push(band);
        }
        Ok(bands)
    }

    fn table_rows(&self, table: &Element) -> Result<Vec<Vec<Cell>>, ExportError> {
        let mut rows = Vec::new();
        for section in table.elements() {
            let trs: Vec<&Element> = if section.tag == Tag::Tr {
                vec![section]
            } else {
                section.elements().filter(|e| e.tag == Tag::Tr).collect()
            };
            for tr in trs {
                let mut cells = Vec::new();
                for cell in tr.elements() {
                    cells.push(Cell {
                        words: self.words(cell, cell.tag == Tag::Th)?,
                        span: cell.colspan.unwrap_or(1).max(1) as usize,
                    });
                }
                rows.push(cells);
            }
        }
        Ok(rows)
    }

    fn words(&self, el: &Element, bold: bool) -> Result<Vec<Word>, ExportError> {
        let mut words = Vec::new();
        self.collect_words(el, bold, &mut words)?;
        Ok(words)
    }

    fn collect_words(&self, el: &Element, bold: bool, out: &mut Vec<Word>) -> Result<(), ExportError> {
        for child in &el.children {
            match child {
                Node::Text(text) => {
                    let prepared = self.metrics.prepare(text)?;
                    out.extend(prepared.split_whitespace().map(|w| Word {
                        text: w.to_string(),
                        bold,
                    }));
                }
                Node::Element(inner) => {
                    self.collect_words(inner, bold || inner.tag == Tag::Strong || inner.tag == Tag::Th, out)?
                }
            }
        }
        Ok(())
    }

    fn words_width(&self, words: &[Word], size: f32) -> f32 {
        let gaps = words.len().saturating_sub(1) as f32 * self.metrics.width(" ", size, false);
        words.iter().map(|w| self.metrics.width(&w.text, size, w.bold)).sum::<f32>() + gaps
    }

    /// Greedy line breaking. Words wider than a full line are split by character.
    fn break_lines(&self, words: &[Word], width: f32, size: f32) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut line = Line::default();

        for word in words {
            for piece in self.split_oversized(word, width, size) {
                let separator = if line.segments.is_empty() { "" } else { " " };
                let candidate = format!("{separator}{}", piece.text);
                let advance = self.metrics.width(&candidate, size, piece.bold);
                if !line.segments.is_empty() && line.width + advance > width {
                    lines.push(std::mem::take(&mut line));
                    let advance = self.metrics.width(&piece.text, size, piece.bold);
                    self.push_piece(&mut line, piece.text, piece.bold, advance);
                } else {
                    self.push_piece(&mut line, candidate, piece.bold, advance);
                }
            }
        }
        if !line.segments.is_empty() {
            lines.push(line);
        }
        lines
    }

    fn push_piece(&self, line: &mut Line, text: String, bold: bool, advance: f32) {
        match line.segments.last_mut() {
            Some(last) if last.bold == bold => {
                last.text.push_str(&text);
                last.width += advance;
            }
            _ => line.segments.push(Segment {
                text,
                bold,
                x: line.width,
                width: advance,
            }),
        }
        line.width += advance;
    }

    fn split_oversized(&self, word: &Word, width: f32, size: f32) -> Vec<Word> {
        if self.metrics.width(&word.text, size, word.bold) <= width {
            return vec![word.clone()];
        }
        let mut pieces = Vec::new();
        let mut current = String::new();
        for ch in word.text.chars() {
            current.push(ch);
            if self.metrics.width(&current, size, word.bold) > width && current.chars().count() > 1 {
                current.pop();
                pieces.push(Word {
                    text: std::mem::take(&mut current),
                    bold: word.bold,
                });
                current.push(ch);
            }
        }
        if !current.is_empty() {
            pieces.push(Word {
                text: current,
                bold: word.bold,
            });
        }
        pieces
    }
}

#[derive(Debug, Clone)]
struct Cell {
    words: Vec<Word>,
    span: usize,
}

fn rule(from: (f32, f32), to: (f32, f32)) -> Mark {
    Mark::Rule {
        from,
        to,
        width: RULE_WIDTH,
    }
}

fn place_lines(lines: &[Line], x: f32, y: f32, width: f32, style: TextStyle) -> Vec<Mark> {
    let mut marks = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let offset = match style.align {
            Align::Left => 0.0,
            Align::Right => (width - line.width).max(0.0),
        };
        let baseline = y + idx as f32 * style.line_height() + style.baseline();
        for seg in &line.segments {
            marks.push(Mark::Text {
                x: x + offset + seg.x,
                baseline,
                size: style.size,
                bold: seg.bold || style.bold,
                text: seg.text.clone(),
            });
        }
    }
    marks
}

fn is_inline_only(el: &Element) -> bool {
    el.children.iter().all(|n| match n {
        Node::Text(_) => true,
        Node::Element(e) => e.tag.is_inline(),
    })
}

fn text_style(el: &Element, align: Align) -> TextStyle {
    let (size, bold) = match el.tag {
        Tag::H2 => (18.0, true),
        Tag::H4 => (13.0, true),
        _ if el.has_class(class::LOGO) => (22.0, true),
        _ if el.has_class(class::TOTAL) => (14.0, false),
        _ => (BASE_FONT_SIZE, false),
    };
    TextStyle { size, bold, align }
}

/// Vertical margins (above, below) in px, mirroring the embedded stylesheet.
fn spacing(el: &Element) -> (f32, f32) {
    match el.tag {
        Tag::P => (2.0, 2.0),
        Tag::H2 | Tag::H4 => (0.0, 6.0),
        Tag::Table => (0.0, 16.0),
        _ if el.has_class(class::HEADER) || el.has_class(class::PARTIES) => (0.0, 16.0),
        _ if el.has_class(class::SUMMARY) => (0.0, 24.0),
        _ if el.has_class(class::FOOTER) => (32.0, 0.0),
        _ => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qikspare_render::document::Element;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(Metrics::Helvetica)
    }

    fn texts(band: &Band) -> Vec<String> {
        band.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { text, .. } => Some(text.clone()),
                Mark::Rule { .. } => None,
            })
            .collect()
    }

    #[test]
    fn labeled_paragraph_keeps_bold_label_separate() {
        let p = Element::new(Tag::P)
            .child(Element::new(Tag::Strong).child("Name:"))
            .child(" Sai Motors");
        let band = engine().paragraph(&p, 500.0, text_style(&p, Align::Left)).unwrap();
        assert_eq!(texts(&band), vec!["Name:", " Sai Motors"]);
        assert!((band.height - BASE_FONT_SIZE * LINE_HEIGHT).abs() < 1e-4);
    }

    #[test]
    fn long_paragraphs_wrap() {
        let p = Element::new(Tag::P).child("lorem ipsum dolor sit amet ".repeat(10));
        let band = engine().paragraph(&p, 120.0, text_style(&p, Align::Left)).unwrap();
        assert!(band.height > 3.0 * BASE_FONT_SIZE * LINE_HEIGHT);
        let widest = band
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { x, text, .. } => Some(x + Metrics::Helvetica.width(text, BASE_FONT_SIZE, false)),
                Mark::Rule { .. } => None,
            })
            .fold(0.0f32, f32::max);
        assert!(widest <= 120.0 + 1e-3);
    }

    #[test]
    fn oversized_words_are_split() {
        let p = Element::new(Tag::P).child("X".repeat(200));
        let band = engine().paragraph(&p, 100.0, text_style(&p, Align::Left)).unwrap();
        assert!(texts(&band).len() > 1);
    }

    #[test]
    fn right_alignment_ends_at_the_column_edge() {
        let p = Element::new(Tag::P).child("Total");
        let style = TextStyle {
            size: BASE_FONT_SIZE,
            bold: false,
            align: Align::Right,
        };
        let band = engine().paragraph(&p, 300.0, style).unwrap();
        match &band.marks[0] {
            Mark::Text { x, text, .. } => {
                let w = Metrics::Helvetica.width(text, BASE_FONT_SIZE, false);
                assert!((x + w - 300.0).abs() < 1e-3);
            }
            Mark::Rule { .. } => panic!("expected text"),
        }
    }

    #[test]
    fn each_table_row_is_its_own_band() {
        let row = |cells: &[&str]| {
            Element::new(Tag::Tr).children(cells.iter().map(|c| Element::new(Tag::Td).child(*c)))
        };
        let table = Element::new(Tag::Table)
            .class(class::TABLE)
            .child(Element::new(Tag::Thead).child(row(&["A", "B"])))
            .child(Element::new(Tag::Tbody).child(row(&["1", "2"])).child(row(&["3", "4"])));
        let bands = engine().table(&table, 400.0).unwrap();
        assert_eq!(bands.len(), 3);
        assert_eq!(texts(&bands[2]), vec!["3", "4"]);
        let rules = bands[0].marks.iter().filter(|m| matches!(m, Mark::Rule { .. })).count();
        assert_eq!(rules, 5);
    }

    #[test]
    fn unsupported_text_fails_layout() {
        let root = Element::new(Tag::Div).child(Element::new(Tag::P).child("✓ done"));
        assert!(matches!(
            engine().layout(&root, 500.0),
            Err(ExportError::UnsupportedContent { character: '✓', .. })
        ));
    }
}
