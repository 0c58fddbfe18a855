//! Native text-run source backed by lopdf
//!
//! Walks each page's content stream tracking the text and graphics state
//! well enough to place every shown string: `BT`/`ET`, `Tf`, `Tm`, `Td`,
//! `TD`, `T*`, `TL`, `Tc`, `Tw`, `Tz`, `Ts`, `Tj`, `TJ`, `'`, `"`, `cm`, `q`, `Q`.
//!
//! Glyph widths are not read from font programs. After a string is shown
//! the text matrix advances by half an em per character, which is enough to
//! keep consecutive runs in order; runs that reposition explicitly (the common
//! case) land exactly.

use crate::error::EditorError;
use crate::extraction::{PageTextContent, TextRun};
use crate::render::TextRunSource;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// US Letter, used when no MediaBox is found
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Parent links followed when looking for an inherited MediaBox
const MAX_INHERITANCE_DEPTH: usize = 32;

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

pub struct LopdfTextSource {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfTextSource {
    pub fn from_bytes(data: &[u8]) -> Result<Self, EditorError> {
        let doc = Document::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Unscaled size of a page in PDF points
    pub fn page_size(&self, page_number: u32) -> Option<(f64, f64)> {
        let page_id = self.pages.get(&page_number)?;
        let [_, _, width, height] = media_box(&self.doc, *page_id);
        Some((width, height))
    }

    /// Sizes of every page in order
    pub fn page_sizes(&self) -> Vec<Option<(f64, f64)>> {
        (1..=self.page_count()).map(|n| self.page_size(n)).collect()
    }
}

impl TextRunSource for LopdfTextSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_content(&self, page_number: u32) -> Result<PageTextContent, EditorError> {
        let page_id = *self
            .pages
            .get(&page_number)
            .ok_or(EditorError::PageNotFound(page_number))?;

        let bytes = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| EditorError::Render {
                page: page_number,
                message: e.to_string(),
            })?;
        let content = Content::decode(&bytes).map_err(|e| EditorError::Render {
            page: page_number,
            message: e.to_string(),
        })?;

        let runs = interpret(&content.operations);
        debug!(page = page_number, runs = runs.len(), "Extracted text runs");

        Ok(PageTextContent {
            page_number,
            media_box: media_box(&self.doc, page_id),
            runs,
        })
    }
}

/// Page box as `[x, y, width, height]`, inherited from ancestors if needed
fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let mut current = Some(page_id);
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let Some(id) = current else { break };
        let Some(dict) = doc.get_object(id).ok().and_then(|o| o.as_dict().ok()) else {
            break;
        };
        if let Some(rect) = box_entry(doc, dict) {
            return rect;
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    DEFAULT_MEDIA_BOX
}

fn box_entry(doc: &Document, dict: &Dictionary) -> Option<[f64; 4]> {
    let entry = dict.get(b"MediaBox").ok()?;
    let array = match entry {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        other => other.as_array().ok()?,
    };
    if array.len() != 4 {
        warn!(len = array.len(), "Ignoring malformed MediaBox");
        return None;
    }
    let x1 = number(&array[0])?;
    let y1 = number(&array[1])?;
    let x2 = number(&array[2])?;
    let y2 = number(&array[3])?;
    Some([x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs()])
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(n) => Some(*n as f64),
        Object::Real(n) => Some(*n as f64),
        _ => None,
    }
}

/// Parameters saved and restored by `q`/`Q`
#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    font_size: f64,
    leading: f64,
    rise: f64,
    horizontal_scale: f64,
    char_spacing: f64,
    word_spacing: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            font_size: 0.0,
            leading: 0.0,
            rise: 0.0,
            horizontal_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
        }
    }
}

#[derive(Debug, Default)]
struct Interpreter {
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    runs: Vec<TextRun>,
}

fn interpret(operations: &[Operation]) -> Vec<TextRun> {
    let mut interpreter = Interpreter {
        text_matrix: IDENTITY,
        line_matrix: IDENTITY,
        ..Interpreter::default()
    };
    for op in operations {
        interpreter.apply(op);
    }
    interpreter.runs
}

impl Interpreter {
    fn apply(&mut self, op: &Operation) {
        let nums: Vec<f64> = op.operands.iter().filter_map(number).collect();
        match (op.operator.as_str(), nums.as_slice()) {
            ("q", _) => self.saved.push(self.state),
            ("Q", _) => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            ("cm", &[a, b, c, d, e, f]) => {
                self.state.ctm = multiply(&[a, b, c, d, e, f], &self.state.ctm);
            }
            ("BT", _) => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            ("Tf", &[size]) => self.state.font_size = size,
            ("TL", &[leading]) => self.state.leading = leading,
            ("Tc", &[spacing]) => self.state.char_spacing = spacing,
            ("Tw", &[spacing]) => self.state.word_spacing = spacing,
            ("Tz", &[percent]) => self.state.horizontal_scale = percent / 100.0,
            ("Ts", &[rise]) => self.state.rise = rise,
            ("Tm", &[a, b, c, d, e, f]) => {
                self.line_matrix = [a, b, c, d, e, f];
                self.text_matrix = self.line_matrix;
            }
            ("Td", &[tx, ty]) => self.move_line(tx, ty),
            ("TD", &[tx, ty]) => {
                self.state.leading = -ty;
                self.move_line(tx, ty);
            }
            ("T*", _) => self.next_line(),
            ("Tj", _) => self.show_operands(&op.operands),
            ("TJ", _) => self.show_operands(&op.operands),
            ("'", _) => {
                self.next_line();
                self.show_operands(&op.operands);
            }
            ("\"", _) => {
                if let [word_spacing, char_spacing, ..] = nums.as_slice() {
                    self.state.word_spacing = *word_spacing;
                    self.state.char_spacing = *char_spacing;
                }
                self.next_line();
                self.show_operands(&op.operands[op.operands.len().saturating_sub(1)..]);
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.leading;
        self.move_line(0.0, -leading);
    }

    /// Show every string operand as one run; TJ kerning wider than a tenth
    /// of an em becomes a space
    fn show_operands(&mut self, operands: &[Object]) {
        let mut text = String::new();
        let mut adjustment = 0.0;
        for operand in operands {
            match operand {
                Object::String(bytes, _) => text.push_str(&decode_text(bytes)),
                Object::Array(items) => {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => text.push_str(&decode_text(bytes)),
                            other => {
                                if let Some(n) = number(other) {
                                    adjustment += n;
                                    if n < -100.0 {
                                        text.push(' ');
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        self.show(&text, adjustment);
    }

    fn show(&mut self, text: &str, adjustment: f64) {
        if text.is_empty() {
            return;
        }
        let state = &self.state;
        let size = state.font_size;
        let params = [size * state.horizontal_scale, 0.0, 0.0, size, 0.0, state.rise];
        let rendering = multiply(&params, &multiply(&self.text_matrix, &state.ctm));
        let height = rendering[2].hypot(rendering[3]);

        let chars = text.chars().count() as f64;
        let spaces = text.chars().filter(|c| *c == ' ').count() as f64;
        let advance = (chars * (0.5 * size + state.char_spacing)
            + spaces * state.word_spacing
            - adjustment / 1000.0 * size)
            * state.horizontal_scale;

        self.runs.push(TextRun::new(text, rendering, height));
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, advance, 0.0], &self.text_matrix);
    }
}

/// `m × n` for PDF row-vector matrices
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

/// Decode a PDF string: UTF-16BE with BOM, then UTF-8, then Latin-1
fn decode_text(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream, StringFormat};

    fn literal(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    /// One PDF whose pages each get the given operations; the MediaBox sits
    /// on the Pages node so pages inherit it
    fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn hello_page() -> Vec<Operation> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            op("Td", vec![100.into(), 700.into()]),
            op("Tj", vec![literal("Hello")]),
            op("ET", vec![]),
        ]
    }

    #[test]
    fn test_runs_from_generated_pdf() {
        let source = LopdfTextSource::from_bytes(&build_pdf(vec![hello_page()])).unwrap();
        assert_eq!(source.page_count(), 1);

        let content = source.page_content(1).unwrap();
        assert_eq!(content.media_box, [0.0, 0.0, 595.0, 842.0]);
        assert_eq!(content.runs.len(), 1);
        let run = &content.runs[0];
        assert_eq!(run.text, "Hello");
        assert_eq!(run.anchor(), (100.0, 700.0));
        assert_eq!(run.height, 12.0);
    }

    #[test]
    fn test_missing_page() {
        let source = LopdfTextSource::from_bytes(&build_pdf(vec![hello_page()])).unwrap();
        assert_eq!(source.page_content(2), Err(EditorError::PageNotFound(2)));
        assert_eq!(source.page_size(1), Some((595.0, 842.0)));
        assert_eq!(source.page_sizes(), vec![Some((595.0, 842.0))]);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            LopdfTextSource::from_bytes(b"not a pdf"),
            Err(EditorError::Parse(_))
        ));
    }

    #[test]
    fn test_line_operators() {
        let runs = interpret(&[
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 500.into()]),
            op("Tj", vec![literal("first")]),
            op("TD", vec![0.into(), (-14).into()]),
            op("Tj", vec![literal("second")]),
            op("T*", vec![]),
            op("'", vec![literal("fourth")]),
            op("ET", vec![]),
        ]);
        let anchors: Vec<(f64, f64)> = runs.iter().map(TextRun::anchor).collect();
        assert_eq!(anchors, vec![(72.0, 500.0), (72.0, 486.0), (72.0, 458.0)]);
        assert_eq!(runs[2].text, "fourth");
    }

    #[test]
    fn test_ctm_scales_text() {
        let runs = interpret(&[
            op("q", vec![]),
            op("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 10.into(), 20.into()]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 6.into()]),
            op("Td", vec![5.into(), 5.into()]),
            op("Tj", vec![literal("big")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 6.into()]),
            op("Tj", vec![literal("small")]),
            op("ET", vec![]),
        ]);
        assert_eq!(runs[0].anchor(), (20.0, 30.0));
        assert_eq!(runs[0].height, 12.0);
        assert_eq!(runs[1].anchor(), (0.0, 0.0));
        assert_eq!(runs[1].height, 6.0);
    }

    #[test]
    fn test_tj_array_kerning_becomes_space() {
        let runs = interpret(&[
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![literal("Hello"), (-250).into(), literal("world")])],
            ),
            op("ET", vec![]),
        ]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello world");
    }

    #[test]
    fn test_consecutive_shows_advance() {
        let runs = interpret(&[
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Tj", vec![literal("ab")]),
            op("Tj", vec![literal("cd")]),
            op("ET", vec![]),
        ]);
        assert_eq!(runs[1].anchor(), (10.0, 0.0));
    }

    #[test]
    fn test_decode_text_encodings() {
        assert_eq!(decode_text(b"plain"), "plain");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
        assert_eq!(decode_text(&[0x43, 0x61, 0x66, 0xE9]), "Caf\u{e9}");
    }

    #[test]
    fn test_reversed_media_box_is_normalized() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![612.into(), 792.into(), 0.into(), 0.into()],
        });
        assert_eq!(media_box(&doc, page_id), [0.0, 0.0, 612.0, 792.0]);

        let bare = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(media_box(&doc, bare), DEFAULT_MEDIA_BOX);
    }
}
