//! Text extraction from PDF content streams.
//!
//! Walks a page's content-stream operators with a small text-state machine
//! and emits one [`TextSpan`] per text-showing operation, carrying the full
//! rendering matrix so callers can derive font size and position the way a
//! viewer would.
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  outline_core::PageLayout
//!   (per page)      extract_page_spans   page_layout
//! ```

use log::warn;
use outline_core::{PageLayout, TextRun};

use super::backend::{
    decode_font_text, get_number_from_value, BackendFontInfo, PageId, PdfBackend, PdfValue,
};
use crate::PdfError;

/// A single run of text with its rendering matrix.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    /// Text rendering matrix `[a, b, c, d, e, f]`: text space scaled by font
    /// size and horizontal scaling, then by the text matrix and the CTM.
    pub transform: [f32; 6],
}

impl TextSpan {
    pub fn x(&self) -> f32 {
        self.transform[4]
    }

    pub fn y(&self) -> f32 {
        self.transform[5]
    }

    /// Rendered glyph height: the length of the matrix's vertical axis.
    pub fn height(&self) -> f32 {
        self.transform[2].hypot(self.transform[3])
    }
}

/// Approximate glyph advance as a fraction of font size. Without font
/// metrics this only needs to keep successive runs apart.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// A `TJ` adjustment wider than this fraction of a character starts a new word.
const TJ_WORD_GAP_RATIO: f32 = 0.3;

/// The identity matrix `[a, b, c, d, e, f]`.
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m1 x m2` in PDF's row-vector convention.
fn multiply(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// State tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font as resolved from the page resources by `Tf`. `None`
    /// when the key is not in the resource dictionary.
    font: Option<BackendFontInfo>,
    font_size: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    /// Current transformation matrix.
    ctm: [f32; 6],
    /// Saved CTMs for `q` / `Q`.
    ctm_stack: Vec<[f32; 6]>,
    /// Horizontal scaling (percent / 100).
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            ctm: IDENTITY_MATRIX,
            ctm_stack: Vec::new(),
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Rendering matrix for a glyph drawn at the current text position.
    fn rendering_matrix(&self) -> [f32; 6] {
        let params = [
            self.font_size * self.horiz_scale,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.text_rise,
        ];
        multiply(&multiply(&params, &self.text_matrix), &self.ctm)
    }

    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Translate the line matrix (`Td`) and restart the text matrix there.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn char_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    /// Move past `text` after it has been shown.
    fn advance_after_show(&mut self, text: &str) {
        let mut dx = 0.0;
        for ch in text.chars() {
            dx += self.char_width() + self.char_spacing;
            if ch == ' ' {
                dx += self.word_spacing;
            }
        }
        self.advance_x(dx);
    }
}

fn decode_string(val: &PdfValue, font: Option<&BackendFontInfo>) -> String {
    match val {
        PdfValue::Str(bytes) => decode_font_text(font, bytes),
        _ => String::new(),
    }
}

fn numbers(operands: &[PdfValue]) -> Vec<f32> {
    operands.iter().filter_map(get_number_from_value).collect()
}

fn first_number(operands: &[PdfValue]) -> Option<f32> {
    operands.first().and_then(get_number_from_value)
}

fn matrix_operands(operands: &[PdfValue]) -> Option<[f32; 6]> {
    let vals = numbers(operands);
    (operands.len() == 6 && vals.len() == 6)
        .then(|| [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]])
}

/// Walk one page's content stream and collect its text spans.
///
/// Handles `q Q cm` for the CTM and the text operators `BT ET Tf Tm Td TD
/// T* TL Tc Tw Tz Ts Tj TJ ' "`. Everything else is ignored.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_else(|err| {
        warn!("page {page_id:?}: cannot read fonts, decoding text without encodings: {err}");
        Vec::new()
    });

    let mut state = TextState::default();
    let mut spans: Vec<TextSpan> = Vec::new();

    for op in &ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => state.ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.ctm_stack.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }

            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            // Font state survives ET; later text objects may rely on it.
            "ET" => {}

            "Tf" => handle_tf(operands, &fonts, &mut state),
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
            }
            "Td" | "TD" => {
                if let [tx, ty] = numbers(operands)[..] {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some(v) = first_number(operands) {
                    state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = first_number(operands) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = first_number(operands) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = first_number(operands) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = first_number(operands) {
                    state.text_rise = v;
                }
            }

            "Tj" => {
                if let Some(first) = operands.first() {
                    show_string(first, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    show_array(arr, &mut state, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(first) = operands.first() {
                    show_string(first, &mut state, &mut spans);
                }
            }
            "\"" => {
                if let [aw, ac, text] = operands {
                    if let Some(aw) = get_number_from_value(aw) {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = get_number_from_value(ac) {
                        state.char_spacing = ac;
                    }
                    state.next_line();
                    show_string(text, &mut state, &mut spans);
                }
            }

            _ => {}
        }
    }

    Ok(spans)
}

fn handle_tf(operands: &[PdfValue], fonts: &[BackendFontInfo], state: &mut TextState) {
    let [key, size, ..] = operands else {
        return;
    };
    let key = match key {
        PdfValue::Name(n) | PdfValue::Str(n) => n.clone(),
        _ => return,
    };

    state.font = fonts.iter().find(|info| info.name == key).cloned();
    state.font_size = get_number_from_value(size).unwrap_or(0.0);
}

fn show_string(operand: &PdfValue, state: &mut TextState, spans: &mut Vec<TextSpan>) {
    let text = decode_string(operand, state.font.as_ref());
    if text.is_empty() {
        return;
    }
    spans.push(TextSpan {
        text: text.clone(),
        transform: state.rendering_matrix(),
    });
    state.advance_after_show(&text);
}

/// `TJ` arrays mix strings with kerning adjustments in thousandths of a text
/// unit. The whole array becomes one span; adjustments wide enough to look
/// like a word gap become a space.
fn show_array(arr: &[PdfValue], state: &mut TextState, spans: &mut Vec<TextSpan>) {
    let mut buf = String::new();
    let mut start: Option<[f32; 6]> = None;

    for elem in arr {
        match elem {
            PdfValue::Str(_) => {
                let fragment = decode_string(elem, state.font.as_ref());
                if start.is_none() {
                    start = Some(state.rendering_matrix());
                }
                buf.push_str(&fragment);
                state.advance_after_show(&fragment);
            }
            val => {
                if let Some(adj) = get_number_from_value(val) {
                    let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                    if dx > state.char_width() * TJ_WORD_GAP_RATIO && !buf.is_empty() {
                        buf.push(' ');
                    }
                    state.advance_x(dx);
                }
            }
        }
    }

    let text = buf.trim_end();
    if let (false, Some(transform)) = (text.is_empty(), start) {
        spans.push(TextSpan {
            text: text.to_string(),
            transform,
        });
    }
}

/// Convert one page's spans into the layout record the outline core reads.
pub fn page_layout(number: usize, spans: Vec<TextSpan>) -> PageLayout {
    let runs = spans
        .into_iter()
        .map(|span| {
            let height = span.height();
            TextRun {
                text: span.text,
                transform: span.transform.map(f64::from),
                height: f64::from(height),
            }
        })
        .collect();
    PageLayout::new(number, runs)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::backend::ContentOp;
    use super::*;

    /// Serves pre-decoded operations for every page. `fonts: None` makes the
    /// font lookup fail.
    struct MockBackend {
        fonts: Option<Vec<BackendFontInfo>>,
        ops: Vec<ContentOp>,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn page_fonts(&self, _page_id: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
            self.fonts
                .clone()
                .ok_or_else(|| PdfError::Parse("broken resources".to_string()))
        }

        fn page_content(&self, _page_id: PageId) -> Result<Vec<u8>, PdfError> {
            Ok(vec![])
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.ops.clone())
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn reals(vals: &[f32]) -> Vec<PdfValue> {
        vals.iter().map(|&v| PdfValue::Real(v)).collect()
    }

    fn tf(size: f32) -> ContentOp {
        op(
            "Tf",
            vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Real(size)],
        )
    }

    fn tj(text: &str) -> ContentOp {
        op("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())])
    }

    fn page_fonts() -> Vec<BackendFontInfo> {
        vec![
            BackendFontInfo {
                name: b"F1".to_vec(),
                encoding: Some("WinAnsiEncoding".to_string()),
            },
            BackendFontInfo {
                name: b"F2".to_vec(),
                encoding: Some("Identity-H".to_string()),
            },
        ]
    }

    fn spans_for(ops: Vec<ContentOp>) -> Vec<TextSpan> {
        let backend = MockBackend {
            fonts: Some(page_fonts()),
            ops,
        };
        extract_page_spans(&backend, (1, 0)).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_multiply_identity() {
        let m = [2.0, 0.0, 0.0, 3.0, 10.0, 20.0];
        assert_eq!(multiply(&m, &IDENTITY_MATRIX), m);
        assert_eq!(multiply(&IDENTITY_MATRIX, &m), m);
    }

    #[test]
    fn test_simple_tj_position_and_size() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(12.0),
            op("Tm", reals(&[1.0, 0.0, 0.0, 1.0, 72.0, 700.0])),
            tj("Hello World"),
            op("ET", vec![]),
        ]);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello World");
        assert!(approx(spans[0].x(), 72.0));
        assert!(approx(spans[0].y(), 700.0));
        assert!(approx(spans[0].transform[0], 12.0));
        assert!(approx(spans[0].height(), 12.0));
    }

    #[test]
    fn test_font_size_from_text_matrix_scale() {
        // 1pt font scaled up by the text matrix, as many generators emit.
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(1.0),
            op("Tm", reals(&[18.0, 0.0, 0.0, 18.0, 72.0, 650.0])),
            tj("Scaled"),
        ]);
        assert!(approx(spans[0].transform[0], 18.0));
        assert!(approx(spans[0].height(), 18.0));
    }

    #[test]
    fn test_ctm_scales_and_restores() {
        let spans = spans_for(vec![
            op("q", vec![]),
            op("cm", reals(&[2.0, 0.0, 0.0, 2.0, 0.0, 0.0])),
            op("BT", vec![]),
            tf(10.0),
            op("Td", reals(&[10.0, 100.0])),
            tj("Doubled"),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            tf(10.0),
            op("Td", reals(&[10.0, 100.0])),
            tj("Plain"),
            op("ET", vec![]),
        ]);

        assert!(approx(spans[0].transform[0], 20.0));
        assert!(approx(spans[0].x(), 20.0));
        assert!(approx(spans[0].y(), 200.0));
        assert!(approx(spans[1].transform[0], 10.0));
        assert!(approx(spans[1].y(), 100.0));
    }

    #[test]
    fn test_td_and_leading_operators() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(12.0),
            op("Td", reals(&[72.0, 700.0])),
            tj("First"),
            op("TD", reals(&[0.0, -14.0])),
            tj("Second"),
            op("T*", vec![]),
            tj("Third"),
            op("TL", reals(&[20.0])),
            op("'", vec![PdfValue::Str(b"Fourth".to_vec())]),
        ]);

        let ys: Vec<f32> = spans.iter().map(|s| s.y()).collect();
        assert!(approx(ys[0], 700.0));
        assert!(approx(ys[1], 686.0));
        assert!(approx(ys[2], 672.0));
        assert!(approx(ys[3], 652.0));
        assert!(spans.iter().all(|s| approx(s.x(), 72.0)));
    }

    #[test]
    fn test_double_quote_sets_spacing_and_shows() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(10.0),
            op("TL", reals(&[12.0])),
            op("Td", reals(&[50.0, 500.0])),
            op(
                "\"",
                vec![
                    PdfValue::Real(1.0),
                    PdfValue::Real(0.5),
                    PdfValue::Str(b"Quoted".to_vec()),
                ],
            ),
        ]);
        assert_eq!(spans[0].text, "Quoted");
        assert!(approx(spans[0].y(), 488.0));
    }

    #[test]
    fn test_tj_array_joins_fragments_with_word_gaps() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(12.0),
            op("Td", reals(&[72.0, 600.0])),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"Exec".to_vec()),
                    PdfValue::Integer(-20),
                    PdfValue::Str(b"utive".to_vec()),
                    PdfValue::Integer(-400),
                    PdfValue::Str(b"Summary".to_vec()),
                ])],
            ),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Executive Summary");
        assert!(approx(spans[0].x(), 72.0));
    }

    #[test]
    fn test_text_rise_shifts_baseline() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(10.0),
            op("Ts", reals(&[3.0])),
            op("Td", reals(&[0.0, 100.0])),
            tj("Raised"),
        ]);
        assert!(approx(spans[0].y(), 103.0));
    }

    #[test]
    fn test_horizontal_scaling_affects_horizontal_axis_only() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(10.0),
            op("Tz", reals(&[50.0])),
            tj("Narrow"),
        ]);
        assert!(approx(spans[0].transform[0], 5.0));
        assert!(approx(spans[0].height(), 10.0));
    }

    #[test]
    fn test_unknown_font_key_decodes_plainly() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![PdfValue::Name(b"F9".to_vec()), PdfValue::Integer(11)],
            ),
            tj("Orphan"),
        ]);
        assert_eq!(spans[0].text, "Orphan");
        assert!(approx(spans[0].transform[0], 11.0));
    }

    #[test]
    fn test_resolved_font_encoding_drives_decoding() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![PdfValue::Name(b"F2".to_vec()), PdfValue::Integer(12)],
            ),
            op("Tj", vec![PdfValue::Str(vec![0x00, 0x48, 0x00, 0x69])]),
            tf(12.0),
            op("Tj", vec![PdfValue::Str(vec![0x00, 0x48, 0x00, 0x69])]),
        ]);

        assert_eq!(spans[0].text, "Hi");
        assert_eq!(spans[1].text, "\0H\0i");
    }

    #[test]
    fn test_font_lookup_failure_still_extracts_text() {
        let backend = MockBackend {
            fonts: None,
            ops: vec![op("BT", vec![]), tf(12.0), tj("Still here")],
        };
        let spans = extract_page_spans(&backend, (1, 0)).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Still here");
    }

    #[test]
    fn test_empty_strings_skipped() {
        let spans = spans_for(vec![op("BT", vec![]), tf(12.0), tj("")]);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_page_layout_conversion() {
        let spans = spans_for(vec![
            op("BT", vec![]),
            tf(14.0),
            op("Td", reals(&[72.0, 720.0])),
            tj("Overview"),
        ]);
        let layout = page_layout(4, spans);

        assert_eq!(layout.number, 4);
        assert_eq!(layout.runs.len(), 1);
        assert_eq!(layout.runs[0].text, "Overview");
        assert_eq!(layout.runs[0].font_size(), 14);
        assert_eq!(layout.runs[0].x(), 72.0);
        assert_eq!(layout.runs[0].y(), 720.0);
    }
}
