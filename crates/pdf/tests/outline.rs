use chrono::{TimeZone, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use outline_core::{HeadingLevel, OutlineEntry, OutlineResult, PageSource, DEFAULT_TITLE};
use outline_pdf::{info, outline_at, PdfDocument, PdfError};

const BODY: &str = "the quick brown fox jumps over the lazy dog again and again";

/// One line of text: (text, font size, x, y).
type Line<'a> = (&'a str, i64, i64, i64);

fn text_ops(lines: &[Line]) -> Vec<Operation> {
    lines
        .iter()
        .flat_map(|&(text, size, x, y)| {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), size.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ]
        })
        .collect()
}

fn add_page(doc: &mut Document, parent: ObjectId, resources: ObjectId, lines: &[Line]) -> Object {
    let content = Content {
        operations: text_ops(lines),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    })
    .into()
}

fn build_pdf(pages: &[Vec<Line>], title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|lines| add_page(&mut doc, pages_id, resources_id, lines))
        .collect();
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal("Finance Team"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn report_pdf() -> Vec<u8> {
    build_pdf(
        &[
            vec![
                ("Quarterly Report", 24, 72, 760),
                ("1. Introduction", 16, 72, 720),
                (BODY, 10, 72, 700),
                (BODY, 10, 72, 686),
                (BODY, 10, 72, 672),
            ],
            vec![
                ("Background", 13, 72, 760),
                (BODY, 10, 72, 740),
                (BODY, 10, 72, 726),
                ("2. Results", 16, 72, 700),
                (BODY, 10, 72, 680),
            ],
        ],
        Some("Q3 Report"),
    )
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
}

#[test]
fn outline_of_generated_report() {
    let result = outline_at(&report_pdf(), now());

    assert_eq!(result.title, "Quarterly Report");
    assert_eq!(
        result.outline,
        vec![
            OutlineEntry::new(HeadingLevel::H1, "Quarterly Report", 1),
            OutlineEntry::new(HeadingLevel::H2, "1. Introduction", 1),
            OutlineEntry::new(HeadingLevel::H3, "Background", 2),
            OutlineEntry::new(HeadingLevel::H2, "2. Results", 2),
        ]
    );
    assert!(result.error.is_none());
    assert!(result.timestamp.is_none());
}

#[test]
fn pages_decode_to_positioned_runs() {
    let doc = PdfDocument::from_bytes(&report_pdf()).unwrap();
    assert_eq!(doc.page_count(), 2);

    let page = doc.page(2).unwrap();
    assert_eq!(page.number, 2);
    assert_eq!(page.runs.len(), 5);
    assert_eq!(page.runs[0].text, "Background");
    assert_eq!(page.runs[0].font_size(), 13);
    assert_eq!(page.runs[0].x(), 72.0);
    assert_eq!(page.runs[0].y(), 760.0);
}

#[test]
fn every_page_resolves_from_the_loaded_page_map() {
    let bytes = build_pdf(
        &[
            vec![("Alpha", 12, 72, 700)],
            vec![("Beta", 12, 72, 700)],
            vec![("Gamma", 12, 72, 700)],
        ],
        None,
    );
    let doc = PdfDocument::from_bytes(&bytes).unwrap();

    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.metadata().page_count, 3);
    let texts: Vec<String> = (1..=doc.page_count())
        .map(|n| doc.page(n).unwrap().runs[0].text.clone())
        .collect();
    assert_eq!(texts, vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn missing_page_is_an_error() {
    let doc = PdfDocument::from_bytes(&report_pdf()).unwrap();
    assert!(matches!(doc.page(3), Err(PdfError::Parse(_))));
    assert!(matches!(doc.page(0), Err(PdfError::Parse(_))));
}

#[test]
fn info_reads_document_metadata() {
    let meta = info(&report_pdf()).unwrap();
    assert_eq!(meta.title.as_deref(), Some("Q3 Report"));
    assert_eq!(meta.author.as_deref(), Some("Finance Team"));
    assert_eq!(meta.creator, None);
    assert_eq!(meta.page_count, 2);
}

#[test]
fn info_without_info_dictionary() {
    let bytes = build_pdf(&[vec![]], None);
    let meta = info(&bytes).unwrap();
    assert_eq!(meta.title, None);
    assert_eq!(meta.page_count, 1);
}

#[test]
fn blank_document_yields_no_text_outline() {
    let bytes = build_pdf(&[vec![], vec![]], None);
    let result = outline_at(&bytes, now());

    assert_eq!(result, OutlineResult::no_text());
    assert_eq!(result.title, DEFAULT_TITLE);
}

#[test]
fn body_only_document_yields_fallback_outline() {
    let bytes = build_pdf(&[vec![(BODY, 10, 72, 700), (BODY, 10, 72, 686)]], None);
    let result = outline_at(&bytes, now());

    assert_eq!(result.title, DEFAULT_TITLE);
    assert_eq!(result.outline, outline_core::fallback_outline());
}

#[test]
fn outline_json_shape() {
    let result = outline_at(&report_pdf(), now());
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["title"], "Quarterly Report");
    assert_eq!(json["outline"][0]["level"], "H1");
    assert_eq!(json["outline"][0]["page"], 1);
    assert!(json.get("error").is_none());
}
