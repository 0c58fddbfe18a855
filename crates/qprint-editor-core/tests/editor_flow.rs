//! End-to-end editing sessions against the public API

use pretty_assertions::assert_eq;
use qprint_editor_core::api::{collect_save_items, CorrectionResponse, CorrectionTask, SaveResponse};
use qprint_editor_core::render::load_page;
use qprint_editor_core::tools::{self, KeyChord};
use qprint_editor_core::{
    extract_page, get_page_count, DragController, EditorConfig, EditorStore, LopdfTextSource, Page,
    Placement, RenderTracker, TextItem, TextRun, TextRunSource, Tool, Viewport,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn single_item_store(content: &str) -> EditorStore {
    let mut store = EditorStore::default();
    let viewport = Viewport::new(612.0, 792.0, store.scale());
    let runs = vec![TextRun::new(content, [1.0, 0.0, 0.0, 1.0, 100.0, 700.0], 12.0)];
    store.set_pages(vec![extract_page(1, &viewport, &runs)]);
    store
}

#[test]
fn extraction_scenario() {
    init_tracing();
    let viewport = Viewport::new(612.0, 792.0, 1.5);
    let runs = vec![TextRun::new("Hello", [1.0, 0.0, 0.0, 1.0, 100.0, 700.0], 12.0)];
    let page = extract_page(1, &viewport, &runs);

    let placement = page.texts[0].placement;
    assert_eq!(
        (
            placement.original_x(),
            placement.original_y(),
            placement.original_size(),
            placement.ui_font_size()
        ),
        (100.0, 700.0, 12.0, 18.0)
    );
}

#[test]
fn extraction_is_idempotent_per_page() {
    init_tracing();
    let mut store = EditorStore::default();
    let viewport = Viewport::new(612.0, 792.0, store.scale());
    let runs = vec![TextRun::new("Hello", [1.0, 0.0, 0.0, 1.0, 100.0, 700.0], 12.0)];

    store.insert_extracted_page(extract_page(1, &viewport, &runs));
    store.insert_extracted_page(extract_page(1, &viewport, &runs));
    assert_eq!(store.pages().len(), 1);
}

#[test]
fn replace_all_scenario() {
    init_tracing();
    let mut store = single_item_store("ovr the lazi dog");
    store.replace_all_text("ovr", "over");
    store.replace_all_text("lazi", "lazy");

    let item = &store.pages()[0].texts[0];
    assert_eq!(item.content, "over the lazy dog");
    assert!(item.modified);
}

#[test]
fn drag_scenario() {
    init_tracing();
    let mut store = EditorStore::new(EditorConfig {
        scale: 2.0,
        ..EditorConfig::default()
    });
    let viewport = Viewport::new(612.0, 792.0, 2.0);
    let mut page = Page::new(1, 612.0, 792.0);
    page.texts.push(TextItem::extracted(
        "1_0",
        "drag",
        Placement::from_ui_top_left(&viewport, 50.0, 50.0, 10.0),
    ));
    store.set_pages(vec![page]);

    let mut drag = DragController::new();
    assert!(drag.pointer_down(&mut store, 0, "1_0", 400.0, 400.0));
    drag.pointer_move(&mut store, 410.0, 395.0);
    drag.pointer_up();

    let placement = store.pages()[0].texts[0].placement;
    assert_eq!((placement.ui_x(), placement.ui_y()), (60.0, 45.0));
    assert_eq!(
        (placement.original_x(), placement.original_y()),
        qprint_editor_core::coords::to_pdf(60.0, 45.0 + 20.0, 2.0, 792.0)
    );
}

#[test]
fn capture_undo_scenario() {
    init_tracing();
    let mut store = EditorStore::default();
    store.capture();
    assert_eq!(store.history().past_len(), 0);

    let mut store = single_item_store("draft");
    store.capture();
    store.update_text(0, "1_0", "final");
    store.undo();
    assert_eq!(store.pages()[0].texts[0].content, "draft");
}

#[test]
fn full_editing_session_from_generated_pdf() {
    init_tracing();
    let pdf = sample_pdf();
    assert_eq!(get_page_count(&pdf).unwrap(), 2);

    let source = LopdfTextSource::from_bytes(&pdf).unwrap();
    let mut store = EditorStore::default();
    let mut tracker = RenderTracker::new();
    for page_number in 1..=source.page_count() {
        assert!(load_page(&mut store, &mut tracker, &source, page_number).unwrap());
    }
    assert_eq!(store.pages().len(), 2);
    assert_eq!(store.pages()[1].texts[0].content, "Page 2");

    // fix a typo, restyle, and add a note
    assert!(tools::commit_content(&mut store, 0, "1_0", "Page one"));
    tools::focus_text(&mut store, 0, "1_0");
    tools::toggle_bold(&mut store);
    store.set_active_tool(Tool::AddText);
    let note = tools::place_text(&mut store, 1, 90.0, 120.0).unwrap();
    tools::commit_content(&mut store, 1, &note, "Please print double-sided");

    let items = collect_save_items(store.pages());
    let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["Page one", "Please print double-sided"]);
    assert_eq!(items[0].font_family, "Helvetica-Bold");
    assert!(items[1].is_new);
    assert_eq!(items[1].page_num, 2);

    // undo the note text, then redo it with the keyboard
    tools::handle_shortcut(&mut store, &KeyChord::new("z").ctrl());
    assert_eq!(store.text(1, &note).unwrap().content, "New Text");
    tools::handle_shortcut(&mut store, &KeyChord::new("z").ctrl().shift());
    assert_eq!(store.text(1, &note).unwrap().content, "Please print double-sided");

    let (ticket, request) = store.begin_save().unwrap();
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["updatedTextItems"].as_array().map(Vec::len), Some(2));
    assert!(store.finish_save(ticket, Ok(SaveResponse { success: true })).unwrap());
    assert!(!store.is_dirty());
}

#[test]
fn correction_round_trip_through_json() {
    init_tracing();
    let mut store = single_item_store("teh essay");
    let (ticket, request) = store.begin_correction(CorrectionTask::SpellFix).unwrap();

    // the service echoes the pages back with corrected content
    let mut json = serde_json::to_value(&request).unwrap();
    json["pages"][0]["texts"][0]["content"] = "the essay".into();
    json["pages"][0]["texts"][0]["modified"] = true.into();
    let response: CorrectionResponse = serde_json::from_value(json).unwrap();

    assert!(store.finish_correction(ticket, Ok(response)).unwrap());
    assert_eq!(store.pages()[0].texts[0].content, "the essay");
    assert_eq!(collect_save_items(store.pages()).len(), 1);
}

#[test]
fn scale_change_keeps_pdf_positions() {
    init_tracing();
    let mut store = single_item_store("zoom");
    let before = store.pages()[0].texts[0].placement;
    store.set_scale(3.0).unwrap();
    let after = store.pages()[0].texts[0].placement;

    assert_eq!(
        (after.original_x(), after.original_y()),
        (before.original_x(), before.original_y())
    );
    assert_eq!(after.ui_font_size(), 36.0);
    assert_eq!(after.ui_x(), 300.0);
}

fn sample_pdf() -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for i in 1..=2 {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i).into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
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
