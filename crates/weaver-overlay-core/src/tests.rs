//! Scenario tests driving the overlay over an in-memory document.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::actions::{EventOutcome, Key, KeyCombo, KeydownResult, PointerEvent};
use crate::config::OverlayConfig;
use crate::host::{DocumentHost, NodeId};
use crate::memory::{ListenerLog, MemoryDocument, RecordingListeners};
use crate::overlay::Overlay;
use crate::protocol::{ImageKind, OutboundMessage};
use crate::surrogate::seed_text;
use crate::types::{Mode, ModeFamily, SelectionKind};

type TestOverlay = Overlay<MemoryDocument, RecordingListeners>;

fn overlay_with(config: OverlayConfig) -> (TestOverlay, Rc<RefCell<ListenerLog>>) {
    let listeners = RecordingListeners::new();
    let log = listeners.log();
    let mut overlay = Overlay::new(MemoryDocument::new(), listeners, config);
    overlay.drain_outbound();
    (overlay, log)
}

fn overlay() -> (TestOverlay, Rc<RefCell<ListenerLog>>) {
    overlay_with(OverlayConfig::default())
}

fn paragraph(overlay: &mut TestOverlay, attrs: &[(&str, &str)], text: &str) -> NodeId {
    let body = overlay.doc().body().unwrap();
    let p = overlay.doc_mut().append_element(body, "p", attrs);
    overlay.doc_mut().append_text(p, text);
    p
}

fn types(messages: &[OutboundMessage]) -> Vec<String> {
    messages
        .iter()
        .map(|m| m.to_json().unwrap()["type"].as_str().unwrap().to_string())
        .collect()
}

/// Edit mode on, `node` clicked, surrogate enabled. Returns the surrogate.
fn start_editing(overlay: &mut TestOverlay, node: NodeId) -> NodeId {
    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(node));
    overlay.handle_message(json!({ "type": "ENABLE_TEXT_EDITOR" }));
    overlay.drain_outbound();
    overlay.state().session().unwrap().surrogate
}

#[test]
fn test_ready_emitted_on_creation() {
    let mut overlay = Overlay::new(
        MemoryDocument::new(),
        RecordingListeners::new(),
        OverlayConfig::default(),
    );
    assert_eq!(overlay.drain_outbound(), vec![OutboundMessage::EditorToolsReady]);
    assert!(overlay.drain_outbound().is_empty());
}

#[test]
fn test_unchanged_round_trip_is_byte_identical() {
    let (mut overlay, _) = overlay();
    let p = paragraph(
        &mut overlay,
        &[("id", "intro"), ("class", "lead"), ("data-x", "1")],
        "Hello",
    );
    let before = overlay.doc().outer_html(p);

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    let outcome = overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    assert_eq!(outcome, EventOutcome::CAPTURED);
    assert_eq!(types(&overlay.drain_outbound()), ["OPEN_TEXT_EDITOR"]);
    assert_eq!(overlay.doc().attribute(p, "id").as_deref(), Some("edited-element"));

    overlay.handle_message(json!({ "type": "ENABLE_TEXT_EDITOR" }));
    let surrogate = overlay.state().session().unwrap().surrogate;
    assert_eq!(overlay.doc().tag_name(surrogate).as_deref(), Some("textarea"));
    assert_eq!(overlay.doc().input_value(surrogate).as_deref(), Some("Hello"));

    let result = overlay.handle_keydown(&KeyCombo::new(Key::Enter));
    assert_eq!(result, KeydownResult::Handled);
    assert_eq!(types(&overlay.drain_outbound()), ["TEXT_EDITOR_CLOSE"]);

    let rebuilt = overlay.state().selected_node().unwrap();
    assert_ne!(rebuilt, surrogate);
    assert!(overlay.doc().has_class(rebuilt, "editor-highlight"));

    overlay.handle_message(json!({ "type": "DESELECT_ELEMENT" }));
    assert_eq!(overlay.doc().outer_html(rebuilt), before);
    assert_eq!(overlay.doc().element_by_id("intro"), Some(rebuilt));
    assert!(overlay.state().selected().is_none());
}

#[test]
fn test_commit_is_idempotent() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);
    let body = overlay.doc().body().unwrap();

    let first = overlay.commit();
    assert!(first.is_some());
    let children = overlay.doc().children(body);
    assert_eq!(children, vec![first.unwrap()]);

    assert_eq!(overlay.commit(), None);
    assert_eq!(overlay.doc().children(body), children);
    assert!(overlay.state().original_descriptor().is_none());
}

#[test]
fn test_multiline_round_trip() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    let surrogate = start_editing(&mut overlay, p);

    overlay.doc_mut().set_input_value(surrogate, "Hello\nWorld");
    overlay.handle_input(surrogate);
    assert_eq!(
        overlay.drain_outbound(),
        vec![OutboundMessage::TextEditorTextChange {
            value: "Hello\nWorld".into()
        }]
    );
    assert_eq!(
        overlay.doc().inline_style(surrogate, "height").as_deref(),
        Some("40px")
    );

    let rebuilt = overlay.commit().unwrap();
    assert_eq!(overlay.doc().inner_html(rebuilt), "Hello<br>World");
    assert_eq!(seed_text(overlay.doc(), rebuilt), "Hello\nWorld");
}

#[test]
fn test_literal_markup_stays_text() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);

    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_GENERATE_TEXT",
        "content": "<b>bold</b>",
    }));
    let rebuilt = overlay.commit().unwrap();

    assert!(overlay.doc().element_children(rebuilt).is_empty());
    assert_eq!(overlay.doc().text_content(rebuilt), "<b>bold</b>");
    assert_eq!(
        overlay.doc().inner_html(rebuilt),
        "&lt;b&gt;bold&lt;/b&gt;"
    );
}

#[test]
fn test_highlight_persists_after_edit_deactivation() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    let head = overlay.doc().head().unwrap();

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": false }));

    assert_eq!(overlay.mode(), Mode::Inactive);
    assert!(overlay.doc().has_class(p, "editor-highlight"));
    assert!(overlay.highlight().has_sheet(ModeFamily::Edit));
    assert_eq!(overlay.doc().children(head).len(), 1);

    overlay.handle_message(json!({ "type": "TEXT_EDITOR_CLEAR_SELECTION" }));
    assert!(!overlay.doc().has_class(p, "editor-highlight"));
    assert!(!overlay.highlight().has_sheet(ModeFamily::Edit));
    assert!(overlay.doc().children(head).is_empty());
    assert_eq!(overlay.doc().outer_html(p), "<p>Hello</p>");
}

#[test]
fn test_deactivation_commits_pending_session() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_GENERATE_TEXT",
        "content": "Bye",
    }));

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": false }));
    let node = overlay.state().selected_node().unwrap();
    assert_eq!(overlay.doc().tag_name(node).as_deref(), Some("p"));
    assert_eq!(overlay.doc().text_content(node), "Bye");
    assert!(overlay.state().session().is_none());
}

#[test]
fn test_image_click_short_circuits() {
    let (mut overlay, _) = overlay();
    let body = overlay.doc().body().unwrap();
    let figure = overlay.doc_mut().append_element(body, "figure", &[]);
    let img = overlay
        .doc_mut()
        .append_element(figure, "img", &[("src", "cat.png"), ("alt", "cat")]);

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(img));

    let messages = overlay.drain_outbound();
    assert!(matches!(
        &messages[..],
        [OutboundMessage::OpenImageEditor { element_info }]
            if element_info.image_info.kind == Some(ImageKind::Img)
                && element_info.image_info.src.as_deref() == Some("cat.png")
                && element_info.element.tag_name == "IMG"
    ));
    assert_eq!(
        overlay.state().selected().map(|s| s.kind),
        Some(SelectionKind::Image)
    );

    overlay.handle_message(json!({ "type": "ENABLE_TEXT_EDITOR" }));
    assert!(overlay.state().session().is_none());
    assert_eq!(overlay.doc().children(figure), vec![img]);

    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_UPDATE_IMAGE_SOURCE",
        "src": "dog.png",
    }));
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_UPDATE_IMAGE_FIT",
        "objectFit": "contain",
    }));
    assert_eq!(overlay.doc().attribute(img, "src").as_deref(), Some("dog.png"));
    assert_eq!(
        overlay.doc().inline_style(img, "object-fit").as_deref(),
        Some("contain")
    );

    let result = overlay.handle_keydown(&KeyCombo::new(Key::Escape));
    assert_eq!(result, KeydownResult::Handled);
    assert_eq!(types(&overlay.drain_outbound()), ["CLOSE_IMAGE_EDITOR"]);
    assert!(overlay.state().selected().is_none());
    assert_eq!(overlay.doc().attribute(img, "id"), None);
}

#[test]
fn test_sibling_resolves_to_image() {
    let (mut overlay, _) = overlay();
    let body = overlay.doc().body().unwrap();
    let card = overlay.doc_mut().append_element(body, "div", &[]);
    let hero = overlay.doc_mut().append_element(card, "div", &[]);
    overlay
        .doc_mut()
        .set_computed_style(hero, "background-image", "url(\"hero.jpg\")");
    let overlay_box = overlay.doc_mut().append_element(card, "div", &[]);

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(overlay_box));
    assert_eq!(overlay.state().selected_node(), Some(hero));
    assert_eq!(types(&overlay.drain_outbound()), ["OPEN_IMAGE_EDITOR"]);

    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_UPDATE_IMAGE_SOURCE",
        "src": "new.jpg",
    }));
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_UPDATE_IMAGE_FIT",
        "objectFit": "cover",
    }));
    let doc = overlay.doc();
    assert_eq!(
        doc.inline_style(hero, "background-image").as_deref(),
        Some("url(\"new.jpg\")")
    );
    assert_eq!(doc.inline_style(hero, "background-size").as_deref(), Some("cover"));
    assert_eq!(
        doc.inline_style(hero, "background-repeat").as_deref(),
        Some("no-repeat")
    );
    assert_eq!(
        doc.inline_style(hero, "background-position").as_deref(),
        Some("center")
    );

    // Clicking the marked image again closes the image editor.
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(hero));
    assert_eq!(types(&overlay.drain_outbound()), ["CLOSE_IMAGE_EDITOR"]);
    assert!(overlay.state().selected().is_none());
}

#[test]
fn test_text_beside_image_opens_image_editor() {
    let (mut overlay, _) = overlay();
    let body = overlay.doc().body().unwrap();
    let figure = overlay.doc_mut().append_element(body, "figure", &[]);
    let img = overlay
        .doc_mut()
        .append_element(figure, "img", &[("src", "cat.png")]);
    let caption = overlay.doc_mut().append_element(figure, "span", &[]);
    let text = overlay.doc_mut().append_text(caption, "A cat");
    assert!(crate::classify::is_image_like(overlay.doc(), caption));

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(caption));
    assert_eq!(types(&overlay.drain_outbound()), ["OPEN_IMAGE_EDITOR"]);
    assert_eq!(overlay.state().selected_node(), Some(caption));
    assert_eq!(
        overlay.state().selected().map(|s| s.kind),
        Some(SelectionKind::Image)
    );

    overlay.handle_message(json!({ "type": "ENABLE_TEXT_EDITOR" }));
    assert!(overlay.state().session().is_none());
    assert_eq!(overlay.doc().children(figure), vec![img, caption]);
    assert_eq!(overlay.doc().children(caption), vec![text]);

    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(caption));
    assert_eq!(types(&overlay.drain_outbound()), ["CLOSE_IMAGE_EDITOR"]);
    assert!(overlay.state().selected().is_none());
}

#[test]
fn test_unknown_command_leaves_state_unchanged() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);

    let before = overlay.state().clone();
    let html_before = overlay.doc().inner_html(overlay.doc().body().unwrap());

    overlay.handle_message(json!({ "type": "SELF_DESTRUCT" }));
    overlay.handle_message(json!({ "no": "type" }));
    overlay.handle_message(json!({ "type": "SET_ELEMENT_STYLE", "style": "h9" }));

    assert_eq!(overlay.state(), &before);
    assert_eq!(
        overlay.doc().inner_html(overlay.doc().body().unwrap()),
        html_before
    );
    assert!(overlay.drain_outbound().is_empty());
}

#[test]
fn test_diagnostics_forwarded_when_enabled() {
    let (mut overlay, _) = overlay_with(OverlayConfig {
        forward_diagnostics: true,
        ..OverlayConfig::default()
    });

    overlay.handle_message(json!({ "type": "SET_BOLD", "active": true }));
    overlay.handle_message(json!({ "type": "NOPE" }));
    assert_eq!(
        overlay.drain_outbound(),
        vec![
            OutboundMessage::ConsoleLog {
                value: "no element selected".into()
            },
            OutboundMessage::ConsoleLog {
                value: "unsupported command: NOPE".into()
            },
        ]
    );
}

#[test]
fn test_listeners_released_and_not_duplicated() {
    let (mut overlay, log) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    assert_eq!(log.borrow().active_pointer(ModeFamily::Edit), 1);
    assert_eq!(log.borrow().attached().len(), 1);

    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    overlay.handle_message(json!({ "type": "ENABLE_TEXT_EDITOR" }));
    assert_eq!(log.borrow().active_input(), 1);

    overlay.handle_keydown(&KeyCombo::new(Key::Escape));
    assert_eq!(log.borrow().active_input(), 0);

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": false }));
    assert_eq!(log.borrow().active_pointer(ModeFamily::Edit), 0);
    assert!(!overlay.is_subscribed(ModeFamily::Edit));

    let body = overlay.doc().body().unwrap();
    assert!(!overlay.doc().has_class(body, "text-editor-active"));
}

#[test]
fn test_inspect_hover_and_click() {
    let (mut overlay, log) = overlay();
    let a = paragraph(&mut overlay, &[], "First");
    let b = paragraph(&mut overlay, &[], "Second");
    let body = overlay.doc().body().unwrap();

    overlay.handle_message(json!({ "type": "INSPECTOR_ACTIVATE", "active": true }));
    assert_eq!(log.borrow().active_pointer(ModeFamily::Inspect), 1);
    assert!(overlay.doc().has_class(body, "inspector-active"));

    overlay.handle_pointer(ModeFamily::Inspect, PointerEvent::moved(body));
    assert!(overlay.drain_outbound().is_empty());

    let outcome = overlay.handle_pointer(ModeFamily::Inspect, PointerEvent::moved(a));
    assert_eq!(outcome, EventOutcome::PASS);
    assert!(overlay.doc().has_class(a, "inspector-highlight"));

    overlay.handle_pointer(ModeFamily::Inspect, PointerEvent::moved(b));
    assert!(!overlay.doc().has_class(a, "inspector-highlight"));
    assert_eq!(
        types(&overlay.drain_outbound()),
        ["INSPECTOR_HOVER", "INSPECTOR_HOVER"]
    );

    let outcome = overlay.handle_pointer(ModeFamily::Inspect, PointerEvent::click(b));
    assert_eq!(outcome, EventOutcome::CAPTURED);
    let messages = overlay.drain_outbound();
    assert!(matches!(
        &messages[..],
        [OutboundMessage::InspectorClick { element_info }] if element_info.text_content == "Second"
    ));

    // Hovering elsewhere never clears the selection highlight.
    overlay.handle_pointer(ModeFamily::Inspect, PointerEvent::moved(a));
    overlay.handle_pointer(ModeFamily::Inspect, PointerEvent::leave());
    assert!(!overlay.doc().has_class(a, "inspector-highlight"));
    assert!(overlay.doc().has_class(b, "inspector-highlight"));
    assert_eq!(overlay.state().hovered(), None);

    overlay.handle_message(json!({ "type": "INSPECTOR_ACTIVATE", "active": false }));
    assert!(overlay.doc().has_class(b, "inspector-highlight"));
    assert!(overlay.highlight().has_sheet(ModeFamily::Inspect));

    overlay.handle_message(json!({ "type": "INSPECTOR_CLEAR_SELECTION" }));
    assert!(!overlay.doc().has_class(b, "inspector-highlight"));
    assert!(!overlay.highlight().has_sheet(ModeFamily::Inspect));
}

#[test]
fn test_pointer_ignored_when_mode_inactive() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");

    let outcome = overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    assert_eq!(outcome, EventOutcome::PASS);
    assert!(overlay.state().selected().is_none());
    assert_eq!(
        overlay.handle_keydown(&KeyCombo::new(Key::Enter)),
        KeydownResult::NotHandled
    );
}

#[test]
fn test_edit_hover_skips_rich_content_and_pauses_while_selected() {
    let (mut overlay, _) = overlay();
    let body = overlay.doc().body().unwrap();
    let div = overlay.doc_mut().append_element(body, "div", &[]);
    overlay.doc_mut().append_text(div, "not a text tag");
    let a = paragraph(&mut overlay, &[], "First");
    let b = paragraph(&mut overlay, &[], "Second");

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::moved(div));
    assert!(!overlay.doc().has_class(div, "editor-highlight"));

    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::moved(a));
    assert!(overlay.doc().has_class(a, "editor-highlight"));
    assert!(overlay.drain_outbound().is_empty());

    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(a));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::moved(b));
    assert!(!overlay.doc().has_class(b, "editor-highlight"));
}

#[test]
fn test_shift_enter_does_not_close() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);

    assert_eq!(
        overlay.handle_keydown(&KeyCombo::shift(Key::Enter)),
        KeydownResult::NotHandled
    );
    assert!(overlay.state().session().is_some());
}

#[test]
fn test_close_click_on_surrogate_commits() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    let surrogate = start_editing(&mut overlay, p);

    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(surrogate));
    assert_eq!(types(&overlay.drain_outbound()), ["TEXT_EDITOR_CLOSE"]);
    assert!(overlay.state().session().is_none());

    let rebuilt = overlay.state().selected_node().unwrap();
    assert_eq!(overlay.doc().tag_name(rebuilt).as_deref(), Some("p"));
    assert_eq!(overlay.doc().attribute(rebuilt, "id"), None);
}

#[test]
fn test_close_click_without_surrogate_deselects() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[("id", "keep")], "Hello");

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));

    assert_eq!(
        types(&overlay.drain_outbound()),
        ["OPEN_TEXT_EDITOR", "TEXT_EDITOR_CLOSE"]
    );
    assert!(overlay.state().selected().is_none());
    assert_eq!(overlay.doc().outer_html(p), "<p id=\"keep\">Hello</p>");
}

#[test]
fn test_selecting_another_node_commits_first() {
    let (mut overlay, _) = overlay();
    let a = paragraph(&mut overlay, &[], "First");
    let b = paragraph(&mut overlay, &[], "Second");
    start_editing(&mut overlay, a);
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_GENERATE_TEXT",
        "content": "Changed",
    }));
    overlay.drain_outbound();

    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(b));
    assert_eq!(types(&overlay.drain_outbound()), ["OPEN_TEXT_EDITOR"]);
    assert_eq!(overlay.state().selected_node(), Some(b));

    let body = overlay.doc().body().unwrap();
    let children = overlay.doc().children(body);
    assert_eq!(children.len(), 2);
    assert_eq!(overlay.doc().outer_html(children[0]), "<p>Changed</p>");
    assert_eq!(children[1], b);
}

#[test]
fn test_formatting_carried_only_with_applied_edit() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    let surrogate = start_editing(&mut overlay, p);

    overlay.handle_message(json!({ "type": "SET_BOLD", "active": true }));
    overlay.handle_message(json!({ "type": "SET_ALIGNMENT", "align": "center" }));
    assert_eq!(
        overlay.doc().inline_style(surrogate, "font-weight").as_deref(),
        Some("bold")
    );
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_GENERATE_TEXT",
        "content": "Hello there",
    }));
    assert_eq!(
        overlay.drain_outbound(),
        vec![OutboundMessage::TextEditorTextChange {
            value: "Hello there".into()
        }]
    );

    overlay.handle_keydown(&KeyCombo::new(Key::Escape));
    overlay.handle_message(json!({ "type": "DESELECT_ELEMENT" }));
    let body = overlay.doc().body().unwrap();
    assert_eq!(
        overlay.doc().inner_html(body),
        "<p style=\"font-weight: bold; text-align: center;\">Hello there</p>"
    );
}

#[test]
fn test_formatting_dropped_when_text_unchanged() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);

    overlay.handle_message(json!({ "type": "SET_ITALIC", "active": true }));
    overlay.handle_keydown(&KeyCombo::new(Key::Enter));
    overlay.handle_message(json!({ "type": "DESELECT_ELEMENT" }));

    let body = overlay.doc().body().unwrap();
    assert_eq!(overlay.doc().inner_html(body), "<p>Hello</p>");
}

#[test]
fn test_style_preset_retags_commit() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[("class", "title")], "Heading");
    start_editing(&mut overlay, p);

    overlay.handle_message(json!({ "type": "SET_ELEMENT_STYLE", "style": "h2" }));
    assert_eq!(
        overlay.state().original_descriptor().map(|d| d.tag_name.as_str()),
        Some("H2")
    );
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_GENERATE_TEXT",
        "content": "New heading",
    }));
    let rebuilt = overlay.commit().unwrap();

    let doc = overlay.doc();
    assert_eq!(doc.tag_name(rebuilt).as_deref(), Some("h2"));
    assert_eq!(doc.inline_style(rebuilt, "font-size").as_deref(), Some("2.25rem"));
    assert_eq!(doc.inline_style(rebuilt, "font-weight").as_deref(), Some("700"));
    assert!(doc.has_class(rebuilt, "title"));
    assert_eq!(doc.text_content(rebuilt), "New heading");
}

#[test]
fn test_list_commands_toggle_and_report() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "a");
    let surrogate = start_editing(&mut overlay, p);
    overlay.handle_message(json!({
        "type": "TEXT_EDITOR_GENERATE_TEXT",
        "content": "a\nb",
    }));
    overlay.drain_outbound();

    overlay.handle_message(json!({ "type": "SET_NUMBERED_LIST" }));
    overlay.handle_message(json!({ "type": "SET_BULLET_LIST" }));
    overlay.handle_message(json!({ "type": "SET_BULLET_LIST" }));

    let values: Vec<String> = overlay
        .drain_outbound()
        .into_iter()
        .filter_map(|m| match m {
            OutboundMessage::TextEditorTextChange { value } => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(values, ["1. a\n2. b", "• a\n• b", "a\nb"]);
    assert_eq!(overlay.doc().input_value(surrogate).as_deref(), Some("a\nb"));
    assert_eq!(overlay.doc().focused(), Some(surrogate));
}

#[test]
fn test_list_command_needs_surrogate() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[], "1. a");

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    overlay.drain_outbound();

    overlay.handle_message(json!({ "type": "SET_BULLET_LIST" }));
    assert!(overlay.drain_outbound().is_empty());
    assert_eq!(overlay.doc().text_content(p), "1. a");
}

#[test]
fn test_deselect_restores_displaced_id() {
    let (mut overlay, _) = overlay();
    let p = paragraph(&mut overlay, &[("id", "hero-title")], "Hello");

    overlay.handle_message(json!({ "type": "EDITOR_ACTIVATE", "active": true }));
    overlay.handle_pointer(ModeFamily::Edit, PointerEvent::click(p));
    assert_eq!(overlay.doc().element_by_id("hero-title"), None);

    overlay.handle_message(json!({ "type": "DESELECT_ELEMENT" }));
    assert_eq!(overlay.doc().element_by_id("hero-title"), Some(p));
    assert_eq!(overlay.doc().element_by_id("edited-element"), None);
}

#[test]
fn test_shutdown_releases_everything() {
    let (mut overlay, log) = overlay();
    let p = paragraph(&mut overlay, &[], "Hello");
    start_editing(&mut overlay, p);
    overlay.handle_message(json!({ "type": "INSPECTOR_ACTIVATE", "active": true }));

    overlay.shutdown();

    let head = overlay.doc().head().unwrap();
    assert!(overlay.doc().children(head).is_empty());
    assert_eq!(overlay.mode(), Mode::Inactive);
    assert!(overlay.state().selected().is_none());
    assert_eq!(log.borrow().active_pointer(ModeFamily::Edit), 0);
    assert_eq!(log.borrow().active_pointer(ModeFamily::Inspect), 0);
    assert_eq!(log.borrow().active_input(), 0);

    let body = overlay.doc().body().unwrap();
    assert_eq!(overlay.doc().inner_html(body), "<p>Hello</p>");
}
