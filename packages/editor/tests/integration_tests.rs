//! End-to-end pipeline tests: decode → mutate → encode

use pageforge_document::codec::{self, OriginalType, RootSource};
use pageforge_editor::{EditRequest, Pipeline, ReadOptions, TextUpdate};
use pageforge_views::{LayoutMode, TextMapScope, TextMapStyle};
use serde_json::{json, Value};

/// A two-section page stored in the `treeJsonString` shape, with sibling
/// keys at both levels.
fn stored_document() -> Value {
    let tree = json!({
        "root": {
            "id": 1,
            "children": [
                {
                    "id": 2,
                    "type": "section",
                    "children": [
                        {
                            "id": 3,
                            "type": "column",
                            "children": [
                                {
                                    "id": 4,
                                    "type": "heading",
                                    "properties": { "content": { "content": { "text": "Hero title" } } }
                                },
                                {
                                    "id": 5,
                                    "type": "text",
                                    "properties": { "content": { "content": { "text": "Hero body" } } }
                                }
                            ]
                        }
                    ]
                },
                {
                    "id": 6,
                    "type": "section",
                    "children": [
                        {
                            "id": 7,
                            "type": "column",
                            "children": [
                                {
                                    "id": 8,
                                    "type": "button",
                                    "properties": { "content": { "settings": { "label": "Call us", "url": "https://example.test" } } }
                                }
                            ]
                        }
                    ]
                }
            ]
        },
        "globalSettings": { "palette": "light" }
    });
    json!({
        "treeJsonString": tree.to_string(),
        "dataVersion": 3
    })
}

#[test]
fn test_inspect_produces_outline_and_text_map() {
    let pipeline = Pipeline::new();
    let options = ReadOptions {
        layout_mode: LayoutMode::Full,
        text_map: true,
        text_map_style: TextMapStyle::Full,
        text_map_scope: TextMapScope::Content,
        ..Default::default()
    };

    let view = pipeline.inspect(&stored_document(), &options).unwrap();

    assert_eq!(view.outline.len(), 3);
    assert_eq!(view.outline[0].path, "0.0.0");
    assert_eq!(view.outline[0].text, "Hero title");
    assert_eq!(view.outline[0].context, "Section > Column");
    assert!(view.layout.is_some());

    let text_map = view.text_map.unwrap();
    assert!(text_map
        .iter()
        .any(|e| e.field_key == "0.0.0|content.content.text"));
    assert!(text_map
        .iter()
        .any(|e| e.field_key == "1.0.0|content.settings.label"));
}

#[test]
fn test_apply_round_trip_preserves_shape() {
    let pipeline = Pipeline::new();
    let raw = stored_document();

    let outcome = pipeline.apply(Some(&raw), &EditRequest::default()).unwrap();
    let encoded = outcome.document;

    // Sibling keys at the outer level survive untouched.
    assert_eq!(encoded["dataVersion"], json!(3));

    let wrapper = codec::decode(&encoded).unwrap();
    assert_eq!(wrapper.root_source, RootSource::TreeJsonString);
    assert_eq!(wrapper.original_type, OriginalType::Mapping);
    assert_eq!(wrapper.root, codec::decode(&raw).unwrap().root);
    assert_eq!(
        wrapper.inner.unwrap()["globalSettings"],
        json!({ "palette": "light" })
    );
}

#[test]
fn test_text_updates_by_every_address_form() {
    let pipeline = Pipeline::new();
    let request = EditRequest {
        text_updates: vec![
            TextUpdate {
                path: Some("0.0.0".to_string()),
                text: "New title".to_string(),
                ..Default::default()
            },
            TextUpdate {
                field_key: Some("1.0.0|content.settings.label".to_string()),
                text: "Email us".to_string(),
                ..Default::default()
            },
            TextUpdate {
                path: Some("1.0.0".to_string()),
                prop: Some("content.settings.url".to_string()),
                text: "https://new.test".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&stored_document()), &request).unwrap();
    assert_eq!(outcome.summary.texts_updated, 1);
    assert_eq!(outcome.summary.properties_updated, 2);
    assert_eq!(outcome.summary.stale_skipped, 0);

    let root = codec::decode(&outcome.document).unwrap().root;
    let heading = root.get_at(&[0, 0, 0]).unwrap();
    assert_eq!(
        heading.property("content.content.text").unwrap(),
        &json!("New title")
    );
    let button = root.get_at(&[1, 0, 0]).unwrap();
    assert_eq!(
        button.property("content.settings.label").unwrap(),
        &json!("Email us")
    );
    assert_eq!(
        button.property("content.settings.url").unwrap(),
        &json!("https://new.test")
    );
}

#[test]
fn test_text_update_batch_is_idempotent() {
    let pipeline = Pipeline::new();
    let request = EditRequest {
        text_updates: vec![
            TextUpdate {
                path: Some("0.0.0".to_string()),
                text: "Stable".to_string(),
                ..Default::default()
            },
            TextUpdate {
                field_key: Some("1.0.0|content.settings.label".to_string()),
                text: "Twice".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let once = pipeline.apply(Some(&stored_document()), &request).unwrap();
    let twice = pipeline.apply(Some(&once.document), &request).unwrap();

    assert_eq!(
        codec::decode(&once.document).unwrap().root,
        codec::decode(&twice.document).unwrap().root
    );
}

#[test]
fn test_removal_keeps_siblings_intact() {
    let pipeline = Pipeline::new();
    let request = EditRequest {
        remove_paths: vec!["0.0.0".to_string()],
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&stored_document()), &request).unwrap();
    assert_eq!(outcome.summary.nodes_removed, 1);

    let root = codec::decode(&outcome.document).unwrap().root;
    let column = root.get_at(&[0, 0]).unwrap();
    assert_eq!(column.children.len(), 1);
    assert_eq!(
        column.children[0].property("content.content.text").unwrap(),
        &json!("Hero body")
    );
    // The second section is untouched.
    assert_eq!(root.get_at(&[1, 0, 0]).unwrap().element_type, "button");
}

#[test]
fn test_removal_of_subtree_drops_descendants() {
    let pipeline = Pipeline::new();
    let request = EditRequest {
        remove_paths: vec!["0".to_string()],
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&stored_document()), &request).unwrap();
    // Section, column, heading, text all go.
    assert_eq!(outcome.summary.nodes_removed, 4);

    let root = codec::decode(&outcome.document).unwrap().root;
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].id, 6);
}

#[test]
fn test_stale_addresses_are_skipped_not_fatal() {
    let pipeline = Pipeline::new();
    let request = EditRequest {
        remove_paths: vec!["9.9.9".to_string(), "bogus".to_string()],
        text_updates: vec![
            TextUpdate {
                path: Some("8.8".to_string()),
                text: "nowhere".to_string(),
                ..Default::default()
            },
            TextUpdate {
                path: Some("0.0.0".to_string()),
                text: "still lands".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&stored_document()), &request).unwrap();
    assert_eq!(outcome.summary.texts_updated, 1);
    assert_eq!(outcome.summary.stale_skipped, 2);
    assert_eq!(outcome.summary.nodes_removed, 0);

    let root = codec::decode(&outcome.document).unwrap().root;
    assert_eq!(
        root.get_at(&[0, 0, 0]).unwrap().property("content.content.text").unwrap(),
        &json!("still lands")
    );
}

#[test]
fn test_property_updates_never_create_structure() {
    let pipeline = Pipeline::new();
    let request = EditRequest {
        text_updates: vec![TextUpdate {
            path: Some("0.0.0".to_string()),
            prop: Some("content.settings.anchor".to_string()),
            text: "top".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&stored_document()), &request).unwrap();
    // The heading has no content.settings branch, so the write no-ops.
    assert_eq!(outcome.summary.properties_updated, 0);
    assert_eq!(outcome.summary.stale_skipped, 1);

    let root = codec::decode(&outcome.document).unwrap().root;
    assert!(root
        .get_at(&[0, 0, 0])
        .unwrap()
        .property("content.settings.anchor")
        .is_none());
}

#[test]
fn test_string_stored_document_stays_a_string() {
    let pipeline = Pipeline::new();
    let raw = Value::String(
        json!({ "root": { "id": 1, "children": [] } }).to_string(),
    );
    let request = EditRequest {
        append_html: Some("<p>appended</p>".to_string()),
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&raw), &request).unwrap();
    assert!(matches!(outcome.document, Value::String(_)));

    let wrapper = codec::decode(&outcome.document).unwrap();
    assert_eq!(wrapper.original_type, OriginalType::String);
    assert_eq!(wrapper.root.children.len(), 1);
    let body = wrapper.root.get_at(&[0, 0, 0]).unwrap();
    assert_eq!(
        body.property("content.content.text").unwrap(),
        &json!("<p>appended</p>")
    );
}

#[test]
fn test_undecodable_document_bootstraps_empty() {
    let pipeline = Pipeline::new();
    let raw = Value::String("not a document at all".to_string());
    let request = EditRequest {
        text_updates: vec![TextUpdate {
            path: Some("0".to_string()),
            text: "ghost".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let outcome = pipeline.apply(Some(&raw), &request).unwrap();
    // The update had nowhere to land in the fresh empty document.
    assert_eq!(outcome.summary.stale_skipped, 1);

    let wrapper = codec::decode(&outcome.document).unwrap();
    assert_eq!(wrapper.root_source, RootSource::TreeJsonString);
    assert!(wrapper.root.children.is_empty());
}
