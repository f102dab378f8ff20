//! Strict schema validation of raw documents.
mod common;
use common::*;
use jag::prelude::*;
use serde_json::json;

fn violation_path(json: &serde_json::Value, options: &ValidationOptions) -> String {
    validate_jag(json, options).unwrap_err().path
}

#[test]
fn test_rejects_malformed_urn() {
    let result = Activity::from_json(&minimal_document("not_a_valid_urn"));
    match result {
        Err(JagError::InvalidJag { violation, document }) => {
            assert_eq!(violation.path, "urn");
            assert!(document.contains("not_a_valid_urn"));
        }
        other => panic!("expected InvalidJag, got {:?}", other.map(|a| a.urn().to_string())),
    }
}

#[test]
fn test_accepts_minimal_document() {
    let activity = Activity::from_json(&minimal_document("urn:ihmc:test:a")).unwrap();
    assert_eq!(activity.urn(), "urn:ihmc:test:a");
    assert_eq!(activity.name(), "x");
    assert_eq!(activity.returns(), Returns::None);
    assert_eq!(activity.onfail(), OnFail::None);
}

#[test]
fn test_urn_grammar() {
    assert!(is_valid_urn("urn:ihmc:test:a"));
    assert!(is_valid_urn("urn:ihmc:a-b_c.d"));
    assert!(!is_valid_urn("urn"));
    assert!(!is_valid_urn("urn:"));
    assert!(!is_valid_urn(":ihmc"));
    assert!(!is_valid_urn("urn:has space"));
}

#[test]
fn test_full_document_is_valid() {
    assert!(validate_jag(&full_document(), &ValidationOptions::strict()).is_ok());
}

#[test]
fn test_type_must_be_plan() {
    let mut doc = minimal_document("urn:ihmc:test:a");
    doc["type"] = json!("node.type.plan");
    assert!(validate_jag(&doc, &ValidationOptions::default()).is_ok());

    doc["type"] = json!("node.type.task");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "type");
    doc["type"] = json!(7);
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "type");
}

#[test]
fn test_rejects_extra_keys() {
    let mut doc = full_document();
    doc["colour"] = json!("blue");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "$");

    let mut doc = full_document();
    doc["inputs"][0]["unit"] = json!("kg");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "inputs[0]");

    let mut doc = full_document();
    doc["children"][1]["extra"] = json!(true);
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "children[1]");

    let mut doc = full_document();
    doc["bindings"][0]["from"]["note"] = json!("x");
    assert_eq!(
        violation_path(&doc, &ValidationOptions::default()),
        "bindings[0].from"
    );
}

#[test]
fn test_rejects_missing_and_empty_fields() {
    let mut doc = full_document();
    doc["name"] = json!("");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "name");

    let mut doc = full_document();
    doc.as_object_mut().unwrap().remove("connector");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "connector");

    let mut doc = full_document();
    doc["description"] = json!(3);
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "description");
}

#[test]
fn test_connector_shapes() {
    let mut doc = minimal_document("urn:ihmc:test:a");
    assert!(validate_jag(&doc, &ValidationOptions::default()).is_ok());
    assert_eq!(violation_path(&doc, &ValidationOptions::strict()), "connector");

    doc["connector"]["returns"] = json!("node.returns.none");
    doc["connector"]["onfail"] = json!("node.onfail.none");
    assert!(validate_jag(&doc, &ValidationOptions::strict()).is_ok());

    doc["connector"]["extra"] = json!("x");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "connector");

    let mut doc = minimal_document("urn:ihmc:test:a");
    doc["connector"]["execution"] = json!("node.execution.sideways");
    assert_eq!(
        violation_path(&doc, &ValidationOptions::default()),
        "connector.execution"
    );
}

#[test]
fn test_child_ids_must_be_unique_uuids() {
    let mut doc = full_document();
    doc["children"][0]["id"] = json!("not-a-uuid");
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "children[0].id");

    let mut doc = full_document();
    doc["children"][1]["id"] = doc["children"][0]["id"].clone();
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "children[1].id");
}

#[test]
fn test_exchange_names_must_be_unique() {
    let mut doc = full_document();
    doc["outputs"] = json!([
        { "name": "result", "type": "number" },
        { "name": "result", "type": "string" }
    ]);
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "outputs[1].name");
}

#[test]
fn test_binding_endpoints_are_checked() {
    let mut doc = full_document();
    doc["bindings"][0]["to"]["direction"] = json!("sideways");
    assert_eq!(
        violation_path(&doc, &ValidationOptions::default()),
        "bindings[0].to.direction"
    );

    let mut doc = full_document();
    doc["bindings"][0]["from"]["exchangeSourceUrn"] = json!("nobody");
    assert_eq!(
        violation_path(&doc, &ValidationOptions::default()),
        "bindings[0].from.exchangeSourceUrn"
    );

    let mut doc = full_document();
    doc["bindings"][0] = json!({ "id": "b1" });
    assert_eq!(violation_path(&doc, &ValidationOptions::default()), "bindings[0]");
}

#[test]
fn test_legacy_bindings_follow_options() {
    let mut doc = full_document();
    doc["bindings"] = json!([{
        "consumer": { "id": "0b6c4d6e-9a59-4f0e-8d9c-3f1a2b3c4d5e", "property": "in" },
        "provider": { "id": "this", "property": "in" }
    }]);
    assert!(validate_jag(&doc, &ValidationOptions::default()).is_ok());
    assert_eq!(violation_path(&doc, &ValidationOptions::strict()), "bindings[0]");

    doc["bindings"][0]["provider"]["id"] = json!("someone");
    assert_eq!(
        violation_path(&doc, &ValidationOptions::default()),
        "bindings[0].provider.id"
    );
}

#[test]
fn test_violation_display_names_path() {
    let violation = validate_jag(&json!([]), &ValidationOptions::default()).unwrap_err();
    assert_eq!(violation.to_string(), "$: an object");
}
