//! Wire form: round-trips, legacy migration and batch import.
mod common;
use common::*;
use jag::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_round_trip_full_document() {
    let activity = Activity::from_json(&full_document()).unwrap();
    let first = activity.to_value().unwrap();
    let reloaded = Activity::from_json(&first).unwrap();
    assert_eq!(reloaded.to_value().unwrap(), first);

    // Canonical documents come back exactly as written.
    assert_eq!(first, full_document());
}

#[test]
fn test_round_trip_built_activity() {
    let (library, ids) = three_step_library(Execution::Sequential);
    let mut parent = library.resolve(PARENT).unwrap().clone();
    parent.add_annotation(&ids[0], "note", json!({ "nested": [1, 2] }));
    parent.set_iterable(&ids[1], true);
    parent.add_binding(Binding::new(
        Endpoint::output(ids[0].as_str(), "out", "number"),
        Endpoint::input(ids[1].as_str(), "in", "number"),
    ));

    let first = parent.to_value().unwrap();
    let reloaded = Activity::from_json(&first).unwrap();
    assert_eq!(reloaded.to_value().unwrap(), first);
    assert_eq!(reloaded.children().len(), 3);
    assert_eq!(
        reloaded.annotations(&ids[0]).unwrap().get("note"),
        Some(&json!({ "nested": [1, 2] }))
    );
}

#[test]
fn test_to_json_writes_full_connector() {
    let activity = Activity::from_json(&minimal_document("urn:ihmc:test:a")).unwrap();
    let value = activity.to_value().unwrap();
    assert_eq!(
        value["connector"],
        json!({
            "execution": "node.execution.none",
            "returns": "node.returns.none",
            "operator": "node.operator.none",
            "onfail": "node.onfail.none"
        })
    );
    assert_eq!(value["type"], json!("node.type.plan"));
    assert!(value.get("description").is_none());
    assert!(validate_jag(&value, &ValidationOptions::strict()).is_ok());
}

#[test]
fn test_serialize_matches_to_value() {
    let activity = Activity::from_json(&full_document()).unwrap();
    let via_serde = serde_json::to_value(&activity).unwrap();
    assert_eq!(via_serde, activity.to_value().unwrap());
}

#[test]
fn test_legacy_connector_migrates_returns() {
    let mut doc = minimal_document("urn:ihmc:test:a");
    doc["connector"] = json!({
        "execution": "node.execution.sequential",
        "operator": "node.operator.sum"
    });
    let activity = Activity::from_json(&doc).unwrap();
    assert_eq!(activity.returns(), Returns::All);
    assert_eq!(activity.operator(), Operator::Sum);
    assert_eq!(activity.onfail(), OnFail::None);

    doc["connector"]["operator"] = json!("node.operator.negate");
    let activity = Activity::from_json(&doc).unwrap();
    assert_eq!(activity.returns(), Returns::Latest);
    assert!(activity.connector().is_consistent());
}

#[test]
fn test_legacy_bindings_import_as_endpoints() {
    let child = "0b6c4d6e-9a59-4f0e-8d9c-3f1a2b3c4d5e";
    let doc = json!({
        "urn": "urn:ihmc:test:legacy",
        "name": "Legacy",
        "connector": {
            "execution": "node.execution.sequential",
            "returns": "node.returns.all",
            "operator": "node.operator.and"
        },
        "inputs": [{ "name": "in", "type": "number" }],
        "outputs": [{ "name": "result", "type": "number" }],
        "children": [{ "urn": "urn:ihmc:test:child", "id": child }],
        "bindings": [
            {
                "consumer": { "id": child, "property": "x" },
                "provider": { "id": "this", "property": "in" }
            },
            {
                "consumer": { "id": "this", "property": "result" },
                "provider": { "id": child, "property": "y" }
            }
        ]
    });

    let activity = Activity::from_json(&doc).unwrap();
    let bindings = activity.bindings();
    assert_eq!(bindings.len(), 2);

    assert_eq!(bindings[0].from, Endpoint::input(THIS, "in", "number"));
    assert_eq!(bindings[0].from.exchange_type, "number");
    assert_eq!(bindings[0].to, Endpoint::input(child, "x", ANY_TYPE));
    assert_eq!(bindings[1].from, Endpoint::output(child, "y", ANY_TYPE));
    assert_eq!(bindings[1].to, Endpoint::output(THIS, "result", "number"));

    // Output is always in the current shape.
    let value = activity.to_value().unwrap();
    assert!(value["bindings"][0].get("from").is_some());
    assert!(value["bindings"][0].get("consumer").is_none());
    assert!(validate_jag(&value, &ValidationOptions::strict()).is_ok());
}

#[test]
fn test_dates_are_epoch_millis() {
    let activity = Activity::from_json(&full_document()).unwrap();
    let created = activity.created_date().unwrap();
    assert_eq!(created.timestamp_millis(), 1_700_000_000_000);

    let activity = Activity::from_json(&minimal_document("urn:ihmc:test:a")).unwrap();
    assert!(activity.created_date().is_none());
}

#[test]
fn test_batch_import_is_all_or_nothing() {
    let batch = json!([
        minimal_document("urn:ihmc:test:a"),
        minimal_document("urn:ihmc:test:b")
    ]);
    let activities = import(&batch).unwrap();
    assert_eq!(activities.len(), 2);

    let bad = json!([
        minimal_document("urn:ihmc:test:a"),
        minimal_document("broken")
    ]);
    assert!(matches!(import(&bad), Err(JagError::InvalidJag { .. })));

    assert!(matches!(import(&json!("nope")), Err(JagError::InvalidJag { .. })));
    assert_eq!(import(&minimal_document("urn:ihmc:test:a")).unwrap().len(), 1);
}

#[test]
fn test_from_json_str_reports_parse_errors() {
    assert!(matches!(
        Activity::from_json_str("{ not json"),
        Err(JagError::JsonParseError(_))
    ));
    let text = minimal_document("urn:ihmc:test:a").to_string();
    assert!(Activity::from_json_str(&text).is_ok());
}
