//! The URN-keyed library: store contract, nesting, persistence and tree rendering.
mod common;
use common::*;
use ahash::AHashMap;
use jag::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_store_contract() {
    let mut library = Library::new();
    library.create(leaf("urn:test:a", "A", &[], &[])).unwrap();
    assert!(matches!(
        library.create(leaf("urn:test:a", "Again", &[], &[])),
        Err(JagError::DuplicateUrn(_))
    ));

    let mut updated = library.get("urn:test:a").unwrap().clone();
    updated.set_name("Renamed");
    library.update(updated).unwrap();
    assert_eq!(library.get("urn:test:a").unwrap().name(), "Renamed");

    assert!(matches!(
        library.update(leaf("urn:test:missing", "M", &[], &[])),
        Err(JagError::ActivityNotFound(_))
    ));

    let removed = library.delete("urn:test:a").unwrap();
    assert_eq!(removed.urn(), "urn:test:a");
    assert!(library.is_empty());
    assert!(matches!(
        library.delete("urn:test:a"),
        Err(JagError::ActivityNotFound(_))
    ));
}

#[test]
fn test_add_child_rejects_cycles() {
    let mut library = Library::new();
    for urn in ["urn:test:a", "urn:test:b", "urn:test:c"] {
        library.create(leaf(urn, urn, &[], &[])).unwrap();
    }
    library.add_child("urn:test:a", "urn:test:b").unwrap();
    library.add_child("urn:test:b", "urn:test:c").unwrap();

    assert!(matches!(
        library.add_child("urn:test:c", "urn:test:a"),
        Err(JagError::CycleDetected { .. })
    ));
    assert!(matches!(
        library.add_child("urn:test:a", "urn:test:a"),
        Err(JagError::CycleDetected { .. })
    ));
    assert!(matches!(
        library.add_child("urn:test:a", "urn:test:missing"),
        Err(JagError::ActivityNotFound(_))
    ));

    // A diamond is fine: c may appear under a directly as well.
    assert!(library.add_child("urn:test:a", "urn:test:c").is_ok());
}

#[test]
fn test_descendants_and_parents() {
    let (library, _) = three_step_library(Execution::Sequential);
    let descendants = library.descendants(PARENT);
    assert_eq!(descendants.len(), 3);
    assert!(descendants.contains("urn:test:step-2"));
    assert!(library.descendants("urn:test:step-1").is_empty());

    assert_eq!(library.parents_of("urn:test:step-3"), vec![PARENT]);
    assert!(library.parents_of(PARENT).is_empty());
}

#[test]
fn test_plain_map_resolves_like_a_library() {
    let (library, ids) = three_step_library(Execution::Sequential);
    let map: AHashMap<String, Activity> = library
        .iter()
        .map(|activity| (activity.urn().to_string(), activity.clone()))
        .collect();

    assert!(map.resolve("urn:test:missing").is_none());
    let parent = map.resolve(PARENT).unwrap();
    assert_eq!(
        parent.inputs_to(&ids[2], &map),
        parent.inputs_to(&ids[2], &library)
    );
    assert!(parent.find_endpoint(&format!("{}/output:out", ids[0]), &map).is_some());
}

#[test]
fn test_import_is_all_or_nothing() {
    let mut library = Library::new();
    library.create(leaf("urn:ihmc:test:a", "A", &[], &[])).unwrap();

    let batch = serde_json::json!([
        minimal_document("urn:ihmc:test:b"),
        minimal_document("urn:ihmc:test:a")
    ]);
    assert!(matches!(
        library.import_json(&batch),
        Err(JagError::DuplicateUrn(urn)) if urn == "urn:ihmc:test:a"
    ));
    assert_eq!(library.len(), 1);

    let repeated = serde_json::json!([
        minimal_document("urn:ihmc:test:c"),
        minimal_document("urn:ihmc:test:c")
    ]);
    assert!(library.import_json(&repeated).is_err());
    assert!(!library.contains("urn:ihmc:test:c"));

    let urns = library
        .import_json(&minimal_document("urn:ihmc:test:b"))
        .unwrap();
    assert_eq!(urns, vec!["urn:ihmc:test:b".to_string()]);
    assert_eq!(library.urns(), vec!["urn:ihmc:test:a", "urn:ihmc:test:b"]);
}

#[test]
fn test_save_and_load() {
    let (library, ids) = three_step_library(Execution::Sequential);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let path = path.to_str().unwrap();

    library.save(path).unwrap();
    let loaded = Library::from_file(path).unwrap();

    assert_eq!(loaded.len(), library.len());
    assert_eq!(loaded.to_json().unwrap(), library.to_json().unwrap());
    let parent = loaded.resolve(PARENT).unwrap();
    assert_eq!(parent.order_for_id(&ids[2]), 3);
}

#[test]
fn test_from_file_reports_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    assert!(matches!(
        Library::from_file(path.to_str().unwrap()),
        Err(JagError::Io { .. })
    ));
}

#[test]
fn test_tree_rendering() {
    let (mut library, ids) = three_step_library(Execution::Sequential);
    library
        .get_mut(PARENT)
        .unwrap()
        .set_child_details(&ids[1], Some("Middle".to_string()), None);
    library.get_mut(PARENT).unwrap().set_iterable(&ids[2], true);

    let rendered = library.tree(PARENT).to_string();
    let expected = "\
Parent (urn:test:parent) [node.execution.sequential / node.operator.and]
├── 1. Step 1 (urn:test:step-1) [node.execution.none / node.operator.none]
├── 2. Middle (urn:test:step-2) [node.execution.none / node.operator.none]
└── 3. Step 3 (urn:test:step-3) [node.execution.none / node.operator.none] *
";
    assert_eq!(rendered, expected);
}

#[test]
fn test_tree_marks_unresolved_children() {
    let mut library = Library::new();
    let mut activity = leaf("urn:test:a", "A", &[], &[]);
    activity.add_child("urn:test:ghost", None);
    library.create(activity).unwrap();

    let rendered = library.tree("urn:test:a").to_string();
    assert!(rendered.contains("urn:test:ghost) <unresolved>"));
    assert_eq!(
        library.tree("urn:test:nothing").to_string(),
        "urn:test:nothing <unresolved>\n"
    );
}
