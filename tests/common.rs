//! Common test utilities for building activities and libraries.
use jag::prelude::*;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const PARENT: &str = "urn:test:parent";

/// Creates an activity with the given `(name, type)` inputs and outputs.
#[allow(dead_code)]
pub fn leaf(urn: &str, name: &str, inputs: &[(&str, &str)], outputs: &[(&str, &str)]) -> Activity {
    let mut builder = Activity::builder(urn, name);
    for (n, t) in inputs {
        builder = builder.input(*n, *t);
    }
    for (n, t) in outputs {
        builder = builder.output(*n, *t);
    }
    builder.build().expect("fixture URN is valid")
}

/// A library holding `PARENT` (input `in`, output `result`) with three children, each a
/// distinct step activity with input `in` and output `out`.
///
/// Returns the library and the child slot ids in insertion order.
#[allow(dead_code)]
pub fn three_step_library(execution: Execution) -> (Library, Vec<String>) {
    let mut library = Library::new();
    let parent = Activity::builder(PARENT, "Parent")
        .execution(execution)
        .input("in", "number")
        .output("result", "number")
        .build()
        .expect("fixture URN is valid");
    library.create(parent).expect("fresh library");

    let mut ids = Vec::new();
    for step in 1..=3 {
        let urn = format!("urn:test:step-{step}");
        library
            .create(leaf(&urn, &format!("Step {step}"), &[("in", "number")], &[("out", "number")]))
            .expect("fresh urn");
        ids.push(library.add_child(PARENT, &urn).expect("acyclic"));
    }
    (library, ids)
}

/// A canonical, schema-valid document exercising every section.
#[allow(dead_code)]
pub fn full_document() -> Value {
    json!({
        "urn": "urn:ihmc:test:full",
        "name": "Full activity",
        "description": "Exercises every field",
        "author": "tester",
        "createdDate": 1_700_000_000_000_i64,
        "modifiedDate": 1_700_000_100_000_i64,
        "expectedDuration": 12.5,
        "type": "node.type.plan",
        "connector": {
            "execution": "node.execution.sequential",
            "returns": "node.returns.all",
            "operator": "node.operator.and",
            "onfail": "node.onfail.skip"
        },
        "inputs": [{ "name": "in", "type": "number" }],
        "outputs": [{ "name": "result", "type": "number" }],
        "children": [
            {
                "urn": "urn:ihmc:test:first",
                "id": "0b6c4d6e-9a59-4f0e-8d9c-3f1a2b3c4d5e",
                "name": "First",
                "annotations": { "weight": 2, "tag": "a" },
                "iterable": true
            },
            {
                "urn": "urn:ihmc:test:second",
                "id": "7f1e2d3c-4b5a-4697-8877-665544332211"
            }
        ],
        "bindings": [
            {
                "id": "b1",
                "from": {
                    "id": "e1",
                    "exchangeSourceUrn": "this",
                    "direction": "input",
                    "exchangeName": "in",
                    "exchangeType": "number"
                },
                "to": {
                    "id": "e2",
                    "exchangeSourceUrn": "0b6c4d6e-9a59-4f0e-8d9c-3f1a2b3c4d5e",
                    "direction": "input",
                    "exchangeName": "in",
                    "exchangeType": "number"
                }
            }
        ],
        "lockedBy": "tester",
        "isLocked": true,
        "collapsed": false
    })
}

/// The smallest accepted document, using the two-key connector.
#[allow(dead_code)]
pub fn minimal_document(urn: &str) -> Value {
    json!({
        "urn": urn,
        "name": "x",
        "connector": {
            "execution": "node.execution.none",
            "operator": "node.operator.none"
        }
    })
}

/// An observer that records every event it receives.
#[allow(dead_code)]
pub fn recording_observer() -> (Arc<dyn ActivityObserver>, Arc<Mutex<Vec<ActivityEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let observer: Arc<dyn ActivityObserver> = Arc::new(move |_urn: &str, event: &ActivityEvent| {
        sink.lock().expect("observer lock").push(event.clone());
    });
    (observer, events)
}
