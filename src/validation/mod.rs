//! Strict schema validation of raw Activity JSON.
//!
//! Every object is checked against an allowlist of keys, so fields the model does not
//! know about are rejected at load time instead of being silently dropped.

use crate::error::SchemaViolation;
use crate::model::{ANY, THIS};
use crate::serialization::PLAN_TYPE;
use crate::taxonomy::{Execution, OnFail, Operator, Returns};
use serde_json::{Map, Value};
use ahash::AHashSet;
use tracing::instrument;

mod urn;

pub use urn::{is_valid_urn, is_valid_uuid};

const ACTIVITY_KEYS: &[&str] = &[
    "urn",
    "name",
    "description",
    "author",
    "createdDate",
    "modifiedDate",
    "expectedDuration",
    "type",
    "connector",
    "inputs",
    "outputs",
    "children",
    "bindings",
    "lockedBy",
    "isLocked",
    "collapsed",
];
const CONNECTOR_KEYS: &[&str] = &["execution", "returns", "operator", "onfail"];
const CONNECTOR_KEYS_V1: &[&str] = &["execution", "returns", "operator"];
const CONNECTOR_KEYS_LEGACY: &[&str] = &["execution", "operator"];
const EXCHANGE_KEYS: &[&str] = &["name", "type"];
const CHILD_KEYS: &[&str] = &["urn", "id", "name", "description", "annotations", "iterable"];
const BINDING_KEYS: &[&str] = &["id", "from", "to"];
const LEGACY_BINDING_KEYS: &[&str] = &["consumer", "provider"];
const LEGACY_ENDPOINT_KEYS: &[&str] = &["id", "property"];
const ENDPOINT_KEYS: &[&str] = &[
    "id",
    "exchangeSourceUrn",
    "direction",
    "exchangeName",
    "exchangeType",
];

/// Which historical document shapes are accepted on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accept `{execution, operator}` and `{execution, returns, operator}` connectors.
    pub accept_legacy_connector: bool,
    /// Accept `{consumer: {id, property}, provider: {id, property}}` bindings.
    pub accept_legacy_bindings: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            accept_legacy_connector: true,
            accept_legacy_bindings: true,
        }
    }
}

impl ValidationOptions {
    /// Only the canonical 4-key connector and `{id, from, to}` bindings.
    pub fn strict() -> Self {
        Self {
            accept_legacy_connector: false,
            accept_legacy_bindings: false,
        }
    }
}

/// Asserts that `json` is a well-formed Activity document.
#[instrument(level = "trace", skip(json))]
pub fn validate_jag(json: &Value, options: &ValidationOptions) -> Result<(), SchemaViolation> {
    let obj = require_object(json, "$")?;
    check_keys(obj, ACTIVITY_KEYS, "$")?;

    let urn = required_string(obj, "urn", "urn")?;
    if !is_valid_urn(urn) {
        return Err(SchemaViolation::new(
            "urn",
            format!("a URN of the form namespace:token, found '{urn}'"),
        ));
    }
    required_string(obj, "name", "name")?;
    optional_string(obj, "description", "description")?;
    optional_string(obj, "author", "author")?;
    optional_string(obj, "lockedBy", "lockedBy")?;
    if let Some(kind) = obj.get("type") {
        if kind.as_str() != Some(PLAN_TYPE) {
            return Err(SchemaViolation::new(
                "type",
                format!("the constant '{PLAN_TYPE}' if present, found {kind}"),
            ));
        }
    }
    optional_integer(obj, "createdDate", "createdDate")?;
    optional_integer(obj, "modifiedDate", "modifiedDate")?;
    optional_bool(obj, "isLocked", "isLocked")?;
    optional_bool(obj, "collapsed", "collapsed")?;
    if let Some(duration) = obj.get("expectedDuration") {
        if !duration.is_number() {
            return Err(SchemaViolation::new("expectedDuration", "a number"));
        }
    }

    let connector = obj
        .get("connector")
        .ok_or_else(|| SchemaViolation::new("connector", "a connector object"))?;
    validate_connector(connector, options)?;

    for key in ["inputs", "outputs"] {
        if let Some(exchanges) = obj.get(key) {
            validate_exchanges(exchanges, key)?;
        }
    }
    let child_ids = match obj.get("children") {
        Some(children) => validate_children(children)?,
        None => AHashSet::new(),
    };
    if let Some(bindings) = obj.get("bindings") {
        validate_bindings(bindings, &child_ids, options)?;
    }
    Ok(())
}

fn validate_connector(value: &Value, options: &ValidationOptions) -> Result<(), SchemaViolation> {
    let obj = require_object(value, "connector")?;
    let shapes: &[&[&str]] = if options.accept_legacy_connector {
        &[CONNECTOR_KEYS, CONNECTOR_KEYS_V1, CONNECTOR_KEYS_LEGACY]
    } else {
        &[CONNECTOR_KEYS]
    };
    let matches_shape = shapes
        .iter()
        .any(|shape| shape.len() == obj.len() && shape.iter().all(|k| obj.contains_key(*k)));
    if !matches_shape {
        let expected = shapes
            .iter()
            .map(|shape| format!("{{{}}}", shape.join(", ")))
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(SchemaViolation::new(
            "connector",
            format!("exactly the keys {expected}"),
        ));
    }

    let execution = required_string(obj, "execution", "connector.execution")?;
    taxonomy_name(execution, Execution::from_name, Execution::FAMILY, "connector.execution")?;
    let operator = required_string(obj, "operator", "connector.operator")?;
    taxonomy_name(operator, Operator::from_name, Operator::FAMILY, "connector.operator")?;
    if obj.contains_key("returns") {
        let returns = required_string(obj, "returns", "connector.returns")?;
        taxonomy_name(returns, Returns::from_name, Returns::FAMILY, "connector.returns")?;
    }
    if obj.contains_key("onfail") {
        let onfail = required_string(obj, "onfail", "connector.onfail")?;
        taxonomy_name(onfail, OnFail::from_name, OnFail::FAMILY, "connector.onfail")?;
    }
    Ok(())
}

fn taxonomy_name<T>(
    name: &str,
    lookup: fn(&str) -> Option<T>,
    family: &str,
    path: &str,
) -> Result<(), SchemaViolation> {
    match lookup(name) {
        Some(_) => Ok(()),
        None => Err(SchemaViolation::new(
            path,
            format!("a node.{family}.* name, found '{name}'"),
        )),
    }
}

fn validate_exchanges(value: &Value, key: &str) -> Result<(), SchemaViolation> {
    let items = require_array(value, key)?;
    let mut names = AHashSet::new();
    for (idx, item) in items.iter().enumerate() {
        let path = format!("{key}[{idx}]");
        let obj = require_object(item, &path)?;
        check_keys(obj, EXCHANGE_KEYS, &path)?;
        let name = required_string(obj, "name", &format!("{path}.name"))?;
        required_string(obj, "type", &format!("{path}.type"))?;
        if !names.insert(name) {
            return Err(SchemaViolation::new(
                format!("{path}.name"),
                format!("a name unique within {key}, found duplicate '{name}'"),
            ));
        }
    }
    Ok(())
}

fn validate_children(value: &Value) -> Result<AHashSet<&str>, SchemaViolation> {
    let items = require_array(value, "children")?;
    let mut ids = AHashSet::new();
    for (idx, item) in items.iter().enumerate() {
        let path = format!("children[{idx}]");
        let obj = require_object(item, &path)?;
        check_keys(obj, CHILD_KEYS, &path)?;
        required_string(obj, "urn", &format!("{path}.urn"))?;
        let id = required_string(obj, "id", &format!("{path}.id"))?;
        if !is_valid_uuid(id) {
            return Err(SchemaViolation::new(
                format!("{path}.id"),
                format!("a UUID, found '{id}'"),
            ));
        }
        if !ids.insert(id) {
            return Err(SchemaViolation::new(
                format!("{path}.id"),
                format!("an id unique among children, found duplicate '{id}'"),
            ));
        }
        optional_string(obj, "name", &format!("{path}.name"))?;
        optional_string(obj, "description", &format!("{path}.description"))?;
        optional_bool(obj, "iterable", &format!("{path}.iterable"))?;
        if let Some(annotations) = obj.get("annotations") {
            require_object(annotations, &format!("{path}.annotations"))?;
        }
    }
    Ok(ids)
}

fn validate_bindings(
    value: &Value,
    child_ids: &AHashSet<&str>,
    options: &ValidationOptions,
) -> Result<(), SchemaViolation> {
    let items = require_array(value, "bindings")?;
    for (idx, item) in items.iter().enumerate() {
        let path = format!("bindings[{idx}]");
        let obj = require_object(item, &path)?;
        if obj.contains_key("from") || obj.contains_key("to") {
            check_keys(obj, BINDING_KEYS, &path)?;
            optional_string(obj, "id", &format!("{path}.id"))?;
            for end in ["from", "to"] {
                let end_path = format!("{path}.{end}");
                let endpoint = obj
                    .get(end)
                    .ok_or_else(|| SchemaViolation::new(&end_path, "an endpoint object"))?;
                validate_endpoint(endpoint, child_ids, &end_path)?;
            }
        } else if obj.contains_key("consumer") || obj.contains_key("provider") {
            if !options.accept_legacy_bindings {
                return Err(SchemaViolation::new(
                    &path,
                    "a {id, from, to} binding (legacy {consumer, provider} bindings are disabled)",
                ));
            }
            check_keys(obj, LEGACY_BINDING_KEYS, &path)?;
            for end in ["consumer", "provider"] {
                let end_path = format!("{path}.{end}");
                let endpoint = obj
                    .get(end)
                    .ok_or_else(|| SchemaViolation::new(&end_path, "a {id, property} object"))?;
                let end_obj = require_object(endpoint, &end_path)?;
                check_keys(end_obj, LEGACY_ENDPOINT_KEYS, &end_path)?;
                let id = required_string(end_obj, "id", &format!("{end_path}.id"))?;
                if id != THIS && !is_valid_uuid(id) {
                    return Err(SchemaViolation::new(
                        format!("{end_path}.id"),
                        format!("'this' or a UUID, found '{id}'"),
                    ));
                }
                required_string(end_obj, "property", &format!("{end_path}.property"))?;
            }
        } else {
            return Err(SchemaViolation::new(
                &path,
                "a binding with {from, to} or {consumer, provider}",
            ));
        }
    }
    Ok(())
}

fn validate_endpoint(
    value: &Value,
    child_ids: &AHashSet<&str>,
    path: &str,
) -> Result<(), SchemaViolation> {
    let obj = require_object(value, path)?;
    check_keys(obj, ENDPOINT_KEYS, path)?;
    optional_string(obj, "id", &format!("{path}.id"))?;
    let source = required_string(obj, "exchangeSourceUrn", &format!("{path}.exchangeSourceUrn"))?;
    let known_source = source == THIS
        || source == ANY
        || child_ids.contains(source)
        || is_valid_uuid(source)
        || is_valid_urn(source);
    if !known_source {
        return Err(SchemaViolation::new(
            format!("{path}.exchangeSourceUrn"),
            format!("'this', 'any', a child id or a URN, found '{source}'"),
        ));
    }
    let direction = required_string(obj, "direction", &format!("{path}.direction"))?;
    if direction != "input" && direction != "output" {
        return Err(SchemaViolation::new(
            format!("{path}.direction"),
            format!("'input' or 'output', found '{direction}'"),
        ));
    }
    required_string(obj, "exchangeName", &format!("{path}.exchangeName"))?;
    if obj.contains_key("exchangeType") {
        required_string(obj, "exchangeType", &format!("{path}.exchangeType"))?;
    }
    Ok(())
}

fn require_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::new(path, "an object"))
}

fn require_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, SchemaViolation> {
    value
        .as_array()
        .ok_or_else(|| SchemaViolation::new(path, "an array"))
}

fn check_keys(obj: &Map<String, Value>, allowed: &[&str], path: &str) -> Result<(), SchemaViolation> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(extra) => Err(SchemaViolation::new(
            path,
            format!("no property '{extra}' (allowed: {})", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, SchemaViolation> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) => Err(SchemaViolation::new(path, "a non-empty string")),
        Some(_) => Err(SchemaViolation::new(path, "a string")),
        None => Err(SchemaViolation::new(path, "a required non-empty string")),
    }
}

fn optional_string(obj: &Map<String, Value>, key: &str, path: &str) -> Result<(), SchemaViolation> {
    match obj.get(key) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(SchemaViolation::new(path, "a string if present")),
    }
}

fn optional_bool(obj: &Map<String, Value>, key: &str, path: &str) -> Result<(), SchemaViolation> {
    match obj.get(key) {
        None | Some(Value::Bool(_)) => Ok(()),
        Some(_) => Err(SchemaViolation::new(path, "a boolean if present")),
    }
}

fn optional_integer(obj: &Map<String, Value>, key: &str, path: &str) -> Result<(), SchemaViolation> {
    match obj.get(key) {
        None => Ok(()),
        Some(v) if v.is_i64() => Ok(()),
        Some(_) => Err(SchemaViolation::new(path, "an integer timestamp (ms) if present")),
    }
}
