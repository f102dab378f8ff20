//! Conversion between [`Activity`] and its JSON document form.
//!
//! Loading always validates first: a document that fails [`validate_jag`] is reported as
//! [`JagError::InvalidJag`] and never reaches the model.

pub mod conversion;
pub mod definition;

pub use conversion::*;
pub use definition::*;

use crate::error::{JagError, SchemaViolation};
use crate::model::Activity;
use crate::validation::{ValidationOptions, validate_jag};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, instrument};

impl Activity {
    /// The wire form of this activity. The connector is always written with all four keys
    /// and bindings always in `{id, from, to}` form.
    pub fn to_json(&self) -> ActivityJson {
        let connector = self.connector();
        let exchanges = |list: &[crate::model::Endpoint]| {
            list.iter()
                .map(|e| ExchangeJson {
                    name: e.exchange_name.clone(),
                    exchange_type: e.exchange_type.clone(),
                })
                .collect()
        };
        ActivityJson {
            urn: self.urn().to_string(),
            name: self.name().to_string(),
            description: (!self.description().is_empty()).then(|| self.description().to_string()),
            author: self.author().map(str::to_string),
            created_date: self.created_date().map(|d| d.timestamp_millis()),
            modified_date: self.modified_date().map(|d| d.timestamp_millis()),
            expected_duration: self.expected_duration(),
            kind: PLAN_TYPE.to_string(),
            connector: ConnectorJson {
                execution: connector.execution,
                returns: Some(connector.returns),
                operator: connector.operator,
                onfail: Some(connector.onfail),
            },
            inputs: exchanges(self.inputs()),
            outputs: exchanges(self.outputs()),
            children: self.children().to_vec(),
            bindings: self
                .bindings()
                .iter()
                .cloned()
                .map(BindingJson::Current)
                .collect(),
            locked_by: self.locked_by().map(str::to_string),
            is_locked: self.is_locked(),
            collapsed: self.is_collapsed(),
        }
    }

    pub fn to_value(&self) -> Result<Value, JagError> {
        serde_json::to_value(self.to_json()).map_err(|e| JagError::JsonParseError(e.to_string()))
    }

    /// Validates and loads a document, accepting the legacy connector and binding shapes.
    pub fn from_json(json: &Value) -> Result<Activity, JagError> {
        Self::from_json_with(json, &ValidationOptions::default())
    }

    #[instrument(level = "trace", skip(json))]
    pub fn from_json_with(json: &Value, options: &ValidationOptions) -> Result<Activity, JagError> {
        validate_jag(json, options).map_err(|violation| JagError::invalid_jag(violation, json))?;
        let definition: ActivityJson = serde_json::from_value(json.clone())
            .map_err(|e| JagError::JsonParseError(e.to_string()))?;
        let activity = definition.into_activity()?;
        debug!(
            activity = %activity.urn(),
            children = activity.children().len(),
            bindings = activity.bindings().len(),
            "activity loaded"
        );
        Ok(activity)
    }

    pub fn from_json_str(json: &str) -> Result<Activity, JagError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| JagError::JsonParseError(e.to_string()))?;
        Self::from_json(&value)
    }
}

impl Serialize for Activity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Loads a single activity document or an array of them. Either every activity loads or
/// the first failure is returned.
pub fn import(json: &Value) -> Result<Vec<Activity>, JagError> {
    import_with(json, &ValidationOptions::default())
}

pub fn import_with(json: &Value, options: &ValidationOptions) -> Result<Vec<Activity>, JagError> {
    match json {
        Value::Array(items) => items
            .iter()
            .map(|item| Activity::from_json_with(item, options))
            .collect(),
        Value::Object(_) => Ok(vec![Activity::from_json_with(json, options)?]),
        other => Err(JagError::invalid_jag(
            SchemaViolation::new("$", "an activity object or an array of activity objects"),
            other,
        )),
    }
}
