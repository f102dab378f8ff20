use crate::model::{Binding, ChildSlot};
use crate::taxonomy::{Execution, OnFail, Operator, Returns};
use serde::{Deserialize, Serialize};

/// The constant `type` tag carried by every persisted activity.
pub const PLAN_TYPE: &str = "node.type.plan";

fn plan_type() -> String {
    PLAN_TYPE.to_string()
}

/// The wire/storage form of an [`Activity`](crate::model::Activity).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityJson {
    pub urn: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<f64>,
    #[serde(rename = "type", default = "plan_type")]
    pub kind: String,
    pub connector: ConnectorJson,
    #[serde(default)]
    pub inputs: Vec<ExchangeJson>,
    #[serde(default)]
    pub outputs: Vec<ExchangeJson>,
    #[serde(default)]
    pub children: Vec<ChildSlot>,
    #[serde(default)]
    pub bindings: Vec<BindingJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub collapsed: bool,
}

/// Connector fields, listed individually. `returns` and `onfail` are absent in older
/// documents and always present in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorJson {
    pub execution: Execution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Returns>,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onfail: Option<OnFail>,
}

/// A declared input or output: `{name, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeJson {
    pub name: String,
    #[serde(rename = "type")]
    pub exchange_type: String,
}

/// Either binding shape found in stored documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindingJson {
    Current(Binding),
    Legacy(LegacyBindingJson),
}

/// The older `{consumer, provider}` binding shape, read on import only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBindingJson {
    pub consumer: LegacyEndpointJson,
    pub provider: LegacyEndpointJson,
}

/// `{id, property}` where `id` is `this` or a child-slot id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEndpointJson {
    pub id: String,
    pub property: String,
}
