use super::annotations::Annotations;
use serde::{Deserialize, Serialize};

/// A child activity referenced by URN, occupying one slot in its parent's child list.
///
/// The same URN may fill several slots; each slot has its own generated `id`, which is
/// what bindings, annotations and ordering address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSlot {
    pub urn: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub iterable: bool,
}

impl ChildSlot {
    pub fn new(urn: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            id: id.into(),
            name: None,
            description: None,
            annotations: Annotations::new(),
            iterable: false,
        }
    }

    /// The per-instance name if set, otherwise the URN.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.urn)
    }
}
