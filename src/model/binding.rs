use super::endpoint::{Endpoint, new_token};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed data-flow connection from a provider endpoint to a consumer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default = "new_token")]
    pub id: String,
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Binding {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: new_token(),
            from,
            to,
        }
    }

    pub fn same_from_endpoint(&self, endpoint: &Endpoint) -> bool {
        self.from.equals(endpoint)
    }

    pub fn same_to_endpoint(&self, endpoint: &Endpoint) -> bool {
        self.to.equals(endpoint)
    }

    /// Whether either end is owned by `source` (a child-slot id or `this`).
    pub fn touches(&self, source: &str) -> bool {
        self.from.exchange_source_urn == source || self.to.exchange_source_urn == source
    }
}

// Bindings are the same connection when both ends match; the generated id is ignored.
impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Binding {}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from.selector(), self.to.selector())
    }
}
