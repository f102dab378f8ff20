use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Source token addressing the activity's own inputs and outputs inside bindings.
pub const THIS: &str = "this";

/// Source token for the operator-combined value of all children.
pub const ANY: &str = "any";

/// Type assigned to exchanges whose type is unknown or mixed.
pub const ANY_TYPE: &str = "any";

pub(crate) fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn any_type() -> String {
    ANY_TYPE.to_string()
}

/// Whether an endpoint consumes or produces data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "input" => Some(Direction::Input),
            "output" => Some(Direction::Output),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exchange point (an input or output) on an activity.
///
/// `exchange_source_urn` names the owner: the activity URN for an activity's declared
/// exchanges, and [`THIS`], [`ANY`] or a child-slot id once the endpoint is used inside a
/// binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default = "new_token")]
    pub id: String,
    pub exchange_source_urn: String,
    pub direction: Direction,
    pub exchange_name: String,
    #[serde(default = "any_type")]
    pub exchange_type: String,
}

// Equality covers the owner, direction and name only, so a binding survives a change of
// the exchange type. `id` is excluded too.
impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.exchange_source_urn == other.exchange_source_urn
            && self.direction == other.direction
            && self.exchange_name == other.exchange_name
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.exchange_source_urn.hash(state);
        self.direction.hash(state);
        self.exchange_name.hash(state);
    }
}

impl Endpoint {
    pub fn new(
        source: impl Into<String>,
        direction: Direction,
        name: impl Into<String>,
        exchange_type: impl Into<String>,
    ) -> Self {
        Self {
            id: new_token(),
            exchange_source_urn: source.into(),
            direction,
            exchange_name: name.into(),
            exchange_type: exchange_type.into(),
        }
    }

    pub fn input(source: impl Into<String>, name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(source, Direction::Input, name, ty)
    }

    pub fn output(source: impl Into<String>, name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(source, Direction::Output, name, ty)
    }

    pub fn equals(&self, other: &Endpoint) -> bool {
        self == other
    }

    /// The endpoint's identity within its owner and direction.
    pub fn identity(&self) -> &str {
        &self.exchange_name
    }

    /// A copy of this endpoint owned by `source`, keeping name, direction and type.
    pub fn rebased(&self, source: impl Into<String>) -> Self {
        Self::new(
            source,
            self.direction,
            self.exchange_name.clone(),
            self.exchange_type.clone(),
        )
    }

    /// Whether this endpoint is addressed by `(source, direction, name)`.
    pub fn is(&self, source: &str, direction: Direction, name: &str) -> bool {
        self.exchange_source_urn == source
            && self.direction == direction
            && self.exchange_name == name
    }

    /// The textual `source/direction:name` encoding used by selection widgets.
    pub fn selector(&self) -> String {
        format!(
            "{}/{}:{}",
            self.exchange_source_urn, self.direction, self.exchange_name
        )
    }

    /// Splits a `source/direction:name` selector into its parts.
    ///
    /// The source may itself contain `/` or `:` (URNs do), so the split happens at the
    /// last `/` followed by a recognized direction.
    pub fn parse_selector(selector: &str) -> Option<(&str, Direction, &str)> {
        selector.rmatch_indices('/').find_map(|(slash, _)| {
            let source = &selector[..slash];
            let (direction, name) = selector[slash + 1..].split_once(':')?;
            let direction = Direction::parse(direction)?;
            if source.is_empty() || name.is_empty() {
                return None;
            }
            Some((source, direction, name))
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.selector(), self.exchange_type)
    }
}
