use crate::error::JagError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Master macro defining a taxonomy table: the enum, its wire names, display text,
/// descriptions, and the `condition` list naming which upstream entries permit it.
///
/// An empty condition list means the entry is permitted unconditionally.
macro_rules! define_taxonomy {
    (
        $(#[$meta:meta])*
        $enum_name:ident, family = $family:literal, condition = $cond:ident;
        $( $variant:ident => ($name:literal, $text:literal, $desc:literal, [$($c:ident),* $(,)?]) ),* $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $enum_name {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl $enum_name {
            /// Every entry, in table order.
            pub const ALL: &'static [$enum_name] = &[ $( $enum_name::$variant, )* ];

            /// The table this entry belongs to, used in error messages.
            pub const FAMILY: &'static str = $family;

            /// The verbatim wire name (e.g. `node.execution.sequential`).
            pub fn name(self) -> &'static str {
                match self { $( $enum_name::$variant => $name, )* }
            }

            pub fn text(self) -> &'static str {
                match self { $( $enum_name::$variant => $text, )* }
            }

            pub fn description(self) -> &'static str {
                match self { $( $enum_name::$variant => $desc, )* }
            }

            pub fn condition(self) -> &'static [$cond] {
                match self { $( $enum_name::$variant => &[ $( $cond::$c ),* ], )* }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some($enum_name::$variant), )*
                    _ => None,
                }
            }

            /// Whether this entry may be selected while the upstream field holds `upstream`.
            pub fn is_permitted_under(self, upstream: $cond) -> bool {
                let condition = self.condition();
                condition.is_empty() || condition.contains(&upstream)
            }
        }

        impl Default for $enum_name {
            fn default() -> Self {
                $enum_name::None
            }
        }

        impl fmt::Display for $enum_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $enum_name {
            type Err = JagError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| JagError::UnknownTaxonomyName {
                    family: $family,
                    name: s.to_string(),
                })
            }
        }
    };
}

define_taxonomy! {
    /// How an activity schedules its children.
    Execution, family = "execution", condition = Execution;
    None => ("node.execution.none", "None", "No execution semantics are specified.", []),
    Sequential => ("node.execution.sequential", "Sequential", "Children execute one after another, in order.", []),
    Parallel => ("node.execution.parallel", "Parallel", "Children execute concurrently; order is undefined.", []),
    Retry => ("node.execution.retry", "Retry", "Children are attempted in order until one succeeds.", []),
    Loop => ("node.execution.loop", "Loop", "Children execute in order, repeating until the activity completes.", []),
    Overlap => ("node.execution.overlap", "Overlap", "Each child starts before the previous one finishes.", []),
    ParallelX => ("node.execution.parallelx", "Parallel (exclusive)", "Children execute concurrently; the first to finish cancels the rest.", []),
}

define_taxonomy! {
    /// Which child values an activity collects as its return value.
    Returns, family = "returns", condition = Execution;
    None => ("node.returns.none", "None", "Nothing is returned.", []),
    Active => ("node.returns.active", "Active", "Values of the children currently executing.", [None, Parallel, Overlap, ParallelX]),
    Available => ("node.returns.available", "Available", "Every value produced so far.", [None, Sequential, Parallel, Loop, Overlap, ParallelX]),
    All => ("node.returns.all", "All", "The values of every child once all have finished.", [None, Sequential, Parallel, Retry, Loop, Overlap, ParallelX]),
    Latest => ("node.returns.latest", "Latest", "The most recently produced value.", [None, Sequential, Retry, Loop, Overlap]),
    Priority => ("node.returns.priority", "Priority", "The value of the highest-priority child.", [None, Parallel, ParallelX, Retry]),
    Final => ("node.returns.final", "Final", "The value of the last child to finish.", [None, Sequential, Parallel, Retry, Loop, Overlap, ParallelX]),
}

define_taxonomy! {
    /// How the collected return values are combined.
    Operator, family = "operator", condition = Returns;
    None => ("node.operator.none", "None", "Values are not combined.", []),
    And => ("node.operator.and", "And", "Logical conjunction of all values.", [Active, Available, All]),
    Or => ("node.operator.or", "Or", "Logical disjunction of all values.", [Active, Available, All]),
    First => ("node.operator.first", "First", "The first value in child order.", [Active, Available, All]),
    Last => ("node.operator.last", "Last", "The last value in child order.", [Active, Available, All]),
    Max => ("node.operator.max", "Maximum", "The largest value.", [Active, Available, All]),
    Min => ("node.operator.min", "Minimum", "The smallest value.", [Active, Available, All]),
    Sum => ("node.operator.sum", "Sum", "The sum of all values.", [Active, Available, All]),
    Avg => ("node.operator.avg", "Average", "The arithmetic mean of all values.", [Active, Available, All]),
    Union => ("node.operator.union", "Union", "Set union of all values.", [Active, Available, All]),
    Intersection => ("node.operator.intersection", "Intersection", "Set intersection of all values.", [Active, Available, All]),
    Convert => ("node.operator.convert", "Convert", "Converts the single value to the output type.", [Latest, Priority, Final]),
    Inverse => ("node.operator.inverse", "Inverse", "Multiplicative inverse of the single value.", [Latest, Priority, Final]),
    Negate => ("node.operator.negate", "Negate", "Arithmetic negation of the single value.", [Latest, Priority, Final]),
    Absolute => ("node.operator.absolute", "Absolute", "Absolute value of the single value.", [Latest, Priority, Final]),
    Not => ("node.operator.not", "Not", "Logical negation of the single value.", [Latest, Priority, Final]),
}

define_taxonomy! {
    /// What an activity does when a child fails.
    OnFail, family = "onfail", condition = Execution;
    None => ("node.onfail.none", "None", "Failure propagates unchanged.", []),
    Retry => ("node.onfail.retry", "Retry", "Re-run the failed child.", [None, Sequential, Parallel, Loop, Overlap, ParallelX]),
    Restart => ("node.onfail.restart", "Restart", "Re-run the activity from its first child.", [None, Sequential, Retry, Loop]),
    Previous => ("node.onfail.previous", "Previous", "Step back to the child before the failed one.", [None, Sequential, Loop]),
    Skip => ("node.onfail.skip", "Skip", "Ignore the failure and continue with the next child.", [None, Sequential, Parallel, Loop, Overlap, ParallelX]),
    Return => ("node.onfail.return", "Return", "Finish the activity with the values gathered so far.", []),
    Recover => ("node.onfail.recover", "Recover", "Hand control to a recovery procedure.", []),
    Abort => ("node.onfail.abort", "Abort", "Abandon the activity.", []),
}

/// Returns modes selectable under `execution`, in table order.
pub fn returns_options(execution: Execution) -> Vec<Returns> {
    Returns::ALL
        .iter()
        .copied()
        .filter(|r| r.is_permitted_under(execution))
        .collect()
}

/// Operators selectable under `returns`, in table order.
pub fn operator_options(returns: Returns) -> Vec<Operator> {
    Operator::ALL
        .iter()
        .copied()
        .filter(|o| o.is_permitted_under(returns))
        .collect()
}

/// Failure policies selectable under `execution`, in table order.
pub fn onfail_options(execution: Execution) -> Vec<OnFail> {
    OnFail::ALL
        .iter()
        .copied()
        .filter(|o| o.is_permitted_under(execution))
        .collect()
}
