use super::definition::{ActivityJson, BindingJson, ConnectorJson, ExchangeJson, LegacyBindingJson};
use crate::error::JagError;
use crate::model::{ANY_TYPE, Activity, Binding, Direction, Endpoint, THIS};
use crate::taxonomy::{Connector, OnFail, Operator, Returns, returns_options};
use chrono::{DateTime, Utc};
use tracing::warn;

/// A trait for document formats that can be turned into an [`Activity`].
///
/// This is the extension point for importing activities from formats other than the
/// canonical wire JSON. Implement it on your own deserialized structs to provide the
/// translation.
///
/// # Example
///
/// ```rust,no_run
/// use jag::prelude::*;
///
/// struct Task { id: String, title: String }
///
/// impl IntoActivity for Task {
///     fn into_activity(self) -> std::result::Result<Activity, JagError> {
///         Activity::builder(&format!("urn:tasks:{}", self.id), self.title)
///             .execution(Execution::Sequential)
///             .build()
///     }
/// }
/// ```
pub trait IntoActivity {
    /// Consumes the object and converts it into an activity.
    fn into_activity(self) -> Result<Activity, JagError>;
}

impl IntoActivity for ActivityJson {
    fn into_activity(self) -> Result<Activity, JagError> {
        let urn = self.urn;
        let connector = migrate_connector(&urn, self.connector);

        let mut builder = Activity::builder(&urn, self.name)
            .connector(connector)
            .created_date(self.created_date.and_then(DateTime::<Utc>::from_timestamp_millis))
            .modified_date(self.modified_date.and_then(DateTime::<Utc>::from_timestamp_millis))
            .locked_by(self.locked_by, self.is_locked)
            .collapsed(self.collapsed);

        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(author) = self.author {
            builder = builder.author(author);
        }
        if let Some(duration) = self.expected_duration {
            builder = builder.expected_duration(duration);
        }
        for input in &self.inputs {
            builder = builder.input(input.name.clone(), input.exchange_type.clone());
        }
        for output in &self.outputs {
            builder = builder.output(output.name.clone(), output.exchange_type.clone());
        }
        for child in self.children {
            builder = builder.child(child);
        }
        for binding in self.bindings {
            let binding = match binding {
                BindingJson::Current(binding) => binding,
                BindingJson::Legacy(legacy) => {
                    migrate_binding(&urn, legacy, &self.inputs, &self.outputs)
                }
            };
            builder = builder.binding(binding);
        }

        builder.build()
    }
}

/// Fills in the fields older connector shapes lack. A missing `returns` becomes the first
/// mode (preferring `ALL`) that carries the stored operator under the stored execution.
fn migrate_connector(urn: &str, json: ConnectorJson) -> Connector {
    let returns = match json.returns {
        Some(returns) => returns,
        None => {
            let returns = if json.operator == Operator::None {
                Returns::None
            } else {
                std::iter::once(Returns::All)
                    .chain(returns_options(json.execution))
                    .find(|r| r.is_permitted_under(json.execution) && json.operator.is_permitted_under(*r))
                    .unwrap_or(Returns::None)
            };
            warn!(activity = %urn, returns = %returns, "connector without returns migrated");
            returns
        }
    };
    Connector::new(
        json.execution,
        returns,
        json.operator,
        json.onfail.unwrap_or(OnFail::None),
    )
}

/// Rewrites a `{consumer, provider}` binding as endpoints. `this` as provider is an
/// activity input and as consumer an activity output; child ids read child outputs and
/// feed child inputs.
fn migrate_binding(
    urn: &str,
    legacy: LegacyBindingJson,
    inputs: &[ExchangeJson],
    outputs: &[ExchangeJson],
) -> Binding {
    let type_of = |exchanges: &[ExchangeJson], name: &str| {
        exchanges
            .iter()
            .find(|e| e.name == name)
            .map_or_else(|| ANY_TYPE.to_string(), |e| e.exchange_type.clone())
    };

    let provider = legacy.provider;
    let from = if provider.id == THIS {
        let ty = type_of(inputs, &provider.property);
        Endpoint::new(THIS, Direction::Input, provider.property, ty)
    } else {
        Endpoint::new(provider.id, Direction::Output, provider.property, ANY_TYPE)
    };

    let consumer = legacy.consumer;
    let to = if consumer.id == THIS {
        let ty = type_of(outputs, &consumer.property);
        Endpoint::new(THIS, Direction::Output, consumer.property, ty)
    } else {
        Endpoint::new(consumer.id, Direction::Input, consumer.property, ANY_TYPE)
    };

    warn!(activity = %urn, from = %from.selector(), to = %to.selector(), "legacy binding migrated");
    Binding::new(from, to)
}
