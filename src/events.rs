//! Change notifications emitted by [`Activity`](crate::model::Activity) mutators.
//!
//! The model does not depend on anyone listening. Views subscribe an
//! [`ActivityObserver`] and re-query the activity when notified.

use crate::model::Binding;
use crate::taxonomy::Connector;
use std::fmt;
use std::sync::Arc;

/// A single successful mutation of an activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    UrnChanged { previous: String, current: String },
    NameChanged,
    DescriptionChanged,
    ConnectorChanged(Connector),
    InputsChanged,
    OutputsChanged,
    ChildAdded { id: String, urn: String },
    ChildRemoved { id: String, urn: String, bindings_removed: usize },
    BindingAdded(Binding),
    BindingRemoved(Binding),
    AnnotationChanged { child_id: String, name: String },
    IterableChanged { child_id: String, iterable: bool },
    MetadataChanged,
}

/// Receives events for the activity it is subscribed to.
pub trait ActivityObserver: Send + Sync {
    fn notify(&self, urn: &str, event: &ActivityEvent);
}

impl<F> ActivityObserver for F
where
    F: Fn(&str, &ActivityEvent) + Send + Sync,
{
    fn notify(&self, urn: &str, event: &ActivityEvent) {
        self(urn, event)
    }
}

/// The observer list carried by an activity. Clones share the same observers.
#[derive(Clone, Default)]
pub struct Observers(Vec<Arc<dyn ActivityObserver>>);

impl Observers {
    pub fn push(&mut self, observer: Arc<dyn ActivityObserver>) {
        self.0.push(observer);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn emit(&self, urn: &str, event: ActivityEvent) {
        for observer in &self.0 {
            observer.notify(urn, &event);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observers({})", self.0.len())
    }
}
