use super::annotations::Annotations;
use super::binding::Binding;
use super::child::ChildSlot;
use super::endpoint::{ANY, ANY_TYPE, Direction, Endpoint, THIS, new_token};
use crate::error::{ConnectorViolation, JagError};
use crate::events::{ActivityEvent, ActivityObserver, Observers};
use crate::library::ActivityResolver;
use crate::taxonomy::{
    Connector, Execution, OnFail, Operator, Returns, onfail_options, operator_options,
    returns_options,
};
use crate::validation::is_valid_urn;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// What an id passed to [`Activity::canonical_node`] resolves to.
#[derive(Debug, Clone, Copy)]
pub enum CanonicalNode<'a> {
    This(&'a Activity),
    Child(&'a ChildSlot),
}

/// A Joint Activity Graph node definition.
///
/// Children are held by reference (URN plus a per-slot id); their definitions are looked
/// up through an [`ActivityResolver`] whenever an operation needs their exchanges.
///
/// Mutators never fail on stale ids: removing or annotating something that is not there
/// is a no-op. Only [`Activity::set_urn`] and deserialization can return errors.
#[derive(Debug, Clone)]
pub struct Activity {
    urn: String,
    name: String,
    description: String,
    connector: Connector,
    inputs: Vec<Endpoint>,
    outputs: Vec<Endpoint>,
    children: Vec<ChildSlot>,
    bindings: Vec<Binding>,
    author: Option<String>,
    created_date: Option<DateTime<Utc>>,
    modified_date: Option<DateTime<Utc>>,
    expected_duration: Option<f64>,
    locked_by: Option<String>,
    is_locked: bool,
    collapsed: bool,
    observers: Observers,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            urn: String::new(),
            name: String::new(),
            description: String::new(),
            connector: Connector::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            children: Vec::new(),
            bindings: Vec::new(),
            author: None,
            created_date: None,
            modified_date: None,
            expected_duration: None,
            locked_by: None,
            is_locked: false,
            collapsed: false,
            observers: Observers::default(),
        }
    }
}

impl Activity {
    /// Creates an empty activity stamped with the current time.
    pub fn new(urn: &str, name: impl Into<String>) -> Result<Self, JagError> {
        ActivityBuilder::new(urn, name).build()
    }

    pub fn builder(urn: &str, name: impl Into<String>) -> ActivityBuilder {
        ActivityBuilder::new(urn, name)
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ActivityObserver>) {
        self.observers.push(observer);
    }

    fn emit(&self, event: ActivityEvent) {
        self.observers.emit(&self.urn, event);
    }

    // --- Identity and description ---

    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Sets the URN. Once a valid URN is in place it can no longer change.
    pub fn set_urn(&mut self, urn: &str) -> Result<(), JagError> {
        if urn == self.urn {
            return Ok(());
        }
        if is_valid_urn(&self.urn) {
            return Err(JagError::UrnLocked {
                current: self.urn.clone(),
                requested: urn.to_string(),
            });
        }
        if !is_valid_urn(urn) {
            return Err(JagError::InvalidUrn(urn.to_string()));
        }
        let previous = std::mem::replace(&mut self.urn, urn.to_string());
        self.emit(ActivityEvent::UrnChanged {
            previous,
            current: self.urn.clone(),
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.name {
            self.name = name;
            self.emit(ActivityEvent::NameChanged);
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        if description != self.description {
            self.description = description;
            self.emit(ActivityEvent::DescriptionChanged);
        }
    }

    // --- Connector ---

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn execution(&self) -> Execution {
        self.connector.execution
    }

    pub fn returns(&self) -> Returns {
        self.connector.returns
    }

    pub fn operator(&self) -> Operator {
        self.connector.operator
    }

    pub fn onfail(&self) -> OnFail {
        self.connector.onfail
    }

    /// Changes the execution mode, coercing the dependent connector fields. An activity
    /// with children keeps an aggregating operator.
    pub fn set_execution(&mut self, execution: Execution) {
        let before = self.connector;
        self.connector.set_execution(execution);
        if !self.children.is_empty() {
            self.connector.ensure_aggregating();
        }
        if self.connector != before {
            self.emit(ActivityEvent::ConnectorChanged(self.connector));
        }
    }

    /// Sets the returns mode if the current execution permits it. With children present
    /// the mode must carry some operator; if the current one is cleared, the first
    /// operator the new mode permits takes its place.
    pub fn set_returns(&mut self, returns: Returns) -> bool {
        let replacement = operator_options(returns)
            .into_iter()
            .find(|o| *o != Operator::None);
        if !self.children.is_empty() && replacement.is_none() {
            return false;
        }
        let before = self.connector;
        if !self.connector.set_returns(returns) {
            return false;
        }
        if !self.children.is_empty() && self.connector.operator == Operator::None {
            if let Some(operator) = replacement {
                self.connector.operator = operator;
            }
        }
        if self.connector != before {
            self.emit(ActivityEvent::ConnectorChanged(self.connector));
        }
        true
    }

    /// Sets the operator if the current returns mode permits it. `NONE` is refused while
    /// the activity has children.
    pub fn set_operator(&mut self, operator: Operator) -> bool {
        if operator == Operator::None && !self.children.is_empty() {
            return false;
        }
        let before = self.connector;
        if !self.connector.set_operator(operator) {
            return false;
        }
        if self.connector != before {
            self.emit(ActivityEvent::ConnectorChanged(self.connector));
        }
        true
    }

    pub fn set_onfail(&mut self, onfail: OnFail) -> bool {
        let before = self.connector;
        if !self.connector.set_onfail(onfail) {
            return false;
        }
        if self.connector != before {
            self.emit(ActivityEvent::ConnectorChanged(self.connector));
        }
        true
    }

    pub fn returns_options(&self) -> Vec<Returns> {
        returns_options(self.connector.execution)
    }

    pub fn operator_options(&self) -> Vec<Operator> {
        operator_options(self.connector.returns)
    }

    pub fn onfail_options(&self) -> Vec<OnFail> {
        onfail_options(self.connector.execution)
    }

    // --- Inputs and outputs ---

    pub fn inputs(&self) -> &[Endpoint] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Endpoint] {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&Endpoint> {
        self.inputs.iter().find(|e| e.identity() == name)
    }

    pub fn output(&self, name: &str) -> Option<&Endpoint> {
        self.outputs.iter().find(|e| e.identity() == name)
    }

    /// Adds an input, replacing any existing input with the same name.
    pub fn add_input(&mut self, input: Endpoint) {
        let endpoint = self.own_endpoint(input, Direction::Input);
        upsert(&mut self.inputs, endpoint);
        self.emit(ActivityEvent::InputsChanged);
    }

    pub fn add_output(&mut self, output: Endpoint) {
        let endpoint = self.own_endpoint(output, Direction::Output);
        upsert(&mut self.outputs, endpoint);
        self.emit(ActivityEvent::OutputsChanged);
    }

    /// Removes the named input and every binding that reads from it.
    pub fn remove_input(&mut self, identity: &str) {
        let before = self.inputs.len();
        self.inputs.retain(|e| e.identity() != identity);
        if self.inputs.len() != before {
            self.drop_bindings_at(THIS, Direction::Input, identity);
            self.emit(ActivityEvent::InputsChanged);
        }
    }

    /// Removes the named output and every binding that feeds it.
    pub fn remove_output(&mut self, identity: &str) {
        let before = self.outputs.len();
        self.outputs.retain(|e| e.identity() != identity);
        if self.outputs.len() != before {
            self.drop_bindings_at(THIS, Direction::Output, identity);
            self.emit(ActivityEvent::OutputsChanged);
        }
    }

    fn own_endpoint(&self, mut endpoint: Endpoint, direction: Direction) -> Endpoint {
        endpoint.direction = direction;
        endpoint.exchange_source_urn = self.urn.clone();
        endpoint
    }

    fn drop_bindings_at(&mut self, source: &str, direction: Direction, name: &str) {
        let (removed, kept): (Vec<Binding>, Vec<Binding>) = std::mem::take(&mut self.bindings)
            .into_iter()
            .partition(|b| b.from.is(source, direction, name) || b.to.is(source, direction, name));
        self.bindings = kept;
        for binding in removed {
            debug!(activity = %self.urn, binding = %binding, "binding removed with its endpoint");
            self.emit(ActivityEvent::BindingRemoved(binding));
        }
    }

    // --- Children ---

    pub fn children(&self) -> &[ChildSlot] {
        &self.children
    }

    pub fn child(&self, id: &str) -> Option<&ChildSlot> {
        self.children.iter().find(|c| c.id == id)
    }

    fn child_mut(&mut self, id: &str) -> Option<&mut ChildSlot> {
        self.children.iter_mut().find(|c| c.id == id)
    }

    /// Appends a child slot for `urn` and returns its generated id.
    ///
    /// When `id` is supplied the slot is assumed to exist already (an edge being rebuilt
    /// from storage) and nothing is added.
    pub fn add_child(&mut self, urn: &str, id: Option<&str>) -> String {
        if let Some(id) = id {
            return id.to_string();
        }
        let id = new_token();
        self.children.push(ChildSlot::new(urn, id.clone()));
        debug!(activity = %self.urn, child = %urn, id = %id, "child added");
        self.emit(ActivityEvent::ChildAdded {
            id: id.clone(),
            urn: urn.to_string(),
        });
        if self.connector.ensure_aggregating() {
            self.emit(ActivityEvent::ConnectorChanged(self.connector));
        }
        id
    }

    /// Removes the child slot and every binding into or out of it.
    pub fn remove_child(&mut self, child_id: &str) -> Option<ChildSlot> {
        let index = self.children.iter().position(|c| c.id == child_id)?;
        let child = self.children.remove(index);

        let (removed, kept): (Vec<Binding>, Vec<Binding>) = std::mem::take(&mut self.bindings)
            .into_iter()
            .partition(|b| b.touches(child_id));
        self.bindings = kept;

        debug!(
            activity = %self.urn,
            child = %child.urn,
            id = %child_id,
            bindings_removed = removed.len(),
            "child removed"
        );
        let bindings_removed = removed.len();
        for binding in removed {
            self.emit(ActivityEvent::BindingRemoved(binding));
        }
        self.emit(ActivityEvent::ChildRemoved {
            id: child.id.clone(),
            urn: child.urn.clone(),
            bindings_removed,
        });
        Some(child)
    }

    /// Resolves `this` to the activity itself, anything else to the child slot with that id.
    pub fn canonical_node(&self, id: &str) -> Option<CanonicalNode<'_>> {
        if id == THIS {
            return Some(CanonicalNode::This(self));
        }
        self.child(id).map(CanonicalNode::Child)
    }

    /// 1-based position of the child, or 0 when execution is parallel or the id is unknown.
    pub fn order_for_id(&self, id: &str) -> usize {
        if self.connector.execution == Execution::Parallel {
            return 0;
        }
        self.children
            .iter()
            .position(|c| c.id == id)
            .map_or(0, |index| index + 1)
    }

    pub fn add_annotation(&mut self, id: &str, name: &str, value: Value) {
        if id == THIS {
            return;
        }
        let Some(child) = self.child_mut(id) else {
            return;
        };
        child.annotations.set(name, value);
        self.emit(ActivityEvent::AnnotationChanged {
            child_id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn remove_annotation(&mut self, id: &str, name: &str) {
        if id == THIS {
            return;
        }
        let removed = self
            .child_mut(id)
            .and_then(|child| child.annotations.remove(name))
            .is_some();
        if removed {
            self.emit(ActivityEvent::AnnotationChanged {
                child_id: id.to_string(),
                name: name.to_string(),
            });
        }
    }

    pub fn annotations(&self, id: &str) -> Option<&Annotations> {
        self.child(id).map(|c| &c.annotations)
    }

    pub fn set_iterable(&mut self, id: &str, iterable: bool) {
        let Some(child) = self.child_mut(id) else {
            return;
        };
        if child.iterable == iterable {
            return;
        }
        child.iterable = iterable;
        self.emit(ActivityEvent::IterableChanged {
            child_id: id.to_string(),
            iterable,
        });
    }

    /// Sets the per-instance name and description of a child slot.
    pub fn set_child_details(&mut self, id: &str, name: Option<String>, description: Option<String>) {
        let Some(child) = self.child_mut(id) else {
            return;
        };
        child.name = name;
        child.description = description;
        self.emit(ActivityEvent::MetadataChanged);
    }

    // --- Bindings ---

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Adds a binding unless an equal `(from, to)` pair already exists.
    pub fn add_binding(&mut self, binding: Binding) -> bool {
        if self.bindings.contains(&binding) {
            debug!(activity = %self.urn, binding = %binding, "duplicate binding ignored");
            return false;
        }
        debug!(activity = %self.urn, binding = %binding, "binding added");
        self.bindings.push(binding.clone());
        self.emit(ActivityEvent::BindingAdded(binding));
        true
    }

    /// Removes the binding `from -> to`, or every binding out of `from` when `to` is `None`.
    ///
    /// Returns how many bindings were removed.
    pub fn remove_binding(&mut self, from: &Endpoint, to: Option<&Endpoint>) -> usize {
        let (removed, kept): (Vec<Binding>, Vec<Binding>) = std::mem::take(&mut self.bindings)
            .into_iter()
            .partition(|b| b.same_from_endpoint(from) && to.is_none_or(|to| b.same_to_endpoint(to)));
        self.bindings = kept;
        let count = removed.len();
        for binding in removed {
            debug!(activity = %self.urn, binding = %binding, "binding removed");
            self.emit(ActivityEvent::BindingRemoved(binding));
        }
        count
    }

    /// Whether any binding reads from `(source, direction, name)`.
    pub fn is_bound(&self, source: &str, direction: Direction, name: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.from.is(source, direction, name))
    }

    pub fn bindings_from(&self, endpoint: &Endpoint) -> Vec<&Binding> {
        self.bindings
            .iter()
            .filter(|b| b.same_from_endpoint(endpoint))
            .collect()
    }

    pub fn bindings_to(&self, endpoint: &Endpoint) -> Vec<&Binding> {
        self.bindings
            .iter()
            .filter(|b| b.same_to_endpoint(endpoint))
            .collect()
    }

    // --- Binding endpoint resolution ---

    fn own_inputs_as_providers(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.inputs.iter().map(|e| e.rebased(THIS))
    }

    fn child_exchanges<R: ActivityResolver + ?Sized>(
        &self,
        child: &ChildSlot,
        direction: Direction,
        resolver: &R,
    ) -> Vec<Endpoint> {
        let Some(definition) = resolver.resolve(&child.urn) else {
            return Vec::new();
        };
        let exchanges = match direction {
            Direction::Input => definition.inputs(),
            Direction::Output => definition.outputs(),
        };
        exchanges.iter().map(|e| e.rebased(&child.id)).collect()
    }

    /// Providers a child may bind its inputs from: this activity's inputs, plus, under
    /// sequential execution only, the outputs of every child placed before it.
    pub fn inputs_to<R: ActivityResolver + ?Sized>(&self, child_id: &str, resolver: &R) -> Vec<Endpoint> {
        let mut available: Vec<Endpoint> = self.own_inputs_as_providers().collect();
        if self.connector.execution == Execution::Sequential {
            let upper = self
                .children
                .iter()
                .position(|c| c.id == child_id)
                .unwrap_or(0);
            for child in &self.children[..upper] {
                available.extend(self.child_exchanges(child, Direction::Output, resolver));
            }
        }
        available
    }

    /// Providers this activity's own outputs may bind from: its inputs (pass-through),
    /// every child's outputs, and, with an aggregating operator, one `any`-sourced
    /// endpoint per distinct child output name standing for the combined value.
    pub fn available_outputs<R: ActivityResolver + ?Sized>(&self, resolver: &R) -> Vec<Endpoint> {
        let mut available: Vec<Endpoint> = self.own_inputs_as_providers().collect();
        let child_outputs: Vec<Endpoint> = self
            .children
            .iter()
            .flat_map(|child| self.child_exchanges(child, Direction::Output, resolver))
            .collect();

        if self.connector.operator != Operator::None {
            let aggregates = child_outputs
                .iter()
                .into_group_map_by(|e| e.exchange_name.clone());
            for name in child_outputs.iter().map(|e| &e.exchange_name).unique() {
                let group = &aggregates[name];
                let exchange_type = if group.iter().map(|e| &e.exchange_type).all_equal() {
                    group[0].exchange_type.clone()
                } else {
                    ANY_TYPE.to_string()
                };
                available.push(Endpoint::output(ANY, name.clone(), exchange_type));
            }
        }

        available.extend(child_outputs);
        available
    }

    /// Whether `binding` connects a legal provider to an existing consumer.
    pub fn is_legal_binding<R: ActivityResolver + ?Sized>(&self, binding: &Binding, resolver: &R) -> bool {
        let to = &binding.to;
        if to.exchange_source_urn == THIS {
            return to.direction == Direction::Output
                && self.output(&to.exchange_name).is_some()
                && self.available_outputs(resolver).contains(&binding.from);
        }
        if to.direction != Direction::Input || binding.from.exchange_source_urn == to.exchange_source_urn {
            return false;
        }
        let Some(child) = self.child(&to.exchange_source_urn) else {
            return false;
        };
        let consumer_exists = self
            .child_exchanges(child, Direction::Input, resolver)
            .contains(to);
        consumer_exists && self.inputs_to(&child.id, resolver).contains(&binding.from)
    }

    /// Every consumer `from` may legally be bound to.
    pub fn bindable_targets<R: ActivityResolver + ?Sized>(&self, from: &Endpoint, resolver: &R) -> Vec<Endpoint> {
        let mut candidates: Vec<Endpoint> = self.outputs.iter().map(|e| e.rebased(THIS)).collect();
        for child in &self.children {
            candidates.extend(self.child_exchanges(child, Direction::Input, resolver));
        }
        candidates
            .into_iter()
            .filter(|to| self.is_legal_binding(&Binding::new(from.clone(), to.clone()), resolver))
            .collect()
    }

    /// Resolves a `source/direction:name` selector to the canonical endpoint it names.
    pub fn find_endpoint<R: ActivityResolver + ?Sized>(&self, selector: &str, resolver: &R) -> Option<Endpoint> {
        let (source, direction, name) = Endpoint::parse_selector(selector)?;
        match source {
            THIS => {
                let exchanges = match direction {
                    Direction::Input => &self.inputs,
                    Direction::Output => &self.outputs,
                };
                exchanges
                    .iter()
                    .find(|e| e.identity() == name)
                    .map(|e| e.rebased(THIS))
            }
            ANY => self
                .available_outputs(resolver)
                .into_iter()
                .find(|e| e.is(source, direction, name)),
            child_id => {
                let child = self.child(child_id)?;
                self.child_exchanges(child, direction, resolver)
                    .into_iter()
                    .find(|e| e.identity() == name)
            }
        }
    }

    // --- Workflow metadata ---

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn set_author(&mut self, author: Option<String>) {
        self.author = author;
        self.emit(ActivityEvent::MetadataChanged);
    }

    pub fn created_date(&self) -> Option<DateTime<Utc>> {
        self.created_date
    }

    pub fn modified_date(&self) -> Option<DateTime<Utc>> {
        self.modified_date
    }

    /// Records a modification at the current time.
    pub fn touch(&mut self) {
        self.modified_date = Some(Utc::now());
        self.emit(ActivityEvent::MetadataChanged);
    }

    pub fn expected_duration(&self) -> Option<f64> {
        self.expected_duration
    }

    pub fn set_expected_duration(&mut self, duration: Option<f64>) {
        self.expected_duration = duration;
        self.emit(ActivityEvent::MetadataChanged);
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn locked_by(&self) -> Option<&str> {
        self.locked_by.as_deref()
    }

    /// Marks the activity as locked. Advisory only; mutators do not consult it.
    pub fn lock(&mut self, by: impl Into<String>) {
        self.is_locked = true;
        self.locked_by = Some(by.into());
        self.emit(ActivityEvent::MetadataChanged);
    }

    pub fn unlock(&mut self) {
        self.is_locked = false;
        self.locked_by = None;
        self.emit(ActivityEvent::MetadataChanged);
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        self.emit(ActivityEvent::MetadataChanged);
    }
}

fn upsert(list: &mut Vec<Endpoint>, endpoint: Endpoint) {
    match list.iter_mut().find(|e| e.identity() == endpoint.identity()) {
        Some(existing) => *existing = endpoint,
        None => list.push(endpoint),
    }
}

/// Builds an [`Activity`] from parts, checking the URN and applying the
/// children-imply-operator rule once at the end.
///
/// Connector values are recorded as requested and applied in execution, returns,
/// operator, onfail order by [`build`](Self::build), so call order does not matter.
pub struct ActivityBuilder {
    urn: String,
    activity: Activity,
    execution: Option<Execution>,
    returns: Option<Returns>,
    operator: Option<Operator>,
    onfail: Option<OnFail>,
}

impl ActivityBuilder {
    pub fn new(urn: &str, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            urn: urn.to_string(),
            activity: Activity {
                name: name.into(),
                created_date: Some(now),
                modified_date: Some(now),
                ..Activity::default()
            },
            execution: None,
            returns: None,
            operator: None,
            onfail: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.activity.description = description.into();
        self
    }

    pub fn connector(mut self, connector: Connector) -> Self {
        self.activity.connector = connector;
        self
    }

    pub fn execution(mut self, execution: Execution) -> Self {
        self.execution = Some(execution);
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.returns = Some(returns);
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn onfail(mut self, onfail: OnFail) -> Self {
        self.onfail = Some(onfail);
        self
    }

    pub fn input(mut self, name: impl Into<String>, exchange_type: impl Into<String>) -> Self {
        upsert(
            &mut self.activity.inputs,
            Endpoint::input(self.urn.clone(), name, exchange_type),
        );
        self
    }

    pub fn output(mut self, name: impl Into<String>, exchange_type: impl Into<String>) -> Self {
        upsert(
            &mut self.activity.outputs,
            Endpoint::output(self.urn.clone(), name, exchange_type),
        );
        self
    }

    pub fn child(mut self, slot: ChildSlot) -> Self {
        self.activity.children.push(slot);
        self
    }

    pub fn binding(mut self, binding: Binding) -> Self {
        if !self.activity.bindings.contains(&binding) {
            self.activity.bindings.push(binding);
        }
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.activity.author = Some(author.into());
        self
    }

    pub fn created_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.activity.created_date = date;
        self
    }

    pub fn modified_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.activity.modified_date = date;
        self
    }

    pub fn expected_duration(mut self, duration: f64) -> Self {
        self.activity.expected_duration = Some(duration);
        self
    }

    pub fn locked_by(mut self, locked_by: Option<String>, is_locked: bool) -> Self {
        self.activity.locked_by = locked_by;
        self.activity.is_locked = is_locked;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.activity.collapsed = collapsed;
        self
    }

    pub fn build(self) -> Result<Activity, JagError> {
        if !is_valid_urn(&self.urn) {
            return Err(JagError::InvalidUrn(self.urn));
        }
        let mut activity = self.activity;
        activity.urn = self.urn;
        apply_requested(
            &mut activity.connector,
            self.execution,
            self.returns,
            self.operator,
            self.onfail,
        )?;
        if !activity.children.is_empty() {
            activity.connector.ensure_aggregating();
        }
        Ok(activity)
    }
}

/// Applies builder-requested connector values on top of `connector`, failing on the
/// first value the upstream setting does not permit.
fn apply_requested(
    connector: &mut Connector,
    execution: Option<Execution>,
    returns: Option<Returns>,
    operator: Option<Operator>,
    onfail: Option<OnFail>,
) -> Result<(), ConnectorViolation> {
    if let Some(execution) = execution {
        connector.set_execution(execution);
    }
    if let Some(returns) = returns {
        if !connector.set_returns(returns) {
            return Err(ConnectorViolation::Returns {
                returns: returns.name().to_string(),
                execution: connector.execution.name().to_string(),
            });
        }
    }
    if let Some(operator) = operator {
        if !connector.set_operator(operator) {
            return Err(ConnectorViolation::Operator {
                operator: operator.name().to_string(),
                returns: connector.returns.name().to_string(),
            });
        }
    }
    if let Some(onfail) = onfail {
        if !connector.set_onfail(onfail) {
            return Err(ConnectorViolation::OnFail {
                onfail: onfail.name().to_string(),
                execution: connector.execution.name().to_string(),
            });
        }
    }
    Ok(())
}
