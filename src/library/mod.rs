//! The URN-keyed activity registry.
//!
//! Activities refer to their children by URN only. Anything that needs a child's
//! definition goes through an [`ActivityResolver`]; [`Library`] is the in-memory one.

pub mod tree;

pub use tree::*;

use crate::error::JagError;
use crate::model::Activity;
use crate::serialization::import;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde_json::Value;
use std::fs;
use tracing::{debug, info, instrument};

/// Looks up activity definitions by URN.
pub trait ActivityResolver {
    fn resolve(&self, urn: &str) -> Option<&Activity>;
}

impl ActivityResolver for AHashMap<String, Activity> {
    fn resolve(&self, urn: &str) -> Option<&Activity> {
        self.get(urn)
    }
}

/// The persistence contract storage backends implement.
pub trait ActivityStore {
    /// Adds a new activity. Fails with [`JagError::DuplicateUrn`] if the URN is taken.
    fn create(&mut self, activity: Activity) -> Result<(), JagError>;

    fn get(&self, urn: &str) -> Option<&Activity>;

    /// Replaces an existing activity. Fails with [`JagError::ActivityNotFound`] otherwise.
    fn update(&mut self, activity: Activity) -> Result<(), JagError>;

    fn delete(&mut self, urn: &str) -> Result<Activity, JagError>;
}

/// An in-memory set of activity definitions.
#[derive(Debug, Clone, Default)]
pub struct Library {
    activities: AHashMap<String, Activity>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn contains(&self, urn: &str) -> bool {
        self.activities.contains_key(urn)
    }

    pub fn get_mut(&mut self, urn: &str) -> Option<&mut Activity> {
        self.activities.get_mut(urn)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    /// All URNs in sorted order.
    pub fn urns(&self) -> Vec<&str> {
        self.activities.keys().map(String::as_str).sorted().collect()
    }

    /// Adds every activity in `json` (one document or an array). Nothing is added
    /// unless all of them load and none collides with an existing URN.
    #[instrument(level = "trace", skip(self, json))]
    pub fn import_json(&mut self, json: &Value) -> Result<Vec<String>, JagError> {
        let activities = import(json)?;
        let mut seen = AHashSet::new();
        for activity in &activities {
            if self.contains(activity.urn()) || !seen.insert(activity.urn()) {
                return Err(JagError::DuplicateUrn(activity.urn().to_string()));
            }
        }
        let urns: Vec<String> = activities.iter().map(|a| a.urn().to_string()).collect();
        for activity in activities {
            self.activities.insert(activity.urn().to_string(), activity);
        }
        debug!(count = urns.len(), "activities imported");
        Ok(urns)
    }

    /// Exports the whole library as a JSON array ordered by URN.
    pub fn to_json(&self) -> Result<Value, JagError> {
        let items = self
            .urns()
            .into_iter()
            .filter_map(|urn| self.activities.get(urn))
            .map(Activity::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(items))
    }

    /// Writes the library to `path` as pretty-printed JSON.
    #[instrument(level = "trace", skip(self))]
    pub fn save(&self, path: &str) -> Result<(), JagError> {
        let json = self.to_json()?;
        let text = serde_json::to_string_pretty(&json)
            .map_err(|e| JagError::JsonParseError(e.to_string()))?;
        fs::write(path, text).map_err(|e| JagError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        info!(path, activities = self.len(), "library saved");
        Ok(())
    }

    /// Loads a library previously written by [`Library::save`].
    #[instrument(level = "trace")]
    pub fn from_file(path: &str) -> Result<Self, JagError> {
        let text = fs::read_to_string(path).map_err(|e| JagError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let json: Value =
            serde_json::from_str(&text).map_err(|e| JagError::JsonParseError(e.to_string()))?;
        let mut library = Self::new();
        library.import_json(&json)?;
        Ok(library)
    }

    /// Adds `child_urn` as a new child slot of `parent_urn` and returns the slot id.
    ///
    /// Both activities must be in the library, and the child must not already contain
    /// the parent anywhere below it.
    pub fn add_child(&mut self, parent_urn: &str, child_urn: &str) -> Result<String, JagError> {
        if !self.contains(child_urn) {
            return Err(JagError::ActivityNotFound(child_urn.to_string()));
        }
        if !self.contains(parent_urn) {
            return Err(JagError::ActivityNotFound(parent_urn.to_string()));
        }
        if self.would_create_cycle(parent_urn, child_urn) {
            return Err(JagError::CycleDetected {
                parent_urn: parent_urn.to_string(),
                child_urn: child_urn.to_string(),
            });
        }
        let parent = self
            .activities
            .get_mut(parent_urn)
            .ok_or_else(|| JagError::ActivityNotFound(parent_urn.to_string()))?;
        Ok(parent.add_child(child_urn, None))
    }

    /// Whether nesting `child_urn` under `parent_urn` would make an activity its own
    /// ancestor.
    pub fn would_create_cycle(&self, parent_urn: &str, child_urn: &str) -> bool {
        parent_urn == child_urn || self.descendants(child_urn).contains(parent_urn)
    }

    /// Every URN reachable below `urn` through child slots, excluding `urn` itself unless
    /// it is part of a cycle.
    pub fn descendants(&self, urn: &str) -> AHashSet<String> {
        let mut seen = AHashSet::new();
        let mut stack = vec![urn.to_string()];
        while let Some(current) = stack.pop() {
            let Some(activity) = self.activities.get(&current) else {
                continue;
            };
            for child in activity.children() {
                if seen.insert(child.urn.clone()) {
                    stack.push(child.urn.clone());
                }
            }
        }
        seen
    }

    /// URNs of every activity with a child slot for `urn`, sorted.
    pub fn parents_of(&self, urn: &str) -> Vec<&str> {
        self.activities
            .values()
            .filter(|a| a.children().iter().any(|c| c.urn == urn))
            .map(Activity::urn)
            .sorted()
            .collect()
    }

    /// A printable tree of `urn` and everything nested below it.
    pub fn tree<'a>(&'a self, urn: &'a str) -> LibraryTree<'a> {
        LibraryTree::new(self, urn)
    }
}

impl ActivityResolver for Library {
    fn resolve(&self, urn: &str) -> Option<&Activity> {
        self.activities.get(urn)
    }
}

impl ActivityStore for Library {
    fn create(&mut self, activity: Activity) -> Result<(), JagError> {
        if self.contains(activity.urn()) {
            return Err(JagError::DuplicateUrn(activity.urn().to_string()));
        }
        debug!(activity = %activity.urn(), "activity created");
        self.activities.insert(activity.urn().to_string(), activity);
        Ok(())
    }

    fn get(&self, urn: &str) -> Option<&Activity> {
        self.activities.get(urn)
    }

    fn update(&mut self, mut activity: Activity) -> Result<(), JagError> {
        let Some(slot) = self.activities.get_mut(activity.urn()) else {
            return Err(JagError::ActivityNotFound(activity.urn().to_string()));
        };
        activity.touch();
        *slot = activity;
        Ok(())
    }

    fn delete(&mut self, urn: &str) -> Result<Activity, JagError> {
        debug!(activity = %urn, "activity deleted");
        self.activities
            .remove(urn)
            .ok_or_else(|| JagError::ActivityNotFound(urn.to_string()))
    }
}
