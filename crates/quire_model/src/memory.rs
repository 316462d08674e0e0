//! Rule memory: the recorded action sequence of one representation.

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;

/// Filter or layout arguments.
///
/// Values are arbitrary JSON. The map is persisted as its canonical JSON text
/// so that non-self-describing formats can carry it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params(BTreeMap<String, serde_json::Value>);

impl Params {
    /// Creates an empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Returns the argument with the given key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Returns `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of `self` with every entry of `overrides` applied on top.
    pub fn merged_with(&self, overrides: &Params) -> Params {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Params(merged)
    }

    /// Iterates over the arguments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, serde_json::Value)> for Params {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Params(iter.into_iter().collect())
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = serde_json::to_string(&self.0).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        serde_json::from_str(&text).map(Params).map_err(de::Error::custom)
    }
}

/// One step of a rule memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Run the named filter over the current content.
    Filter {
        /// Registered filter name.
        name: String,
        /// Filter arguments.
        params: Params,
    },
    /// Wrap the current content in the first layout matching `pattern`.
    Layout {
        /// Layout identifier pattern.
        pattern: String,
        /// Arguments overriding the layout filter mapping's.
        params: Params,
    },
    /// Capture the current content under `name`, written to `path` if routed.
    Snapshot {
        /// Snapshot name, unique within the memory.
        name: String,
        /// Output path, always starting with `/` once validated.
        path: Option<String>,
    },
}

/// The ordered actions that compile one representation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleMemory {
    actions: Vec<Action>,
}

impl RuleMemory {
    /// Wraps an action list.
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Returns the actions in execution order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the actions mutably, for path assignment after routing.
    pub fn actions_mut(&mut self) -> &mut [Action] {
        &mut self.actions
    }

    /// Names of all snapshots, in order.
    pub fn snapshot_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|a| match a {
            Action::Snapshot { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Returns `true` if a snapshot with this name is taken.
    pub fn has_snapshot(&self, name: &str) -> bool {
        self.snapshot_names().any(|n| n == name)
    }

    /// `(snapshot, path)` for every routed snapshot.
    pub fn paths(&self) -> BTreeMap<String, String> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Snapshot {
                    name,
                    path: Some(path),
                } => Some((name.clone(), path.clone())),
                _ => None,
            })
            .collect()
    }

    /// Names of the filters invoked directly by filter actions.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|a| match a {
            Action::Filter { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Layout patterns, in order.
    pub fn layout_patterns(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|a| match a {
            Action::Layout { pattern, .. } => Some(pattern.as_str()),
            _ => None,
        })
    }

    /// Returns the first snapshot name that occurs more than once.
    pub fn duplicate_snapshot(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.snapshot_names().find(|name| !seen.insert(*name))
    }

    /// Compares two memories while ignoring snapshot paths.
    pub fn same_actions_ignoring_paths(&self, other: &RuleMemory) -> bool {
        self.actions.len() == other.actions.len()
            && self
                .actions
                .iter()
                .zip(&other.actions)
                .all(|pair| match pair {
                    (Action::Snapshot { name: a, .. }, Action::Snapshot { name: b, .. }) => a == b,
                    (a, b) => a == b,
                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(name: &str, path: Option<&str>) -> Action {
        Action::Snapshot {
            name: name.to_string(),
            path: path.map(str::to_string),
        }
    }

    fn filter(name: &str) -> Action {
        Action::Filter {
            name: name.to_string(),
            params: Params::new(),
        }
    }

    #[test]
    fn params_roundtrip_through_bincode() {
        let params = Params::new()
            .with("toc", json!(true))
            .with("depth", json!(3))
            .with("extras", json!({"a": [1, 2]}));
        let memory = RuleMemory::new(vec![Action::Filter {
            name: "markdown".to_string(),
            params: params.clone(),
        }]);
        let config = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(&memory, config).unwrap();
        let (back, _): (RuleMemory, usize) =
            bincode::serde::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(back, memory);
    }

    #[test]
    fn merged_params_override() {
        let base = Params::new().with("a", json!(1)).with("b", json!(2));
        let over = Params::new().with("b", json!(3));
        let merged = base.merged_with(&over);
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!(3)));
    }

    #[test]
    fn paths_only_include_routed_snapshots() {
        let memory = RuleMemory::new(vec![
            snap("raw", None),
            filter("erb"),
            snap("last", Some("/index.html")),
        ]);
        let paths = memory.paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths["last"], "/index.html");
    }

    #[test]
    fn detects_duplicate_snapshot() {
        let memory = RuleMemory::new(vec![snap("raw", None), snap("x", None), snap("x", None)]);
        assert_eq!(memory.duplicate_snapshot(), Some("x"));
        let ok = RuleMemory::new(vec![snap("raw", None), snap("last", None)]);
        assert_eq!(ok.duplicate_snapshot(), None);
    }

    #[test]
    fn path_only_difference() {
        let a = RuleMemory::new(vec![filter("erb"), snap("last", Some("/a.html"))]);
        let b = RuleMemory::new(vec![filter("erb"), snap("last", Some("/b.html"))]);
        let c = RuleMemory::new(vec![filter("md"), snap("last", Some("/a.html"))]);
        assert!(a.same_actions_ignoring_paths(&b));
        assert_ne!(a, b);
        assert!(!a.same_actions_ignoring_paths(&c));
    }
}
