//! Action metadata lookup
//!
//! The owning application keeps labels, groups and enabled flags for its
//! actions. The engine only reads them through [`ActionRegistry`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata describing one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ActionInfo {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        ActionInfo {
            id: id.into(),
            label: label.into(),
            group: None,
            enabled: true,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Read access to action metadata
pub trait ActionRegistry {
    fn action(&self, id: &str) -> Option<&ActionInfo>;

    /// Unknown actions count as enabled
    fn is_enabled(&self, id: &str) -> bool {
        self.action(id).map_or(true, |info| info.enabled)
    }

    fn label(&self, id: &str) -> Option<&str> {
        self.action(id).map(|info| info.label.as_str())
    }
}

/// In-memory registry for hosts that do not bring their own
#[derive(Debug, Clone, Default)]
pub struct StaticActionRegistry {
    by_id: HashMap<String, ActionInfo>,
}

impl StaticActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an action
    pub fn register(&mut self, info: ActionInfo) {
        self.by_id.insert(info.id.clone(), info);
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if let Some(info) = self.by_id.get_mut(id) {
            info.enabled = enabled;
        }
    }

    /// Actions in a group, sorted by label
    pub fn actions_in_group(&self, group: &str) -> Vec<&ActionInfo> {
        let mut actions: Vec<&ActionInfo> = self
            .by_id
            .values()
            .filter(|info| info.group.as_deref() == Some(group))
            .collect();
        actions.sort_by(|a, b| a.label.cmp(&b.label));
        actions
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl ActionRegistry for StaticActionRegistry {
    fn action(&self, id: &str) -> Option<&ActionInfo> {
        self.by_id.get(id)
    }
}

impl FromIterator<ActionInfo> for StaticActionRegistry {
    fn from_iter<T: IntoIterator<Item = ActionInfo>>(iter: T) -> Self {
        let mut registry = StaticActionRegistry::new();
        for info in iter {
            registry.register(info);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_lookup() {
        let registry: StaticActionRegistry = [
            ActionInfo::new("editor.save", "Save").with_group("editing"),
            ActionInfo::new("editor.close", "Close").disabled(),
        ]
        .into_iter()
        .collect();

        assert!(registry.is_enabled("editor.save"));
        assert!(!registry.is_enabled("editor.close"));
        assert!(registry.is_enabled("unknown.action"));
        assert_eq!(registry.label("editor.save"), Some("Save"));
        assert_eq!(registry.actions_in_group("editing").len(), 1);
    }
}
