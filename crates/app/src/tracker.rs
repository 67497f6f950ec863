use std::{collections::HashMap, fmt};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Subject,
    Session,
    Task,
    Goal,
}

/// Dependents first: goals and tasks may point at subjects, sessions reference subjects.
pub const CLEANUP_ORDER: [ResourceKind; 4] = [
    ResourceKind::Goal,
    ResourceKind::Task,
    ResourceKind::Session,
    ResourceKind::Subject,
];

impl ResourceKind {
    /// Collection endpoint, relative to the API base URL.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Subject => "subjects",
            ResourceKind::Session => "study-sessions",
            ResourceKind::Task => "tasks",
            ResourceKind::Goal => "goals",
        }
    }

    pub fn item_path(self, id: &str) -> String {
        format!("{}/{id}", self.collection())
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Subject => "Subject",
            ResourceKind::Session => "Session",
            ResourceKind::Task => "Task",
            ResourceKind::Goal => "Goal",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    pub id: String,
}

/// Ids of everything the run created, per category, in creation order.
#[derive(Debug, Default, Clone)]
pub struct ResourceTracker {
    created: HashMap<ResourceKind, Vec<String>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, kind: ResourceKind, id: impl Into<String>) {
        self.created.entry(kind).or_default().push(id.into());
    }

    pub fn ids(&self, kind: ResourceKind) -> &[String] {
        self.created.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.ids(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.values().all(Vec::is_empty)
    }

    /// Drop one id after its DELETE succeeded. Returns false if it was not tracked.
    pub fn forget(&mut self, kind: ResourceKind, id: &str) -> bool {
        let Some(ids) = self.created.get_mut(&kind) else {
            return false;
        };
        match ids.iter().position(|tracked| tracked == id) {
            Some(index) => {
                ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Every tracked record, walking categories in cleanup order.
    pub fn records(&self) -> Vec<ResourceRecord> {
        CLEANUP_ORDER
            .iter()
            .flat_map(|kind| {
                self.ids(*kind).iter().map(|id| ResourceRecord {
                    kind: *kind,
                    id: id.clone(),
                })
            })
            .collect()
    }
}
