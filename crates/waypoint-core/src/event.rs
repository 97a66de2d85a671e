use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// What happened to a record store entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The entry was created or overwritten.
    #[serde(alias = "update")]
    Create,
    /// The entry was removed.
    Delete,
}

impl ChangeKind {
    /// Maps a parameter-store operation name (`Create`, `Update`, `Delete`).
    ///
    /// Operations that do not change the value (label or policy changes)
    /// yield `None`.
    pub fn from_operation(operation: &str) -> Option<Self> {
        if operation.eq_ignore_ascii_case("create") || operation.eq_ignore_ascii_case("update") {
            Some(ChangeKind::Create)
        } else if operation.eq_ignore_ascii_case("delete") {
            Some(ChangeKind::Delete)
        } else {
            None
        }
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Create => f.write_str("create"),
            ChangeKind::Delete => f.write_str("delete"),
        }
    }
}

/// A change notification emitted by the record store.
///
/// Carries no value. Consumers re-read the store, so late or duplicated
/// notifications still converge on the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Full path name of the entry.
    pub name: String,
}

impl ChangeEvent {
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Create,
            name: name.into(),
        }
    }

    pub fn delete(name: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            name: name.into(),
        }
    }
}

/// One item read from a change feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Change(ChangeEvent),
    /// The feed dropped this many events; consumers must reconcile.
    Lagged(u64),
}

impl From<ChangeEvent> for FeedItem {
    fn from(event: ChangeEvent) -> Self {
        FeedItem::Change(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations() {
        assert_eq!(ChangeKind::from_operation("Create"), Some(ChangeKind::Create));
        assert_eq!(ChangeKind::from_operation("Update"), Some(ChangeKind::Create));
        assert_eq!(ChangeKind::from_operation("Delete"), Some(ChangeKind::Delete));
        assert_eq!(ChangeKind::from_operation("LabelParameterVersion"), None);
    }

    #[test]
    fn constructors() {
        let event = ChangeEvent::create("/urls/links/abc");
        assert_eq!(event.kind, ChangeKind::Create);
        assert_eq!(event.name, "/urls/links/abc");
        assert_eq!(ChangeEvent::delete("x").kind, ChangeKind::Delete);
        assert_eq!(ChangeKind::Delete.to_string(), "delete");
    }

    #[test]
    fn change_events_convert_to_feed_items() {
        let item: FeedItem = ChangeEvent::delete("/urls/links/abc").into();
        assert_eq!(item, FeedItem::Change(ChangeEvent::delete("/urls/links/abc")));
    }
}
