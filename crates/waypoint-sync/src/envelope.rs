//! Decoding change notifications delivered as JSON.
//!
//! Two shapes are accepted: a bare [`ChangeEvent`]
//! (`{"kind": "create", "name": "/urls/links/abc"}`) and a parameter-store
//! change notification, where the path and operation sit under `detail`
//! (`{"detail": {"name": "/urls/links/abc", "operation": "Update"}}`).

use serde::Deserialize;
use waypoint_core::{ChangeEvent, ChangeKind};

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Event(ChangeEvent),
    Notification { detail: Detail },
}

#[derive(Deserialize)]
struct Detail {
    name: String,
    operation: String,
}

/// Parses one notification.
///
/// Returns `Ok(None)` for notifications about operations that do not change
/// a value, such as label changes.
pub fn parse_event(raw: &str) -> Result<Option<ChangeEvent>, serde_json::Error> {
    let event = match serde_json::from_str::<Envelope>(raw)? {
        Envelope::Event(event) => Some(event),
        Envelope::Notification { detail } => {
            ChangeKind::from_operation(&detail.operation).map(|kind| ChangeEvent {
                kind,
                name: detail.name,
            })
        }
    };
    Ok(event)
}
