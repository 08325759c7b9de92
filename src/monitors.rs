use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Rect;

/// Opaque monitor identity. On Windows this is the GDI device name
/// (`\\.\DISPLAY1`), which survives resolution changes but not unplugging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorId(pub String);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub id: MonitorId,
    pub rect: Rect,
    pub scale_factor: f64,
    pub is_primary: bool,
}

impl MonitorInfo {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: MonitorId(id.into()),
            rect,
            scale_factor: 1.0,
            is_primary: false,
        }
    }

    /// Same physical output with the same geometry. A monitor whose geometry
    /// changed is a different descriptor and gets a fresh dock.
    pub fn same_descriptor(&self, other: &MonitorInfo) -> bool {
        self.id == other.id && self.rect == other.rect
    }
}

/// Difference between two monitor enumerations
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MonitorDelta {
    pub added: Vec<MonitorInfo>,
    pub removed: Vec<MonitorInfo>,
}

impl MonitorDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute which descriptors disappeared and which appeared between two
/// enumerations. Order follows the input lists.
pub fn diff(previous: &[MonitorInfo], current: &[MonitorInfo]) -> MonitorDelta {
    let removed = previous
        .iter()
        .filter(|old| !current.iter().any(|new| new.same_descriptor(old)))
        .cloned()
        .collect();
    let added = current
        .iter()
        .filter(|new| !previous.iter().any(|old| old.same_descriptor(new)))
        .cloned()
        .collect();

    MonitorDelta { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: &str, x: i32, width: u32) -> MonitorInfo {
        MonitorInfo::new(id, Rect::new(x, 0, width, 1080))
    }

    #[test]
    fn diff_detects_unplug_and_plug() {
        let before = vec![monitor("A", 0, 1920), monitor("B", 1920, 1920)];
        let after = vec![monitor("A", 0, 1920), monitor("C", 1920, 2560)];

        let delta = diff(&before, &after);
        assert_eq!(delta.removed, vec![monitor("B", 1920, 1920)]);
        assert_eq!(delta.added, vec![monitor("C", 1920, 2560)]);
    }

    #[test]
    fn diff_treats_resolution_change_as_replace() {
        let before = vec![monitor("A", 0, 1920)];
        let after = vec![monitor("A", 0, 2560)];

        let delta = diff(&before, &after);
        assert_eq!(delta.removed.len(), 1);
        assert_eq!(delta.added.len(), 1);
        assert_eq!(delta.added[0].rect.width, 2560);
    }

    #[test]
    fn diff_of_identical_lists_is_empty() {
        let list = vec![monitor("A", 0, 1920)];
        assert!(diff(&list, &list).is_empty());
    }
}
