//! Run identifiers.
//!
//! ULIDs sort by creation time, so run ids in logs and reports line up
//! chronologically.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of one scheduler run.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Ulid);

impl RunId {
    /// Fresh id stamped with the current time.
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_displays_with_prefix() {
        let id = RunId::generate();
        let shown = id.to_string();
        assert!(shown.starts_with("run-"));
        assert_eq!(shown.len(), "run-".len() + 26);
    }

    #[test]
    fn run_ids_are_sortable() {
        let id1 = RunId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RunId::generate();
        assert!(id1 < id2);
    }

    #[test]
    fn run_id_survives_json() {
        let id = RunId::generate();
        let s = serde_json::to_string(&id).unwrap();
        let back: RunId = serde_json::from_str(&s).unwrap();
        assert_eq!(id, back);
    }
}
