//! Run report: what one scheduler run did.

use serde::{Deserialize, Serialize};

use super::ids::RunId;
use super::task::TaskId;

/// Serializable summary of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,

    /// Tasks the run was asked to materialize.
    pub goals: Vec<TaskId>,

    /// Tasks whose artifact already existed, in planning order.
    pub reused: Vec<TaskId>,

    /// Tasks whose function ran, in execution order.
    pub executed: Vec<TaskId>,
}

impl RunReport {
    pub fn new(run_id: RunId, goals: Vec<TaskId>) -> Self {
        Self {
            run_id,
            goals,
            reused: Vec::new(),
            executed: Vec::new(),
        }
    }

    /// Number of task functions invoked by the run.
    pub fn invocations(&self) -> usize {
        self.executed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_roundtrip_json() {
        let mut report = RunReport::new(RunId::generate(), vec![TaskId::new("combine")]);
        report.reused.push(TaskId::new("download"));
        report.executed.push(TaskId::new("combine"));

        let s = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&s).unwrap();
        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.invocations(), 1);
        assert_eq!(back.reused, vec![TaskId::new("download")]);
        assert_eq!(back.goals, report.goals);
    }
}
