//! Scheduler - plans and executes a task graph against an artifact store.
//!
//! One run:
//! 1. plan: depth-first from the goals; a task whose artifact exists is
//!    reused and its dependencies are not visited
//! 2. execute: pending tasks one at a time, dependencies first
//! 3. stop at the first failure and name the dependents that never ran

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::{PipelineError, RunId, RunReport, TaskId, TaskInput};
use crate::graph::TaskGraph;
use crate::ports::ArtifactStore;
use crate::task::Task;

pub struct Scheduler {
    store: Arc<dyn ArtifactStore>,
}

/// Planning outcome: what must run, in order, and what is already done.
#[derive(Debug, Default)]
struct Plan {
    pending: Vec<TaskId>,
    reused: Vec<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path.
    InProgress,
    Done,
}

struct Frame {
    id: TaskId,
    deps: Vec<TaskId>,
    next: usize,
}

impl Scheduler {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Materialize every terminal task of the graph.
    pub async fn execute(&self, graph: &TaskGraph) -> Result<RunReport, PipelineError> {
        self.execute_goals(graph, &[]).await
    }

    /// Materialize `goals` and whatever they transitively need.
    ///
    /// An empty slice means the graph's terminal tasks.
    pub async fn execute_goals(
        &self,
        graph: &TaskGraph,
        goals: &[TaskId],
    ) -> Result<RunReport, PipelineError> {
        let goals = if goals.is_empty() {
            graph.terminal_tasks()
        } else {
            goals.to_vec()
        };
        for goal in &goals {
            graph.require(goal)?;
        }

        let run_id = RunId::generate();
        info!(run_id = %run_id, goals = ?goals, "run started");

        let plan = self.plan(graph, &goals).await?;
        for id in &plan.reused {
            info!(run_id = %run_id, task = %id, "artifact exists, task reused");
        }

        let mut report = RunReport::new(run_id, goals);
        report.reused = plan.reused.clone();

        for (pos, id) in plan.pending.iter().enumerate() {
            let task = graph.require(id)?;

            match self.run_task(graph, task.as_ref(), run_id).await {
                Ok(()) => report.executed.push(id.clone()),
                Err(source) => {
                    error!(
                        run_id = %run_id,
                        task = %id,
                        kind = ?source.kind(),
                        error = %source,
                        "task failed"
                    );

                    // Everything after `pos` is still pending.
                    let dependents: HashSet<TaskId> =
                        graph.dependents_closure(id).into_iter().collect();
                    let aborted: Vec<TaskId> = plan.pending[pos + 1..]
                        .iter()
                        .filter(|t| dependents.contains(*t))
                        .cloned()
                        .collect();

                    if aborted.is_empty() {
                        return Err(source);
                    }
                    info!(run_id = %run_id, task = %id, aborted = ?aborted, "dependent tasks aborted");
                    return Err(PipelineError::DependencyFailure {
                        failed: id.clone(),
                        aborted,
                        source: Box::new(source),
                    });
                }
            }
        }

        info!(
            run_id = %run_id,
            executed = report.invocations(),
            reused = report.reused.len(),
            "run finished"
        );
        Ok(report)
    }

    /// Depth-first planning from the goals.
    ///
    /// Pending tasks come out in post-order, which puts every dependency
    /// before its dependents. Existing artifacts cut the search.
    async fn plan(&self, graph: &TaskGraph, goals: &[TaskId]) -> Result<Plan, PipelineError> {
        let mut plan = Plan::default();
        let mut marks: HashMap<TaskId, Mark> = HashMap::new();
        let mut stack: Vec<Frame> = Vec::new();

        for goal in goals {
            if marks.contains_key(goal) {
                continue;
            }
            self.visit(graph, goal, &mut marks, &mut stack, &mut plan)
                .await?;

            while let Some(frame) = stack.last_mut() {
                if frame.next < frame.deps.len() {
                    let dep = frame.deps[frame.next].clone();
                    frame.next += 1;

                    match marks.get(&dep).copied() {
                        None => {
                            self.visit(graph, &dep, &mut marks, &mut stack, &mut plan)
                                .await?
                        }
                        Some(Mark::InProgress) => {
                            // A validated graph is acyclic; this only fires if
                            // a task reports different dependencies than it did
                            // at build time.
                            let start = stack.iter().position(|f| f.id == dep).unwrap_or(0);
                            let mut cycle: Vec<TaskId> =
                                stack[start..].iter().map(|f| f.id.clone()).collect();
                            cycle.push(dep);
                            return Err(PipelineError::Cycle { cycle });
                        }
                        Some(Mark::Done) => {}
                    }
                } else if let Some(done) = stack.pop() {
                    marks.insert(done.id.clone(), Mark::Done);
                    plan.pending.push(done.id);
                }
            }
        }

        debug!(pending = ?plan.pending, reused = ?plan.reused, "plan ready");
        Ok(plan)
    }

    async fn visit(
        &self,
        graph: &TaskGraph,
        id: &TaskId,
        marks: &mut HashMap<TaskId, Mark>,
        stack: &mut Vec<Frame>,
        plan: &mut Plan,
    ) -> Result<(), PipelineError> {
        let task = graph.require(id)?;
        if self.store.exists(&task.output()).await? {
            marks.insert(id.clone(), Mark::Done);
            plan.reused.push(id.clone());
        } else {
            marks.insert(id.clone(), Mark::InProgress);
            stack.push(Frame {
                id: id.clone(),
                deps: task.dependencies(),
                next: 0,
            });
        }
        Ok(())
    }

    async fn run_task(
        &self,
        graph: &TaskGraph,
        task: &dyn Task,
        run_id: RunId,
    ) -> Result<(), PipelineError> {
        let id = task.id();
        let output = task.output();

        let mut inputs = Vec::new();
        for dep in task.dependencies() {
            let artifact = graph.require(&dep)?.output();
            if !self.store.exists(&artifact).await? {
                return Err(PipelineError::ArtifactMissing(artifact));
            }
            let content = self.store.get(&artifact).await?;
            inputs.push(TaskInput::new(artifact, content));
        }

        info!(run_id = %run_id, task = %id, artifact = %output, "task started");
        let content = task.run(&inputs).await?;
        self.store.put(&output, &content).await?;
        info!(
            run_id = %run_id,
            task = %id,
            artifact = %output,
            location = %self.store.locate(&output),
            "task finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::app::PipelineBuilder;
    use crate::domain::{ArtifactId, ErrorKind};
    use crate::impls::InMemoryArtifactStore;
    use crate::task::testing::EchoTask;

    /// Reports no dependencies the first time it is asked, `later` after that.
    struct ShiftingTask {
        asked: AtomicUsize,
        later: TaskId,
    }

    #[async_trait]
    impl Task for ShiftingTask {
        fn id(&self) -> TaskId {
            TaskId::new("a")
        }

        fn dependencies(&self) -> Vec<TaskId> {
            if self.asked.fetch_add(1, Ordering::SeqCst) == 0 {
                Vec::new()
            } else {
                vec![self.later.clone()]
            }
        }

        fn output(&self) -> ArtifactId {
            ArtifactId::new("a.out")
        }

        async fn run(&self, _inputs: &[TaskInput]) -> Result<String, PipelineError> {
            Ok("a".to_string())
        }
    }

    fn t(id: &str) -> TaskId {
        TaskId::new(id)
    }

    /// a <- b <- c, plus an unrelated d
    fn chain(fail: Option<&str>) -> (TaskGraph, HashMap<&'static str, Arc<AtomicUsize>>) {
        let mut calls = HashMap::new();
        let mut builder = PipelineBuilder::new();
        for (id, deps) in [("a", &[][..]), ("b", &["a"][..]), ("c", &["b"][..]), ("d", &[][..])] {
            let mut task = EchoTask::new(id, deps);
            if fail == Some(id) {
                task = task.failing();
            }
            calls.insert(id, Arc::clone(&task.calls));
            builder = builder.register(task).unwrap();
        }
        (builder.build().unwrap(), calls)
    }

    fn count(calls: &HashMap<&str, Arc<AtomicUsize>>, id: &str) -> usize {
        calls[id].load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn runs_dependencies_first_and_feeds_inputs() {
        let (graph, _) = chain(None);
        let store = InMemoryArtifactStore::new();
        let scheduler = Scheduler::new(Arc::new(store.clone()));

        let report = scheduler.execute(&graph).await.unwrap();

        assert_eq!(report.goals, vec![t("c"), t("d")]);
        assert_eq!(report.executed, vec![t("a"), t("b"), t("c"), t("d")]);
        assert!(report.reused.is_empty());
        assert_eq!(
            store.get(&ArtifactId::new("c.out")).await.unwrap(),
            "c(b(a))"
        );
    }

    #[tokio::test]
    async fn second_run_invokes_nothing() {
        let (graph, calls) = chain(None);
        let scheduler = Scheduler::new(Arc::new(InMemoryArtifactStore::new()));

        scheduler.execute(&graph).await.unwrap();
        let report = scheduler.execute(&graph).await.unwrap();

        assert_eq!(report.invocations(), 0);
        assert_eq!(report.reused, vec![t("c"), t("d")]);
        for id in ["a", "b", "c", "d"] {
            assert_eq!(count(&calls, id), 1, "task {id}");
        }
    }

    #[tokio::test]
    async fn existing_artifact_prunes_its_upstream() {
        let (graph, calls) = chain(None);
        let store = InMemoryArtifactStore::new();
        store.seed("b.out", "b(cached)").await;
        let scheduler = Scheduler::new(Arc::new(store.clone()));

        let report = scheduler.execute_goals(&graph, &[t("c")]).await.unwrap();

        assert_eq!(report.reused, vec![t("b")]);
        assert_eq!(report.executed, vec![t("c")]);
        assert_eq!(count(&calls, "a"), 0);
        assert_eq!(
            store.get(&ArtifactId::new("c.out")).await.unwrap(),
            "c(b(cached))"
        );
    }

    #[tokio::test]
    async fn goal_pulls_only_its_dependencies() {
        let (graph, calls) = chain(None);
        let scheduler = Scheduler::new(Arc::new(InMemoryArtifactStore::new()));

        let report = scheduler.execute_goals(&graph, &[t("b")]).await.unwrap();

        assert_eq!(report.executed, vec![t("a"), t("b")]);
        assert_eq!(count(&calls, "c"), 0);
        assert_eq!(count(&calls, "d"), 0);
    }

    #[tokio::test]
    async fn failure_aborts_dependents_and_stops() {
        let (graph, calls) = chain(Some("a"));
        let store = InMemoryArtifactStore::new();
        let scheduler = Scheduler::new(Arc::new(store.clone()));

        let err = scheduler.execute(&graph).await.unwrap_err();

        match &err {
            PipelineError::DependencyFailure { failed, aborted, source } => {
                assert_eq!(failed, &t("a"));
                assert_eq!(aborted, &vec![t("b"), t("c")]);
                assert_eq!(source.kind(), ErrorKind::Network);
            }
            other => panic!("expected dependency failure, got {other:?}"),
        }
        assert_eq!(count(&calls, "b"), 0);
        assert_eq!(count(&calls, "d"), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn completed_work_survives_a_failure() {
        let (graph, _) = chain(Some("c"));
        let store = InMemoryArtifactStore::new();
        let scheduler = Scheduler::new(Arc::new(store.clone()));

        let err = scheduler.execute(&graph).await.unwrap_err();

        // nothing depends on c, so the cause comes back unwrapped
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(store.exists(&ArtifactId::new("a.out")).await.unwrap());
        assert!(store.exists(&ArtifactId::new("b.out")).await.unwrap());
        assert!(!store.exists(&ArtifactId::new("c.out")).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_goal_is_rejected() {
        let (graph, _) = chain(None);
        let scheduler = Scheduler::new(Arc::new(InMemoryArtifactStore::new()));

        let err = scheduler
            .execute_goals(&graph, &[t("nope")])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTask(id) if id == t("nope")));
    }

    #[tokio::test]
    async fn cycle_appearing_after_build_is_caught_while_planning() {
        let graph = PipelineBuilder::new()
            .register(ShiftingTask {
                asked: AtomicUsize::new(0),
                later: t("b"),
            })
            .unwrap()
            .register(EchoTask::new("b", &["a"]))
            .unwrap()
            .build()
            .unwrap();
        let store = InMemoryArtifactStore::new();
        let scheduler = Scheduler::new(Arc::new(store.clone()));

        let err = scheduler.execute(&graph).await.unwrap_err();

        match err {
            PipelineError::Cycle { cycle } => assert_eq!(cycle, vec![t("b"), t("a"), t("b")]),
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(store.is_empty().await);
    }
}
