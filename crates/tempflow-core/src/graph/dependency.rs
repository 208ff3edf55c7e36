//! Dependency graph between tasks.
//!
//! Design:
//! - Forward edges: task -> tasks it depends on
//! - Reverse edges: task -> tasks that depend on it
//! - Invariant: edges and reverse_edges are kept in sync
//! - Node order is insertion order; every traversal below is deterministic

use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<TaskId>,

    /// Forward edges: task -> tasks it depends on, in declared order.
    edges: HashMap<TaskId, Vec<TaskId>>,

    /// Reverse edges: task -> tasks that depend on it.
    /// Answers "who is waiting for this task?" without a scan.
    reverse_edges: HashMap<TaskId, Vec<TaskId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node without edges. Adding an existing node is a no-op.
    pub fn add_node(&mut self, task: TaskId) {
        if !self.edges.contains_key(&task) {
            self.edges.insert(task.clone(), Vec::new());
            self.nodes.push(task);
        }
    }

    /// Add a dependency: `task` depends on `depends_on`.
    ///
    /// Both endpoints become nodes. Repeated edges are stored once.
    pub fn add_dependency(&mut self, task: TaskId, depends_on: TaskId) {
        self.add_node(task.clone());
        self.add_node(depends_on.clone());

        let deps = self.edges.entry(task.clone()).or_default();
        if !deps.contains(&depends_on) {
            deps.push(depends_on.clone());
            self.reverse_edges.entry(depends_on).or_default().push(task);
        }
    }

    pub fn nodes(&self) -> &[TaskId] {
        &self.nodes
    }

    /// Dependencies of `task`, in declared order.
    pub fn get_dependencies(&self, task: &TaskId) -> &[TaskId] {
        self.edges.get(task).map(Vec::as_slice).unwrap_or_default()
    }

    /// Tasks that depend directly on `task`.
    pub fn get_waiting_tasks(&self, task: &TaskId) -> &[TaskId] {
        self.reverse_edges
            .get(task)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Nodes nothing depends on.
    pub fn terminal_nodes(&self) -> Vec<TaskId> {
        self.nodes
            .iter()
            .filter(|n| self.get_waiting_tasks(n).is_empty())
            .cloned()
            .collect()
    }

    /// Every task that depends on `task`, directly or transitively, in node order.
    pub fn dependents_closure(&self, task: &TaskId) -> Vec<TaskId> {
        let mut seen: HashSet<&TaskId> = HashSet::new();
        let mut queue: VecDeque<&TaskId> = VecDeque::from([task]);
        while let Some(current) = queue.pop_front() {
            for waiting in self.get_waiting_tasks(current) {
                if seen.insert(waiting) {
                    queue.push_back(waiting);
                }
            }
        }
        self.nodes
            .iter()
            .filter(|n| seen.contains(n))
            .cloned()
            .collect()
    }

    /// Detect a cycle in the graph.
    ///
    /// Three-colour depth-first search: reaching a gray node means the edge
    /// closes a cycle on the current path. The returned path starts and ends
    /// with the same task (`a -> b -> a`). Returns `None` for a DAG.
    pub fn detect_cycle(&self) -> Option<Vec<TaskId>> {
        let mut color: HashMap<&TaskId, Color> =
            self.nodes.iter().map(|n| (n, Color::White)).collect();
        let mut path: Vec<&TaskId> = Vec::new();

        for start in &self.nodes {
            if color[start] == Color::White {
                if let Some(cycle) = self.dfs_cycle(start, &mut color, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn dfs_cycle<'a>(
        &'a self,
        node: &'a TaskId,
        color: &mut HashMap<&'a TaskId, Color>,
        path: &mut Vec<&'a TaskId>,
    ) -> Option<Vec<TaskId>> {
        color.insert(node, Color::Gray);
        path.push(node);

        for dep in self.get_dependencies(node) {
            match color.get(dep).copied().unwrap_or(Color::White) {
                Color::Gray => {
                    let start = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle: Vec<TaskId> =
                        path[start..].iter().map(|n| (*n).clone()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.dfs_cycle(dep, color, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        color.insert(node, Color::Black);
        path.pop();
        None
    }

    /// Dependencies-first order of every node (Kahn's algorithm).
    ///
    /// Ties are broken by node order. Returns the cycle when the graph is not
    /// a DAG.
    pub fn topological_order(&self) -> Result<Vec<TaskId>, Vec<TaskId>> {
        let mut remaining: HashMap<&TaskId, usize> = self
            .nodes
            .iter()
            .map(|n| (n, self.get_dependencies(n).len()))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut placed: HashSet<&TaskId> = HashSet::new();

        while order.len() < self.nodes.len() {
            let next = self
                .nodes
                .iter()
                .find(|n| !placed.contains(n) && remaining[n] == 0);
            let Some(next) = next else {
                return Err(self.detect_cycle().unwrap_or_default());
            };
            placed.insert(next);
            for waiting in self.get_waiting_tasks(next) {
                if let Some(count) = remaining.get_mut(waiting) {
                    *count -= 1;
                }
            }
            order.push(next.clone());
        }
        Ok(order)
    }
}
