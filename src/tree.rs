//! Forest of tasks stored as an arena.
//!
//! Every task lives in a flat table keyed by id, with an ordered child-id list
//! per entry and an ordered list of root ids. Children are owned through these
//! lists only; `Task::parent_id` is a back-reference kept in sync for lookups
//! and breadcrumbs.
//!
//! Every operation, including conversion to and from the nested
//! [`TaskNode`] shape, walks with an explicit stack instead of recursing, so
//! it behaves the same at any nesting depth. Operations targeting an unknown
//! id are silent no-ops that report what they did through their return value.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::{Error, Result};
use crate::task::{Task, TaskId, TaskNode, TaskPatch};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    task: Task,
    children: Vec<TaskId>,
}

/// Ordered collection of task trees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    entries: HashMap<TaskId, Entry>,
    roots: Vec<TaskId>,
}

impl Forest {
    pub fn new() -> Self {
        Forest::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Root ids in display order.
    pub fn roots(&self) -> &[TaskId] {
        &self.roots
    }

    /// Child ids of `id` in display order; empty for leaves and unknown ids.
    pub fn children_of(&self, id: TaskId) -> &[TaskId] {
        self.entries
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// A known task with no children.
    pub fn is_leaf(&self, id: TaskId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.children.is_empty())
    }

    pub fn max_id(&self) -> Option<TaskId> {
        self.entries.keys().copied().max()
    }

    pub fn find_by_id(&self, id: TaskId) -> Option<&Task> {
        self.entries.get(&id).map(|e| &e.task)
    }

    /// Case-insensitive name lookup, in depth-first order.
    pub fn find_by_name(&self, name: &str) -> Vec<&Task> {
        let needle = name.trim().to_lowercase();
        self.walk()
            .into_iter()
            .map(|(_, t)| t)
            .filter(|t| t.name.to_lowercase() == needle)
            .collect()
    }

    /// Apply `patch` to the task with `id`. Returns false if no such task.
    pub fn update_by_id(&mut self, id: TaskId, patch: &TaskPatch) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.task.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the task with `id` and its whole subtree.
    ///
    /// Returns the number of tasks removed, zero when `id` is unknown.
    pub fn delete_by_id(&mut self, id: TaskId) -> usize {
        let Some(entry) = self.entries.get(&id) else {
            return 0;
        };
        match entry.task.parent_id {
            Some(parent) => {
                if let Some(p) = self.entries.get_mut(&parent) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.entries.remove(&current) {
                removed += 1;
                stack.extend(entry.children);
            }
        }
        removed
    }

    /// Append `task` as the last child of `parent_id`, or as the last root
    /// when `parent_id` is `None`.
    ///
    /// Does nothing and returns false when the parent is unknown or when the
    /// task's id is already taken. The stored `parent_id` always names the
    /// actual owner.
    pub fn insert_child(&mut self, parent_id: Option<TaskId>, mut task: Task) -> bool {
        if self.entries.contains_key(&task.id) {
            return false;
        }
        match parent_id {
            Some(parent) => match self.entries.get_mut(&parent) {
                Some(p) => p.children.push(task.id),
                None => return false,
            },
            None => self.roots.push(task.id),
        }
        task.parent_id = parent_id;
        self.entries.insert(
            task.id,
            Entry {
                task,
                children: Vec::new(),
            },
        );
        true
    }

    /// Every task depth-first in display order, paired with its depth
    /// (roots are depth 0).
    pub fn walk(&self) -> Vec<(usize, &Task)> {
        let mut out = Vec::with_capacity(self.entries.len());
        let mut stack: Vec<(usize, TaskId)> = self.roots.iter().rev().map(|&id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            let Some(entry) = self.entries.get(&id) else {
                continue;
            };
            out.push((depth, &entry.task));
            stack.extend(entry.children.iter().rev().map(|&c| (depth + 1, c)));
        }
        out
    }

    /// All leaf tasks, depth-first in display order.
    ///
    /// This is the population burndown aggregation runs over: a task that
    /// currently has children is never part of it.
    pub fn collect_leaves(&self) -> Vec<&Task> {
        self.walk()
            .into_iter()
            .map(|(_, t)| t)
            .filter(|t| self.is_leaf(t.id))
            .collect()
    }

    /// Names of the ancestors of `id`, outermost first. Empty for roots and
    /// unknown ids.
    pub fn ancestor_chain(&self, id: TaskId) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.find_by_id(id).and_then(|t| t.parent_id);
        while let Some(pid) = current {
            let Some(parent) = self.find_by_id(pid) else {
                break;
            };
            chain.push(parent.name.clone());
            if chain.len() > self.entries.len() {
                break; // cycle guard
            }
            current = parent.parent_id;
        }
        chain.reverse();
        chain
    }

    /// Sum of the leaf estimates in the subtree rooted at `id`.
    pub fn subtree_estimate(&self, id: TaskId) -> f64 {
        let mut total = 0.0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(entry) = self.entries.get(&current) else {
                continue;
            };
            if entry.children.is_empty() {
                total += entry.task.estimate;
            } else {
                stack.extend(entry.children.iter().copied());
            }
        }
        total
    }

    /// Number of tasks strictly below `id`.
    pub fn descendant_count(&self, id: TaskId) -> usize {
        let mut count = 0;
        let mut stack: Vec<TaskId> = self.children_of(id).to_vec();
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children_of(current));
        }
        count
    }

    /// Check the structural invariants: every entry is reachable from the
    /// roots exactly once and every back-reference names the real owner.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<(Option<TaskId>, TaskId)> = self.roots.iter().map(|&r| (None, r)).collect();
        while let Some((owner, id)) = stack.pop() {
            if !seen.insert(id) {
                return false;
            }
            let Some(entry) = self.entries.get(&id) else {
                return false;
            };
            if entry.task.id != id || entry.task.parent_id != owner {
                return false;
            }
            stack.extend(entry.children.iter().map(|&c| (Some(id), c)));
        }
        seen.len() == self.entries.len()
    }

    /// Nested copy of the whole forest.
    pub fn to_nodes(&self) -> Vec<TaskNode> {
        self.roots.iter().filter_map(|&id| self.node(id)).collect()
    }

    /// Nested copy of the subtree rooted at `id`, built bottom-up.
    pub fn node(&self, id: TaskId) -> Option<TaskNode> {
        // (entry, index of the next child to visit, finished children)
        let mut stack: Vec<(&Entry, usize, Vec<TaskNode>)> = vec![(self.entries.get(&id)?, 0, Vec::new())];
        loop {
            let frame = stack.last_mut()?;
            if let Some(&child) = frame.0.children.get(frame.1) {
                frame.1 += 1;
                if let Some(entry) = self.entries.get(&child) {
                    stack.push((entry, 0, Vec::with_capacity(entry.children.len())));
                }
                continue;
            }
            let (entry, _, children) = stack.pop()?;
            let node = TaskNode::from_parts(&entry.task, children);
            match stack.last_mut() {
                Some(parent) => parent.2.push(node),
                None => return Some(node),
            }
        }
    }

    /// Build a forest from its nested shape.
    ///
    /// Ownership follows the nesting; stale `parentId` back-references are
    /// corrected. Duplicate ids are rejected.
    pub fn from_nodes(nodes: Vec<TaskNode>) -> Result<Forest> {
        let mut forest = Forest::new();
        let mut stack: Vec<(Option<TaskId>, TaskNode)> = nodes.into_iter().rev().map(|n| (None, n)).collect();
        while let Some((owner, node)) = stack.pop() {
            let (task, children) = node.into_parts();
            let id = task.id;
            if task.parent_id != owner {
                warn!(task_id = id, stored = ?task.parent_id, actual = ?owner, "correcting stale parent reference");
            }
            if !forest.insert_child(owner, task) {
                return Err(Error::DuplicateId(id));
            }
            stack.extend(children.into_iter().rev().map(|c| (Some(id), c)));
        }
        Ok(forest)
    }
}
