//! Path-addressed counter store.
//!
//! Counters live in a nested tree addressed by dot-separated paths like
//! `by_op.create.by_etype.house`. Reads of absent paths default to zero,
//! writes create intermediate branches as needed, and nothing here ever
//! panics for a well-formed path string: a run must survive whatever keys
//! the orders throw at it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Outcome;

/// One node of the counter tree: either an integer counter or a branch of
/// named children.
///
/// Serialized untagged, so a snapshot is the natural nested-JSON shape
/// (`{"ok": 3, "by_op": {"create": {...}}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatNode {
    Count(i64),
    Branch(BTreeMap<String, StatNode>),
}

impl StatNode {
    /// An empty branch node.
    pub fn branch() -> Self {
        StatNode::Branch(BTreeMap::new())
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, StatNode::Branch(_))
    }

    /// Direct child by key, `None` on counters.
    pub fn child(&self, key: &str) -> Option<&StatNode> {
        match self {
            StatNode::Branch(children) => children.get(key),
            StatNode::Count(_) => None,
        }
    }

    /// Child counter value; anything that is not a counter reads as zero.
    pub fn count_of(&self, key: &str) -> i64 {
        match self.child(key) {
            Some(StatNode::Count(n)) => *n,
            _ => 0,
        }
    }

    /// Children of a branch node, `None` on counters.
    pub fn children(&self) -> Option<&BTreeMap<String, StatNode>> {
        match self {
            StatNode::Branch(children) => Some(children),
            StatNode::Count(_) => None,
        }
    }
}

/// The counter tree of one accumulator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatTree {
    root: BTreeMap<String, StatNode>,
}

impl StatTree {
    /// A zeroed tree with the fixed top-level counters and the three
    /// dimension roots in place.
    pub fn new() -> Self {
        let mut root = BTreeMap::new();
        root.insert("ok".to_string(), StatNode::Count(0));
        root.insert("fail".to_string(), StatNode::Count(0));
        root.insert("total".to_string(), StatNode::Count(0));
        root.insert("by_op".to_string(), StatNode::branch());
        root.insert("by_etype".to_string(), StatNode::branch());
        root.insert("by_otype".to_string(), StatNode::branch());
        Self { root }
    }

    /// Node at a dot-separated path, `None` when absent at any segment.
    pub fn get(&self, path: &str) -> Option<&StatNode> {
        let mut segments = path.split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Counter value at a path.
    ///
    /// Absent paths and non-counter nodes read as zero, so corrupted or
    /// partial prior state degrades instead of propagating a type error.
    pub fn count(&self, path: &str) -> i64 {
        match self.get(path) {
            Some(StatNode::Count(n)) => *n,
            _ => 0,
        }
    }

    /// Assigns a counter value, creating intermediate branches as needed.
    ///
    /// A counter sitting where an intermediate branch is required gets
    /// replaced by a branch; its value is lost, the alternative being a
    /// failed update.
    pub fn set_count(&mut self, path: &str, value: i64) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = match segments.pop() {
            Some(last) => last,
            None => return,
        };

        let mut children = &mut self.root;
        for segment in segments {
            let entry = children
                .entry(segment.to_string())
                .or_insert_with(StatNode::branch);
            if !entry.is_branch() {
                *entry = StatNode::branch();
            }
            children = match entry {
                StatNode::Branch(children) => children,
                StatNode::Count(_) => unreachable!("intermediate was just made a branch"),
            };
        }
        children.insert(last.to_string(), StatNode::Count(value));
    }

    /// The sole mutation primitive for all counters.
    ///
    /// With an outcome, adds `amount` to `path.total` and to `path.ok` or
    /// `path.fail`, keeping `total == ok + fail` for the node. Without one,
    /// adds `amount` to the counter at `path` itself (a plain running sum).
    pub fn increment(&mut self, path: &str, amount: i64, outcome: Option<Outcome>) {
        match outcome {
            Some(outcome) => {
                self.add(&format!("{path}.total"), amount);
                self.add(&format!("{path}.{}", outcome.key()), amount);
            }
            None => self.add(path, amount),
        }
    }

    fn add(&mut self, path: &str, amount: i64) {
        let current = self.count(path);
        self.set_count(path, current + amount);
    }
}

impl Default for StatTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_is_zeroed() {
        let tree = StatTree::new();
        assert_eq!(tree.count("ok"), 0);
        assert_eq!(tree.count("fail"), 0);
        assert_eq!(tree.count("total"), 0);
        assert!(tree.get("by_op").is_some());
        assert!(tree.get("by_etype").is_some());
        assert!(tree.get("by_otype").is_some());
    }

    #[test]
    fn test_absent_paths_read_zero() {
        let tree = StatTree::new();
        assert_eq!(tree.count("by_op.create.total"), 0);
        assert_eq!(tree.count("nowhere.at.all"), 0);
        assert!(tree.get("by_op.create").is_none());
    }

    #[test]
    fn test_set_count_vivifies_branches() {
        let mut tree = StatTree::new();
        tree.set_count("by_op.create.by_etype.house.total", 3);
        assert_eq!(tree.count("by_op.create.by_etype.house.total"), 3);
        assert!(tree.get("by_op.create.by_etype").is_some());
    }

    #[test]
    fn test_increment_with_outcome_keeps_invariant() {
        let mut tree = StatTree::new();
        tree.increment("by_op.create", 1, Some(Outcome::Ok));
        tree.increment("by_op.create", 1, Some(Outcome::Ok));
        tree.increment("by_op.create", 1, Some(Outcome::Fail));

        assert_eq!(tree.count("by_op.create.total"), 3);
        assert_eq!(tree.count("by_op.create.ok"), 2);
        assert_eq!(tree.count("by_op.create.fail"), 1);
        assert_eq!(
            tree.count("by_op.create.total"),
            tree.count("by_op.create.ok") + tree.count("by_op.create.fail")
        );
    }

    #[test]
    fn test_increment_without_outcome_is_running_sum() {
        let mut tree = StatTree::new();
        tree.increment("photos.total", 3, None);
        tree.increment("photos.total", 2, None);
        assert_eq!(tree.count("photos.total"), 5);
        // no outcome split was created
        assert_eq!(tree.count("photos.total.ok"), 0);
    }

    #[test]
    fn test_counter_in_the_way_becomes_branch() {
        let mut tree = StatTree::new();
        tree.set_count("by_op.create", 7);
        // the counter at by_op.create must not block deeper writes
        tree.increment("by_op.create.by_etype.house", 1, Some(Outcome::Ok));
        assert_eq!(tree.count("by_op.create.by_etype.house.total"), 1);
        assert_eq!(tree.count("by_op.create.by_etype.house.ok"), 1);
    }

    #[test]
    fn test_non_counter_state_coerces_to_zero() {
        let mut tree = StatTree::new();
        tree.increment("by_op.create", 1, Some(Outcome::Ok));
        // "by_op.create" is a branch; reading it as a counter yields zero
        assert_eq!(tree.count("by_op.create"), 0);
        // and adding through it starts from zero instead of erroring
        tree.increment("by_op", 2, None);
        assert_eq!(tree.count("by_op"), 2);
    }

    #[test]
    fn test_degenerate_paths_do_not_panic() {
        let mut tree = StatTree::new();
        tree.increment("", 1, None);
        tree.increment("a..b", 1, Some(Outcome::Fail));
        tree.set_count(".", 1);
        assert_eq!(tree.count("a..b.total"), 1);
    }

    #[test]
    fn test_snapshot_shape() {
        let mut tree = StatTree::new();
        tree.increment("by_op.create", 1, Some(Outcome::Ok));

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["ok"], 0);
        assert_eq!(json["by_op"]["create"]["total"], 1);
        assert_eq!(json["by_op"]["create"]["ok"], 1);

        let restored: StatTree = serde_json::from_value(json).unwrap();
        assert_eq!(restored, tree);
    }
}
