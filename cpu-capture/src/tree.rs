//! Per-thread call trees
//!
//! Nodes live in a single arena owned by [`CaptureTree`] and refer to their
//! children by [`NodeId`]. Each thread owns exactly one root. Thread order is
//! insertion order, which makes every scan over the roots deterministic.

use crate::domain::{ClockType, NodeId, ThreadId, ThreadInfo, TimeRange, TreeError};

/// One recorded activation of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureNode {
    name: String,
    depth: usize,
    wall: TimeRange,
    thread: TimeRange,
    clock_type: ClockType,
    children: Vec<NodeId>,
}

impl CaptureNode {
    /// Create a detached node with both clocks' timestamps.
    ///
    /// New nodes report wall-clock durations until told otherwise.
    pub fn new(name: impl Into<String>, depth: usize, wall: TimeRange, thread: TimeRange) -> Self {
        Self {
            name: name.into(),
            depth,
            wall,
            thread,
            clock_type: ClockType::Wall,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Start timestamp (µs) under the current clock type
    pub fn start(&self) -> i64 {
        self.range().start_us
    }

    /// End timestamp (µs) under the current clock type
    pub fn end(&self) -> i64 {
        self.range().end_us
    }

    /// Duration (µs) under the current clock type
    pub fn duration(&self) -> i64 {
        self.range().length()
    }

    /// Timestamps for the current clock type
    pub fn range(&self) -> TimeRange {
        match self.clock_type {
            ClockType::Wall => self.wall,
            ClockType::Thread => self.thread,
        }
    }

    pub fn wall_range(&self) -> TimeRange {
        self.wall
    }

    pub fn thread_range(&self) -> TimeRange {
        self.thread
    }

    pub fn clock_type(&self) -> ClockType {
        self.clock_type
    }

    pub fn set_clock_type(&mut self, clock_type: ClockType) {
        self.clock_type = clock_type;
    }

    /// Children in call order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Where a node hangs in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Detached,
    Child(NodeId),
    Root,
}

/// Arena of call tree nodes plus the ordered thread -> root mapping
///
/// Every node has at most one owner: one parent, or one thread as its root.
#[derive(Debug, Clone, Default)]
pub struct CaptureTree {
    nodes: Vec<CaptureNode>,
    attachments: Vec<Attachment>,
    roots: Vec<(ThreadInfo, NodeId)>,
}

impl CaptureTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a node into the arena. It stays detached until it is attached
    /// with [`add_child`](Self::add_child) or [`add_thread`](Self::add_thread).
    pub fn push_node(&mut self, node: CaptureNode) -> NodeId {
        self.nodes.push(node);
        self.attachments.push(Attachment::Detached);
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to `parent`'s children.
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidNode`] if either index is not in the arena,
    /// [`TreeError::AlreadyAttached`] if `child` already has a parent or is a
    /// thread root, or [`TreeError::Cycle`] if `child` is `parent` or one of
    /// its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(child)?;
        self.check(parent)?;
        if self.attachments[child.index()] != Attachment::Detached {
            return Err(TreeError::AlreadyAttached(child.index()));
        }
        // Parent links never form a loop, so this walk ends
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(TreeError::Cycle { parent: parent.index(), child: child.index() });
            }
            ancestor = match self.attachments[id.index()] {
                Attachment::Child(up) => Some(up),
                Attachment::Detached | Attachment::Root => None,
            };
        }
        self.attachments[child.index()] = Attachment::Child(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Register `root` as the call tree of `thread`.
    ///
    /// # Errors
    /// Returns [`TreeError::DuplicateThread`] if the thread already has a root,
    /// [`TreeError::InvalidNode`] if `root` is not in the arena, or
    /// [`TreeError::AlreadyAttached`] if `root` already has an owner.
    pub fn add_thread(&mut self, thread: ThreadInfo, root: NodeId) -> Result<(), TreeError> {
        self.check(root)?;
        if self.root(thread.id).is_some() {
            return Err(TreeError::DuplicateThread(thread.id));
        }
        if self.attachments[root.index()] != Attachment::Detached {
            return Err(TreeError::AlreadyAttached(root.index()));
        }
        self.attachments[root.index()] = Attachment::Root;
        self.roots.push((thread, root));
        Ok(())
    }

    fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::InvalidNode(id.index()))
        }
    }

    /// Returns true if no thread has been registered
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of threads
    pub fn thread_count(&self) -> usize {
        self.roots.len()
    }

    /// Number of nodes in the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&CaptureNode> {
        self.nodes.get(id.index())
    }

    /// Thread roots in insertion order
    pub fn roots(&self) -> impl ExactSizeIterator<Item = (&ThreadInfo, NodeId)> {
        self.roots.iter().map(|(info, root)| (info, *root))
    }

    pub fn threads(&self) -> impl ExactSizeIterator<Item = &ThreadInfo> {
        self.roots.iter().map(|(info, _)| info)
    }

    /// Root node of `thread_id`, if the thread is part of this tree
    pub fn root(&self, thread_id: ThreadId) -> Option<NodeId> {
        self.roots.iter().find(|(info, _)| info.id == thread_id).map(|(_, root)| *root)
    }

    /// Walk the subtree under `root` in pre-order
    pub fn preorder(&self, root: NodeId) -> Preorder<'_> {
        let stack = if self.node(root).is_some() { vec![root] } else { Vec::new() };
        Preorder { tree: self, stack }
    }

    /// Set `clock_type` on every node reachable from any thread root.
    ///
    /// Iterative pre-order walk; every reachable node is visited once.
    /// Returns the number of nodes updated.
    pub fn set_clock_type(&mut self, clock_type: ClockType) -> usize {
        let mut visited = 0;
        let mut stack: Vec<NodeId> = Vec::new();
        for (_, root) in &self.roots {
            stack.push(*root);
            while let Some(id) = stack.pop() {
                let node = &mut self.nodes[id.index()];
                node.set_clock_type(clock_type);
                visited += 1;
                stack.extend(node.children.iter().rev().copied());
            }
        }
        log::debug!("Set clock type {clock_type} on {visited} nodes");
        visited
    }
}

/// Pre-order iterator over a subtree, see [`CaptureTree::preorder`]
pub struct Preorder<'a> {
    tree: &'a CaptureTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodeId, &'a CaptureNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id.index()];
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, depth: usize, start: i64, end: i64) -> CaptureNode {
        CaptureNode::new(
            name,
            depth,
            TimeRange::new(start, end),
            TimeRange::new(start, start + (end - start) / 2),
        )
    }

    /// root -> (a -> (a1, a2), b)
    fn sample_tree() -> (CaptureTree, NodeId) {
        let mut tree = CaptureTree::new();
        let root = tree.push_node(node("root", 0, 0, 100));
        let a = tree.push_node(node("a", 1, 0, 60));
        let a1 = tree.push_node(node("a1", 2, 0, 20));
        let a2 = tree.push_node(node("a2", 2, 20, 60));
        let b = tree.push_node(node("b", 1, 60, 100));
        tree.add_child(root, a).unwrap();
        tree.add_child(a, a1).unwrap();
        tree.add_child(a, a2).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_thread(ThreadInfo::new(ThreadId(1), "main", true), root).unwrap();
        (tree, root)
    }

    #[test]
    fn test_node_duration_follows_clock_type() {
        let mut n = node("work", 0, 100, 300);
        assert_eq!(n.duration(), 200);
        n.set_clock_type(ClockType::Thread);
        assert_eq!(n.duration(), 100);
        assert_eq!(n.start(), 100);
        assert_eq!(n.end(), 200);
    }

    #[test]
    fn test_preorder_visits_in_call_order() {
        let (tree, root) = sample_tree();
        let names: Vec<&str> = tree.preorder(root).map(|(_, n)| n.name()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_set_clock_type_reaches_every_node() {
        let (mut tree, root) = sample_tree();
        let visited = tree.set_clock_type(ClockType::Thread);
        assert_eq!(visited, 5);
        assert!(tree.preorder(root).all(|(_, n)| n.clock_type() == ClockType::Thread));
    }

    #[test]
    fn test_duplicate_thread_rejected() {
        let (mut tree, _) = sample_tree();
        let other = tree.push_node(node("other", 0, 0, 10));
        let err = tree.add_thread(ThreadInfo::new(ThreadId(1), "dup", false), other);
        assert_eq!(err, Err(TreeError::DuplicateThread(ThreadId(1))));
        assert_eq!(tree.thread_count(), 1);
    }

    #[test]
    fn test_invalid_node_rejected() {
        let mut tree = CaptureTree::new();
        let root = tree.push_node(node("root", 0, 0, 10));
        assert_eq!(tree.add_child(root, NodeId(5)), Err(TreeError::InvalidNode(5)));
        assert_eq!(
            tree.add_thread(ThreadInfo::new(ThreadId(2), "t", false), NodeId(9)),
            Err(TreeError::InvalidNode(9))
        );
    }

    #[test]
    fn test_self_child_rejected() {
        let mut tree = CaptureTree::new();
        let root = tree.push_node(node("root", 0, 0, 10));
        assert_eq!(tree.add_child(root, root), Err(TreeError::Cycle { parent: 0, child: 0 }));
        assert!(tree.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_ancestor_as_child_rejected() {
        let mut tree = CaptureTree::new();
        let a = tree.push_node(node("a", 0, 0, 10));
        let b = tree.push_node(node("b", 1, 0, 5));
        let c = tree.push_node(node("c", 2, 0, 2));
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();
        // a is detached at the top, so only the ancestor walk can catch this
        assert_eq!(tree.add_child(c, a), Err(TreeError::Cycle { parent: 2, child: 0 }));
        assert_eq!(tree.preorder(a).count(), 3);
    }

    #[test]
    fn test_shared_child_rejected() {
        let (mut tree, root) = sample_tree();
        let other = tree.push_node(node("other", 0, 0, 10));
        let shared = tree.node(root).unwrap().children()[0];
        assert_eq!(
            tree.add_child(other, shared),
            Err(TreeError::AlreadyAttached(shared.index()))
        );
        assert!(tree.node(other).unwrap().children().is_empty());
    }

    #[test]
    fn test_root_cannot_be_shared_or_nested() {
        let (mut tree, root) = sample_tree();
        assert_eq!(
            tree.add_thread(ThreadInfo::new(ThreadId(2), "second", false), root),
            Err(TreeError::AlreadyAttached(root.index()))
        );
        let other = tree.push_node(node("other", 0, 0, 10));
        assert_eq!(tree.add_child(other, root), Err(TreeError::AlreadyAttached(root.index())));
        assert_eq!(tree.thread_count(), 1);
        assert_eq!(tree.set_clock_type(ClockType::Thread), 5);
    }

    #[test]
    fn test_root_lookup() {
        let (tree, root) = sample_tree();
        assert_eq!(tree.root(ThreadId(1)), Some(root));
        assert_eq!(tree.root(ThreadId(99)), None);
        assert!(!tree.is_empty());
        assert_eq!(tree.node_count(), 5);
    }
}
