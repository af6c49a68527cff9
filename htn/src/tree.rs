//! Solution tree: an arena of plan nodes supporting surgical retraction.
//!
//! Parent links are ids, not owning references, per the arena-of-nodes
//! design the open attribute bag and backtracking notes call for. The
//! engine's recursive continuation-passing search does the actual
//! depth-first exploration; this tree exists so that a failed branch can be
//! truncated in one step and so the tree remains inspectable after a
//! planning failure.

use crate::state::State;
use crate::task::Task;
use crate::task::TaskInvocation;
use crate::temporal::TemporalMetadata;
use htn_backtrack::Backtrack;

/// What a node resolved to, if anything yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Not yet refined (or refinement is in progress higher up the stack).
    Unresolved,
    /// Refined into an ordered list of child tasks via the method at
    /// `method_index` on the owning node.
    Compound,
    /// A primitive action was applied successfully.
    Primitive {
        action: TaskInvocation,
        temporal: Option<TemporalMetadata>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub task: Task,
    pub state_before: State,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// For a compound node: index of the method alternative currently
    /// selected (or tried next on retry).
    pub method_index: usize,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Default)]
pub struct SolutionTree {
    nodes: Vec<Node>,
    saved_marks: Vec<usize>,
}

impl SolutionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task, state_before: State, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            task,
            state_before,
            parent,
            children: Vec::new(),
            method_index: 0,
            resolution: Resolution::Unresolved,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaves in id order, for solution-tree introspection and for
    /// producing the final plan sequence.
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.children.is_empty())
    }

    /// Discards the most recent `save_state` mark without truncating —
    /// the nodes allocated since are kept, the choice point is just no
    /// longer available to roll back to.
    pub fn commit(&mut self) {
        self.saved_marks.pop().expect("commit called with no saved state");
    }
}

impl Backtrack for SolutionTree {
    fn save_state(&mut self) -> u32 {
        self.saved_marks.push(self.nodes.len());
        self.saved_marks.len() as u32
    }

    fn num_saved(&self) -> u32 {
        self.saved_marks.len() as u32
    }

    /// Truncates the arena back to the mark recorded by the matching
    /// `save_state`, dropping every node (and child reference to it)
    /// allocated since.
    fn restore_last(&mut self) {
        let mark = self
            .saved_marks
            .pop()
            .expect("restore_last called with no saved state");
        self.nodes.truncate(mark);
        for node in &mut self.nodes {
            node.children.retain(|&c| c < mark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use crate::temporal::parse_instant;

    fn state() -> State {
        State::new("s", parse_instant("2025-01-01T00:00:00Z").unwrap())
    }

    #[test]
    fn push_links_parent_and_child() {
        let mut tree = SolutionTree::new();
        let root = tree.push(Task::invocation("root", vec![]), state(), None);
        let child = tree.push(Task::invocation("child", vec![]), state(), Some(root));
        assert_eq!(tree.node(root).children, vec![child]);
        assert_eq!(tree.node(child).parent, Some(root));
    }

    #[test]
    fn restore_last_truncates_nodes_and_child_links() {
        let mut tree = SolutionTree::new();
        let root = tree.push(Task::invocation("root", vec![]), state(), None);
        tree.save_state();
        let child = tree.push(Task::invocation("child", vec![]), state(), Some(root));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.node(root).children, vec![child]);

        tree.restore_last();
        assert_eq!(tree.len(), 1);
        assert!(tree.node(root).children.is_empty());
    }

    #[test]
    fn commit_keeps_nodes_but_drops_the_mark() {
        let mut tree = SolutionTree::new();
        tree.push(Task::invocation("root", vec![]), state(), None);
        tree.save_state();
        tree.push(Task::invocation("child", vec![]), state(), None);
        tree.commit();
        assert_eq!(tree.num_saved(), 0);
        assert_eq!(tree.len(), 2);
    }
}
