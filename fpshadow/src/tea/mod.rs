//! Generalized expressions.
//!
//! Every time an operation site runs, its result carries a [`Stem`](crate::shadow::Stem): the
//! exact history that produced it. A [`Tea`] folds all the stems seen at one site into a
//! single expression that every one of them is an instance of. Structure the stems disagree
//! on is cut back to leaves, leaves that ever changed value become variables, and positions
//! that always held equal values share a variable.

mod display;
mod generalize;


pub use display::RenderedTea;

use crate::shadow::ShadowValue;
use crate::site::SiteId;
use fpshadow_ops::ShadowOp;
use internment::Intern;
use std::collections::{HashMap, VecDeque};

/// Index of a node in its tea's arena
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(usize);

/// A path of argument indices from a branch down to one of its descendants. The empty path is
/// the branch itself.
pub type NodePos = Intern<Vec<u8>>;

/// Identifies a set of positions believed to always hold the same value
pub type ClassId = usize;

#[derive(Clone, Debug)]
pub enum TeaNode {
    Leaf(TeaLeaf),
    Branch(TeaBranch),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeaLeaf {
    /// The bits of the one value seen here, or `None` once two different values have been seen
    pub constant: Option<u64>,
}

impl TeaLeaf {
    pub fn is_variable(&self) -> bool {
        self.constant.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct TeaBranch {
    pub op: ShadowOp,
    pub site: SiteId,
    children: Vec<NodeId>,
    classes: HashMap<NodePos, ClassId>,
    next_class: ClassId,
}

impl TeaBranch {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The equivalence class of a position relative to this branch
    pub fn class_of(&self, pos: &[u8]) -> Option<ClassId> {
        self.classes.get(&Intern::new(pos.to_vec())).copied()
    }

    /// Number of distinct classes over this branch's positions
    pub fn class_count(&self) -> usize {
        let mut ids: Vec<ClassId> = self.classes.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn positions(&self) -> usize {
        self.classes.len()
    }
}

/// The generalized expression of one operation site.
#[derive(Clone, Debug)]
pub struct Tea {
    nodes: Vec<TeaNode>,
    root: NodeId,
}

impl Tea {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TeaNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TeaNode {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, node: TeaNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn root_branch(&self) -> Option<&TeaBranch> {
        match self.node(self.root) {
            TeaNode::Branch(b) => Some(b),
            TeaNode::Leaf(_) => None,
        }
    }

    /// The node at a path from the root, if the tea still has structure there
    pub fn node_at(&self, path: &[u8]) -> Option<NodeId> {
        let mut id = self.root;
        for idx in path {
            match self.node(id) {
                TeaNode::Branch(b) => id = *b.children.get(*idx as usize)?,
                TeaNode::Leaf(_) => return None,
            }
        }
        Some(id)
    }

    /// Number of nodes reachable from the root
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            count += 1;
            if let TeaNode::Branch(b) = self.node(id) {
                queue.extend(b.children.iter().copied());
            }
        }
        count
    }

    /// Sites of the operations nested inside this tea, breadth first, at most `max_depth` levels
    /// below the root. The root's own site is not included unless it recurs below.
    pub fn descendant_sites(&self, max_depth: usize) -> Vec<SiteId> {
        let mut sites = Vec::new();
        let mut queue = VecDeque::from([(self.root, 0usize)]);
        while let Some((id, depth)) = queue.pop_front() {
            let TeaNode::Branch(branch) = self.node(id) else {
                continue;
            };
            if depth >= max_depth {
                continue;
            }
            for child in &branch.children {
                if let TeaNode::Branch(b) = self.node(*child) {
                    sites.push(b.site);
                    queue.push_back((*child, depth + 1));
                }
            }
        }
        sites
    }

    /// A negated variable is exact, so there is nothing interesting to report about it
    pub fn is_bare_negation(&self) -> bool {
        match self.root_branch() {
            Some(b) if b.op == ShadowOp::Neg && b.children.len() == 1 => matches!(
                self.node(b.children[0]),
                TeaNode::Leaf(leaf) if leaf.is_variable()
            ),
            _ => false,
        }
    }
}

/// Where a site is in generalizing its expression. Sites only ever move forward through these.
#[derive(Clone, Debug, Default)]
pub enum TeaState {
    #[default]
    Untead,
    /// Exactly one stem has been seen, and the tea is that stem
    Seeded(Tea),
    /// Several stems have been folded together
    Generalized(Tea),
}

impl TeaState {
    pub fn tea(&self) -> Option<&Tea> {
        match self {
            TeaState::Untead => None,
            TeaState::Seeded(tea) | TeaState::Generalized(tea) => Some(tea),
        }
    }

    /// Folds the history of `value` into this state
    pub fn fold(&mut self, value: &ShadowValue, max_depth: usize) {
        match std::mem::take(self) {
            TeaState::Untead => *self = TeaState::Seeded(Tea::seed(value, max_depth)),
            TeaState::Seeded(mut tea) | TeaState::Generalized(mut tea) => {
                tea.merge(value);
                *self = TeaState::Generalized(tea);
            }
        }
    }
}
