use crate::shadow::{ShadowValue, Stem};
use crate::tea::{ClassId, NodeId, NodePos, Tea, TeaBranch, TeaLeaf, TeaNode};
use internment::Intern;
use std::collections::{HashMap, HashSet, VecDeque};

/// The value a stem held at one live position of the tea
struct Observation {
    path: Vec<u8>,
    value: u64,
    branch: Option<NodeId>,
}

enum Step {
    Leaf,
    Descend(Vec<NodeId>),
    Truncate,
}

fn child_path(path: &[u8], idx: usize) -> Vec<u8> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(idx as u8);
    child
}

impl Tea {
    /// A tea describing exactly the history of `value`, cut off `max_depth` operations down
    pub fn seed(value: &ShadowValue, max_depth: usize) -> Tea {
        let mut tea = Tea {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let mut observed = Vec::new();
        let mut queue: VecDeque<(&ShadowValue, Option<NodeId>, Vec<u8>)> =
            VecDeque::from([(value, None, Vec::new())]);
        while let Some((value, parent, path)) = queue.pop_front() {
            let bits = value.concrete_bits();
            let (node, args) = match value.stem() {
                Some(Stem::Branch { op, site, args, .. }) if path.len() < max_depth => (
                    TeaNode::Branch(TeaBranch {
                        op: *op,
                        site: *site,
                        children: Vec::with_capacity(args.len()),
                        classes: HashMap::new(),
                        next_class: 0,
                    }),
                    args.as_slice(),
                ),
                _ => (
                    TeaNode::Leaf(TeaLeaf {
                        constant: Some(bits),
                    }),
                    [].as_slice(),
                ),
            };
            let is_branch = matches!(node, TeaNode::Branch(_));
            let id = tea.push(node);
            match parent {
                Some(parent) => {
                    if let TeaNode::Branch(b) = tea.node_mut(parent) {
                        b.children.push(id);
                    }
                }
                None => tea.root = id,
            }
            for (idx, arg) in args.iter().enumerate() {
                queue.push_back((arg, Some(id), child_path(&path, idx)));
            }
            observed.push(Observation {
                path,
                value: bits,
                branch: is_branch.then_some(id),
            });
        }
        tea.refine(&observed);
        tea
    }

    /// Generalizes this tea just enough to also describe the history of `value`.
    ///
    /// The walk is breadth first over the tea, which is already depth bounded, so the depth of
    /// the incoming history does not matter.
    pub fn merge(&mut self, value: &ShadowValue) {
        let mut observed = Vec::new();
        let mut queue: VecDeque<(NodeId, &ShadowValue, Option<(NodeId, usize)>, Vec<u8>)> =
            VecDeque::from([(self.root, value, None, Vec::new())]);
        while let Some((id, value, slot, path)) = queue.pop_front() {
            let bits = value.concrete_bits();
            let stem = value.stem();
            let step = match (self.node_mut(id), stem) {
                (TeaNode::Leaf(leaf), _) => {
                    if leaf.constant != Some(bits) {
                        leaf.constant = None;
                    }
                    Step::Leaf
                }
                (TeaNode::Branch(branch), Some(Stem::Branch { op, args, .. }))
                    if branch.op == *op && branch.children.len() == args.len() =>
                {
                    Step::Descend(branch.children.clone())
                }
                (TeaNode::Branch(_), _) => Step::Truncate,
            };
            match step {
                Step::Leaf => observed.push(Observation {
                    path,
                    value: bits,
                    branch: None,
                }),
                Step::Descend(children) => {
                    let args = stem.map(Stem::args).unwrap_or_default();
                    for (idx, (child, arg)) in children.into_iter().zip(args).enumerate() {
                        queue.push_back((child, arg, Some((id, idx)), child_path(&path, idx)));
                    }
                    observed.push(Observation {
                        path,
                        value: bits,
                        branch: Some(id),
                    });
                }
                Step::Truncate => {
                    // Substitute rather than overwrite: the old subtree stays in the arena.
                    let leaf = self.push(TeaNode::Leaf(TeaLeaf { constant: None }));
                    self.replace(slot, leaf);
                    observed.push(Observation {
                        path,
                        value: bits,
                        branch: None,
                    });
                }
            }
        }
        self.refine(&observed);
    }

    fn replace(&mut self, slot: Option<(NodeId, usize)>, with: NodeId) {
        match slot {
            None => self.root = with,
            Some((parent, idx)) => {
                if let TeaNode::Branch(b) = self.node_mut(parent) {
                    b.children[idx] = with;
                }
            }
        }
    }

    /// Hands every live branch the values observed below it, relative to itself
    fn refine(&mut self, observed: &[Observation]) {
        let branch_at: HashMap<&[u8], NodeId> = observed
            .iter()
            .filter_map(|o| o.branch.map(|id| (o.path.as_slice(), id)))
            .collect();
        let mut per_branch: HashMap<NodeId, Vec<(NodePos, u64)>> = HashMap::new();
        for obs in observed {
            for split in 0..=obs.path.len() {
                if let Some(branch) = branch_at.get(&obs.path[..split]) {
                    per_branch
                        .entry(*branch)
                        .or_default()
                        .push((Intern::new(obs.path[split..].to_vec()), obs.value));
                }
            }
        }
        for (id, positions) in per_branch {
            if let TeaNode::Branch(branch) = self.node_mut(id) {
                branch.refine(&positions);
            }
        }
    }
}

impl TeaBranch {
    /// Splits classes whose positions held different values in the latest instance.
    ///
    /// `positions` must be in breadth-first order. Within each old class, the positions that
    /// agree with the first position of the class keep its id, and each other group of equal
    /// values gets a fresh id. Classes are never joined, even if two of them happen to hold
    /// equal values from now on. Positions that no longer exist are forgotten.
    fn refine(&mut self, positions: &[(NodePos, u64)]) {
        let live: HashSet<NodePos> = positions.iter().map(|(pos, _)| *pos).collect();
        self.classes.retain(|pos, _| live.contains(pos));

        let mut assigned: HashMap<(Option<ClassId>, u64), ClassId> = HashMap::new();
        let mut claimed: HashSet<ClassId> = HashSet::new();
        let mut refined = HashMap::with_capacity(positions.len());
        for (pos, value) in positions {
            let old = self.classes.get(pos).copied();
            let next_class = &mut self.next_class;
            let id = *assigned.entry((old, *value)).or_insert_with(|| match old {
                Some(old) if claimed.insert(old) => old,
                _ => {
                    let id = *next_class;
                    *next_class += 1;
                    id
                }
            });
            refined.insert(*pos, id);
        }
        self.classes = refined;
    }
}
