//! Dynamic bounding-volume tree over axis-aligned boxes.
//!
//! Nodes live in a flat arena. Leaves carry a payload; branch boxes always
//! enclose both children. Insertion picks a sibling with the surface-area
//! growth heuristic, then refits every ancestor. The tree only grows: the
//! collision placer never removes a placed leaf.

use super::Aabb;

#[derive(Clone, Debug)]
enum NodeKind<T> {
    Leaf(T),
    Branch { left: usize, right: usize },
}

#[derive(Clone, Debug)]
struct TreeNode<T> {
    aabb: Aabb,
    parent: Option<usize>,
    kind: NodeKind<T>,
}

/// Incrementally built AABB tree
#[derive(Clone, Debug)]
pub struct AabbTree<T> {
    nodes: Vec<TreeNode<T>>,
    root: Option<usize>,
    leaf_count: usize,
}

impl<T> AabbTree<T> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            leaf_count: 0,
        }
    }

    /// Create with pre-allocated capacity for `leaves` leaves
    pub fn with_capacity(leaves: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(leaves.saturating_mul(2)),
            root: None,
            leaf_count: 0,
        }
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Box enclosing every leaf, if any
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.map(|r| self.nodes[r].aabb)
    }

    /// Insert a box with its payload
    pub fn insert(&mut self, aabb: Aabb, value: T) {
        let leaf = self.nodes.len();
        self.nodes.push(TreeNode {
            aabb,
            parent: None,
            kind: NodeKind::Leaf(value),
        });
        self.leaf_count += 1;

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return;
        };

        let sibling = self.find_sibling(root, &aabb);

        // Splice a new branch between the sibling and its former parent
        let old_parent = self.nodes[sibling].parent;
        let enclosing = self.nodes[sibling].aabb.merged(&aabb);
        let branch = self.nodes.len();
        self.nodes.push(TreeNode {
            aabb: enclosing,
            parent: old_parent,
            kind: NodeKind::Branch { left: sibling, right: leaf },
        });
        self.nodes[sibling].parent = Some(branch);
        self.nodes[leaf].parent = Some(branch);

        match old_parent {
            None => self.root = Some(branch),
            Some(p) => {
                if let NodeKind::Branch { left, right } = &mut self.nodes[p].kind {
                    if *left == sibling {
                        *left = branch;
                    } else {
                        *right = branch;
                    }
                }
            }
        }

        self.refit(old_parent);
    }

    /// Descend from `start` towards the cheapest sibling for `aabb`
    fn find_sibling(&self, start: usize, aabb: &Aabb) -> usize {
        let mut index = start;
        loop {
            let NodeKind::Branch { left, right } = self.nodes[index].kind else {
                return index;
            };

            let area = self.nodes[index].aabb.surface_area();
            let combined = self.nodes[index].aabb.merged(aabb).surface_area();

            // Cost of pairing with this node, and the growth pushed onto ancestors
            let cost_here = 2.0 * combined;
            let inheritance = 2.0 * (combined - area);

            let cost_left = self.descend_cost(left, aabb) + inheritance;
            let cost_right = self.descend_cost(right, aabb) + inheritance;

            if cost_here < cost_left && cost_here < cost_right {
                return index;
            }
            index = if cost_left < cost_right { left } else { right };
        }
    }

    fn descend_cost(&self, child: usize, aabb: &Aabb) -> f64 {
        let node = &self.nodes[child];
        let merged = node.aabb.merged(aabb).surface_area();
        match node.kind {
            NodeKind::Leaf(_) => merged,
            NodeKind::Branch { .. } => merged - node.aabb.surface_area(),
        }
    }

    /// Recompute branch boxes from `start` up to the root
    fn refit(&mut self, start: Option<usize>) {
        let mut current = start;
        while let Some(index) = current {
            if let NodeKind::Branch { left, right } = self.nodes[index].kind {
                let refitted = self.nodes[left].aabb.merged(&self.nodes[right].aabb);
                self.nodes[index].aabb = refitted;
            }
            current = self.nodes[index].parent;
        }
    }

    /// True if any stored box overlaps the interior of `aabb`
    pub fn overlaps_any(&self, aabb: &Aabb) -> bool {
        let Some(root) = self.root else {
            return false;
        };

        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(_) => return true,
                NodeKind::Branch { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        false
    }

    /// Payloads of every stored box overlapping `aabb`
    pub fn query(&self, aabb: &Aabb) -> Vec<&T> {
        let mut hits = Vec::new();
        let Some(root) = self.root else {
            return hits;
        };

        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(value) => hits.push(value),
                NodeKind::Branch { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        hits
    }

    /// Number of levels (0 for an empty tree, 1 for a single leaf)
    pub fn height(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut max_depth = 0;
        let mut stack = vec![(root, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let NodeKind::Branch { left, right } = self.nodes[index].kind {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }
}

impl<T> Default for AabbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
