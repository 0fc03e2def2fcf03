use super::*;

/// Parent value marking an invalidated component slot awaiting compaction.
///
/// Leaves are never invalid, and the `parent[i] + leaf_count > i` ordering
/// keeps component `0` out of any component's parent slot during
/// single-tile construction, so the value is unambiguous there.
pub(crate) const INVALID_PARENT: NodeT = 0;

/// Connected-component tree over a flat arena.
///
/// A single index space identifies every node: indices below
/// `leaf_count` are leaves (one per pixel), the rest are components. The
/// parent array stores component indices; the value `root_mark()` marks a
/// root. Levels are non-decreasing along every leaf-to-root path.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree<W: Weight> {
    pub(crate) leaf_count: NodeT,
    pub(crate) node_count: NodeT,
    pub(crate) node_capacity: NodeT,
    pub(crate) invalid_count: NodeT,
    pub(crate) root_count: NodeT,
    pub(crate) parent: Vec<NodeT>,
    pub(crate) leaf_level: Vec<W>,
    pub(crate) comp_level: Vec<W>,
    pub(crate) child_offset: Vec<NodeT>,
    pub(crate) children: Vec<NodeT>,
}

/// # Arena storage and low level mutation.
impl<W: Weight> Tree<W> {
    /// Allocates an arena for `leaf_count` leaves and up to
    /// `comp_capacity` components, every leaf a singleton root.
    pub(crate) fn with_capacity(leaf_count: NodeT, comp_capacity: NodeT) -> Tree<W> {
        Tree {
            leaf_count,
            node_count: leaf_count,
            node_capacity: leaf_count + comp_capacity,
            invalid_count: 0,
            root_count: leaf_count,
            parent: vec![comp_capacity; (leaf_count + comp_capacity) as usize],
            leaf_level: vec![W::default(); leaf_count as usize],
            comp_level: vec![W::default(); comp_capacity as usize],
            child_offset: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parent value marking a root.
    pub(crate) fn root_mark(&self) -> NodeT {
        self.node_capacity - self.leaf_count
    }

    /// Appends a fresh root component at the given level and returns its
    /// node index.
    pub(crate) fn alloc_component(&mut self, level: W) -> NodeT {
        assert!(
            self.node_count < self.node_capacity,
            "The tree arena is full: all {} component slots are in use.",
            self.root_mark()
        );
        let n = self.node_count;
        self.node_count += 1;
        self.comp_level[(n - self.leaf_count) as usize] = level;
        self.parent[n as usize] = self.root_mark();
        n
    }
}

/// # Getters.
impl<W: Weight> Tree<W> {
    /// Returns the number of leaves, one per pixel.
    pub fn get_leaves_number(&self) -> NodeT {
        self.leaf_count
    }

    /// Returns the number of components (internal nodes).
    pub fn get_components_number(&self) -> NodeT {
        self.node_count - self.leaf_count
    }

    /// Returns the total number of nodes, leaves included.
    pub fn get_nodes_number(&self) -> NodeT {
        self.node_count
    }

    /// Returns the number of forest roots.
    pub fn get_roots_number(&self) -> NodeT {
        self.root_count
    }

    pub fn is_leaf(&self, node_id: NodeT) -> bool {
        node_id < self.leaf_count
    }

    pub fn is_root(&self, node_id: NodeT) -> bool {
        self.parent[node_id as usize] == self.root_mark()
    }

    /// Returns the parent node of the given node, or `None` for roots.
    pub fn get_parent(&self, node_id: NodeT) -> Option<NodeT> {
        let p = self.parent[node_id as usize];
        if p == self.root_mark() {
            None
        } else {
            Some(p + self.leaf_count)
        }
    }

    /// Returns the raw parent encoding of every node.
    pub fn get_parents(&self) -> &[NodeT] {
        &self.parent
    }

    /// Returns the level at which the given leaf was first merged.
    pub fn get_leaf_level(&self, leaf_id: NodeT) -> W {
        debug_assert!(self.is_leaf(leaf_id));
        self.leaf_level[leaf_id as usize]
    }

    pub fn get_leaf_levels(&self) -> &[W] {
        &self.leaf_level
    }

    /// Returns the level of the given component.
    pub fn get_component_level(&self, component_id: NodeT) -> W {
        self.comp_level[component_id as usize]
    }

    pub fn get_component_levels(&self) -> &[W] {
        &self.comp_level
    }

    /// Returns the level of a node, leaf or component.
    pub fn get_node_level(&self, node_id: NodeT) -> W {
        if self.is_leaf(node_id) {
            self.leaf_level[node_id as usize]
        } else {
            self.comp_level[(node_id - self.leaf_count) as usize]
        }
    }
}

/// # Finalisation: redirect resolution, compaction, child lists.
impl<W: Weight> Tree<W> {
    /// Resolves the redirect map left behind by same-layer fusion,
    /// rewriting every surviving parent through it and marking absorbed
    /// slots invalid.
    ///
    /// The map is compressed in place. Chasing is order-agnostic: the
    /// parallel merge may redirect towards lower indices, unlike the
    /// sequential sweep whose targets always sit higher.
    pub(crate) fn resolve_redirects(&mut self, redirect: &mut [NodeT]) {
        if self.invalid_count == 0 {
            return;
        }
        let lc = self.leaf_count as usize;
        let cc = (self.node_count - self.leaf_count) as usize;
        let mark = self.root_mark() as usize;
        debug_assert!(redirect.len() > mark);
        debug_assert_eq!(redirect[mark], mark as NodeT);
        for i in 0..cc {
            let mut r = redirect[i];
            while redirect[r as usize] != r {
                r = redirect[r as usize];
            }
            let mut c = i as NodeT;
            while c != r {
                let next = redirect[c as usize];
                redirect[c as usize] = r;
                c = next;
            }
        }
        for c in 0..cc {
            let n = lc + c;
            if redirect[c] == c as NodeT {
                self.parent[n] = redirect[self.parent[n] as usize];
            } else {
                self.parent[n] = INVALID_PARENT;
            }
        }
        for i in 0..lc {
            self.parent[i] = redirect[self.parent[i] as usize];
        }
    }

    /// Removes the slots the redirect map marks as absorbed and renumbers
    /// the survivors densely, stably ordered by level.
    ///
    /// Sequential construction already allocates components in level
    /// order, making the sort the identity there; after a parallel merge
    /// it restores the `parent[i] + leaf_count > i` ordering that
    /// cross-tile links break. Returns the old-to-new component lut.
    ///
    /// Running this on an already compact tree leaves it byte-identical.
    pub(crate) fn compact(&mut self, redirect: &[NodeT]) -> Vec<NodeT> {
        let lc = self.leaf_count as usize;
        let cc = (self.node_count - self.leaf_count) as usize;
        let old_mark = self.root_mark() as usize;
        let mut surviving: Vec<NodeT> = (0..cc as NodeT)
            .filter(|&c| redirect[c as usize] == c)
            .collect();
        surviving.sort_by(|&a, &b| {
            self.comp_level[a as usize].cmp_weight(&self.comp_level[b as usize])
        });
        let new_cc = surviving.len();
        let mut lut = vec![0 as NodeT; old_mark + 1];
        for (new, &old) in surviving.iter().enumerate() {
            lut[old as usize] = new as NodeT;
        }
        lut[old_mark] = new_cc as NodeT;
        let mut new_parent = Vec::with_capacity(new_cc);
        let mut new_level = Vec::with_capacity(new_cc);
        for &old in &surviving {
            new_parent.push(lut[self.parent[lc + old as usize] as usize]);
            new_level.push(self.comp_level[old as usize]);
        }
        for i in 0..lc {
            self.parent[i] = lut[self.parent[i] as usize];
        }
        self.parent.truncate(lc);
        self.parent.extend_from_slice(&new_parent);
        self.comp_level = new_level;
        self.node_count = (lc + new_cc) as NodeT;
        self.node_capacity = self.node_count;
        self.invalid_count = 0;
        let new_mark = new_cc as NodeT;
        for i in 0..lc {
            self.leaf_level[i] = if self.parent[i] == new_mark {
                W::default()
            } else {
                self.comp_level[self.parent[i] as usize]
            };
        }
        self.root_count = self
            .parent
            .iter()
            .filter(|&&p| p == new_mark)
            .count() as NodeT;
        lut
    }

    /// Rewrites a caller-supplied edge-to-component table through a
    /// redirect map or a compaction lut.
    pub(crate) fn update_component_indices(&self, map: &[NodeT], edge_comps: &mut [NodeT]) {
        for entry in edge_comps.iter_mut() {
            *entry = map[*entry as usize];
        }
    }

    /// Builds the prefix-summed child lists.
    ///
    /// Children of component `c` end up in
    /// `children[child_offset[c] .. child_offset[c + 1])`, buckets sorted
    /// by node index (leaves first). The extra bucket at index
    /// `comp_count` gathers the forest roots, so a pseudo-root can be
    /// iterated exactly like any component.
    pub fn build_children(&mut self) {
        debug_assert_eq!(self.invalid_count, 0);
        let n = self.node_count as usize;
        let cc = (self.node_count - self.leaf_count) as usize;
        let mark = self.root_mark();
        let mut offsets = vec![0 as NodeT; cc + 3];
        for i in 0..n {
            let bucket = if self.parent[i] == mark {
                cc
            } else {
                self.parent[i] as usize
            };
            offsets[bucket + 2] += 1;
        }
        for j in 3..cc + 3 {
            offsets[j] += offsets[j - 1];
        }
        let mut children = vec![0 as NodeT; n];
        for i in 0..n {
            let bucket = if self.parent[i] == mark {
                cc
            } else {
                self.parent[i] as usize
            };
            children[offsets[bucket + 1] as usize] = i as NodeT;
            offsets[bucket + 1] += 1;
        }
        offsets.truncate(cc + 2);
        self.child_offset = offsets;
        self.children = children;
    }
}

/// # Iteration.
impl<W: Weight> Tree<W> {
    /// Returns the children of a component; `comp_count` addresses the
    /// pseudo-root holding the forest roots.
    pub fn get_children(&self, component_id: NodeT) -> &[NodeT] {
        let begin = self.child_offset[component_id as usize] as usize;
        let end = self.child_offset[component_id as usize + 1] as usize;
        &self.children[begin..end]
    }

    pub fn get_child_offsets(&self) -> &[NodeT] {
        &self.child_offset
    }

    /// Returns the forest roots (the pseudo-root bucket).
    pub fn get_roots(&self) -> &[NodeT] {
        self.get_children(self.get_components_number())
    }

    /// Calls `component_f` on every component child and then `leaf_f` on
    /// every leaf child of the given component, components first.
    pub fn for_each_child<C, L>(&self, component_id: NodeT, mut component_f: C, mut leaf_f: L)
    where
        C: FnMut(NodeT),
        L: FnMut(NodeT),
    {
        let bucket = self.get_children(component_id);
        // buckets are sorted by node index, leaves first
        let split = bucket.partition_point(|&node| node < self.leaf_count);
        for &node in &bucket[split..] {
            component_f(node);
        }
        for &node in &bucket[..split] {
            leaf_f(node);
        }
    }

    /// Depth-first traversal of the whole forest.
    ///
    /// `pre` and `post` run on components on the way down and up, `leaf_f`
    /// on every leaf. Uses an explicit stack: level chains can be as deep
    /// as the arena.
    pub fn for_each_dfs<Pre, Post, L>(&self, mut pre: Pre, mut post: Post, mut leaf_f: L)
    where
        Pre: FnMut(NodeT),
        Post: FnMut(NodeT),
        L: FnMut(NodeT),
    {
        let mut stack: Vec<(NodeT, usize)> = Vec::new();
        for &root in self.get_roots() {
            if self.is_leaf(root) {
                leaf_f(root);
                continue;
            }
            pre(root);
            stack.push((root, 0));
            while let Some(&(node, cursor)) = stack.last() {
                let bucket = self.get_children(node - self.leaf_count);
                if cursor < bucket.len() {
                    stack.last_mut().unwrap().1 += 1;
                    let child = bucket[cursor];
                    if self.is_leaf(child) {
                        leaf_f(child);
                    } else {
                        pre(child);
                        stack.push((child, 0));
                    }
                } else {
                    post(node);
                    stack.pop();
                }
            }
        }
    }

    /// Returns the height of the forest: leaves count zero, every
    /// component one more than its highest child.
    pub fn get_height(&self) -> NodeT {
        debug_assert_eq!(self.invalid_count, 0);
        let lc = self.leaf_count as usize;
        let n = self.node_count as usize;
        let mark = self.root_mark();
        let mut heights = vec![0 as NodeT; n - lc];
        let mut height = 0;
        for i in 0..n {
            let h = if i < lc { 0 } else { heights[i - lc] };
            if self.parent[i] == mark {
                height = height.max(h);
            } else {
                let p = self.parent[i] as usize;
                debug_assert!(p + lc > i);
                heights[p] = heights[p].max(h + 1);
            }
        }
        height
    }

    /// Returns the number of components with no child at all or a lone
    /// component child.
    pub fn get_degenerate_components_number(&self) -> NodeT {
        let lc = self.leaf_count as usize;
        let cc = (self.node_count - self.leaf_count) as usize;
        let mark = self.root_mark();
        let mut child_counts = vec![0 as NodeT; cc];
        let mut comp_child_counts = vec![0 as NodeT; cc];
        for i in 0..self.node_count as usize {
            let p = self.parent[i];
            if p == mark {
                continue;
            }
            child_counts[p as usize] += 1;
            if i >= lc {
                comp_child_counts[p as usize] += 1;
            }
        }
        (0..cc)
            .filter(|&c| {
                child_counts[c] == 0 || (child_counts[c] == 1 && comp_child_counts[c] == 1)
            })
            .count() as NodeT
    }

    /// Returns the level at which the two leaves fall into the same
    /// component, walking both paths towards their lowest common
    /// ancestor.
    ///
    /// Both leaves must share a root.
    pub fn get_merge_level(&self, a: NodeT, b: NodeT) -> Option<W> {
        debug_assert!(self.is_leaf(a));
        debug_assert!(self.is_leaf(b));
        if a == b {
            return Some(self.get_leaf_level(a));
        }
        let mut a = self.get_parent(a)?;
        let mut b = self.get_parent(b)?;
        // parents always sit at higher indices, so advancing the lower
        // node converges at the lowest common ancestor
        while a != b {
            if a < b {
                a = self.get_parent(a)?;
            } else {
                b = self.get_parent(b)?;
            }
        }
        Some(self.get_component_level(a - self.leaf_count))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utilities::*;
    use super::*;

    #[test]
    fn test_compaction_is_idempotent() {
        let edges = vec![(0, 1, 0u8), (1, 2, 0), (3, 4, 1), (2, 3, 2)];
        let tree = build_from_edge_list(5, &edges).unwrap();
        let mut again = tree.clone();
        let mark = again.root_mark() as usize;
        let mut identity: Vec<NodeT> = (0..=mark as NodeT).collect();
        again.resolve_redirects(&mut identity);
        again.compact(&identity);
        assert_eq!(tree, again);
    }

    #[test]
    fn test_children_buckets_sum_to_node_count() {
        let edges = vec![(0, 1, 0u8), (1, 2, 1), (3, 4, 1), (2, 3, 2)];
        let tree = build_from_edge_list(5, &edges).unwrap();
        let cc = tree.get_components_number();
        let mut total = 0;
        for c in 0..=cc {
            total += tree.get_children(c).len() as NodeT;
        }
        assert_eq!(total, tree.get_nodes_number());
        assert_eq!(
            tree.get_roots().len() as NodeT,
            tree.get_roots_number()
        );
    }

    #[test]
    fn test_dfs_visits_every_node_once() {
        let edges = vec![(0, 1, 0u8), (1, 2, 1), (3, 4, 1), (2, 3, 2)];
        let tree = build_from_edge_list(5, &edges).unwrap();
        let mut pre = 0;
        let mut post = 0;
        let mut leaves = 0;
        tree.for_each_dfs(|_| pre += 1, |_| post += 1, |_| leaves += 1);
        assert_eq!(pre, tree.get_components_number());
        assert_eq!(post, tree.get_components_number());
        assert_eq!(leaves, tree.get_leaves_number());
    }

    #[test]
    fn test_component_then_leaf_iteration_is_split_correctly() {
        let edges = vec![(0, 1, 0u8), (1, 2, 1), (3, 4, 1), (2, 3, 2)];
        let tree = build_from_edge_list(5, &edges).unwrap();
        for c in 0..=tree.get_components_number() {
            tree.for_each_child(
                c,
                |node| assert!(!tree.is_leaf(node)),
                |node| assert!(tree.is_leaf(node)),
            );
        }
    }
}
