use super::*;
use std::cmp::Ordering;

/// Incremental alpha-tree construction over a sorted edge stream.
///
/// Two leaves share a component at level `alpha` iff some path between
/// them never exceeds weight `alpha`. The builder consumes edges in
/// non-decreasing weight order, lifting lower components under fresh ones
/// and fusing components born in the same weight layer through a redirect
/// map that compaction resolves at the end.
pub struct AlphaTreeBuilder<W: Weight> {
    pub(crate) tree: Tree<W>,
    pub(crate) finder: RootFinder,
    pub(crate) redirect: Vec<NodeT>,
    layer_begin: NodeT,
    layer_level: W,
    layer_started: bool,
    root_count: NodeT,
}

impl<W: Weight> AlphaTreeBuilder<W> {
    /// Creates a builder over the given number of leaves.
    ///
    /// The arena is sized to the full binary bound of `2 * leaves - 1`
    /// nodes up front.
    pub fn new(leaves_number: NodeT) -> Result<AlphaTreeBuilder<W>, String> {
        if leaves_number > NodeT::MAX / 2 {
            return Err(format!(
                "The requested number of leaves ({}) does not leave room for the component arena.",
                leaves_number
            ));
        }
        let comp_capacity = leaves_number.saturating_sub(1);
        Ok(AlphaTreeBuilder {
            tree: Tree::with_capacity(leaves_number, comp_capacity),
            finder: RootFinder::new(leaves_number),
            redirect: (0..=comp_capacity).collect(),
            layer_begin: leaves_number,
            layer_level: W::default(),
            layer_started: false,
            root_count: leaves_number,
        })
    }

    /// Returns the number of forest roots still standing.
    pub fn get_roots_number(&self) -> NodeT {
        self.root_count
    }

    /// Returns the node currently representing the component of the
    /// given leaf.
    pub fn get_component_of(&mut self, leaf_id: NodeT) -> NodeT {
        let h = self.finder.find_update(leaf_id);
        self.finder.get_data(h)
    }

    /// Feeds one edge of the sorted stream.
    ///
    /// Returns the node the two endpoints were merged under, or `None`
    /// when the edge closes a cycle inside an existing component. Edges
    /// must arrive in non-decreasing weight order.
    pub fn add_edge(&mut self, a: NodeT, b: NodeT, weight: W) -> Option<NodeT> {
        debug_assert_ne!(a, b);
        debug_assert!(self.tree.is_leaf(a));
        debug_assert!(self.tree.is_leaf(b));
        // advance the layer watermark
        if !self.layer_started {
            self.layer_started = true;
            self.layer_level = weight;
            self.layer_begin = self.tree.node_count;
        } else {
            debug_assert_ne!(weight.cmp_weight(&self.layer_level), Ordering::Less);
            if weight.cmp_weight(&self.layer_level) == Ordering::Greater {
                self.layer_level = weight;
                self.layer_begin = self.tree.node_count;
            }
        }
        let ha = self.finder.find_update(a);
        let hb = self.finder.find_update(b);
        if ha == hb {
            return None;
        }
        let mut na = self.finder.get_data(ha);
        let mut nb = self.finder.get_data(hb);
        debug_assert!(self.tree.is_root(na));
        debug_assert!(self.tree.is_root(nb));
        // higher index means higher (or equal) level here: components are
        // allocated in layer order
        if na < nb {
            std::mem::swap(&mut na, &mut nb);
        }
        // lift: a node from an older layer gets a fresh parent at the
        // current weight
        if na < self.layer_begin {
            let n = self.tree.alloc_component(weight);
            self.tree.parent[na as usize] = n - self.tree.leaf_count;
            na = n;
        }
        debug_assert!(!self.tree.is_leaf(na));
        debug_assert_eq!(
            self.tree
                .get_component_level(na - self.tree.leaf_count)
                .cmp_weight(&weight),
            Ordering::Equal
        );
        self.tree.parent[nb as usize] = na - self.tree.leaf_count;
        if nb >= self.layer_begin {
            // a sibling component of the same layer: fold it into na at
            // finalisation
            self.tree.invalid_count += 1;
            self.redirect[(nb - self.tree.leaf_count) as usize] = na - self.tree.leaf_count;
        }
        self.root_count -= 1;
        self.finder.merge_set(ha, hb, na);
        Some(na)
    }

    /// Resolves redirects, compacts the arena and optionally builds the
    /// child lists.
    pub fn finish(mut self, child_list: bool) -> Tree<W> {
        self.tree.resolve_redirects(&mut self.redirect);
        self.tree.compact(&self.redirect);
        if child_list {
            self.tree.build_children();
        }
        self.tree
    }

    /// Like [`Self::finish`], additionally rewriting a caller-supplied
    /// edge-to-component table through the redirect map and the
    /// compaction lut so that the labels stay valid in the final arena.
    pub fn finish_with_edge_components(
        mut self,
        edge_comps: &mut [NodeT],
        child_list: bool,
    ) -> Tree<W> {
        self.tree.resolve_redirects(&mut self.redirect);
        self.tree.update_component_indices(&self.redirect, edge_comps);
        let lut = self.tree.compact(&self.redirect);
        self.tree.update_component_indices(&lut, edge_comps);
        if child_list {
            self.tree.build_children();
        }
        self.tree
    }

    /// Hands the arena, union-find and redirect map over to the parallel
    /// merge machinery.
    pub(crate) fn into_parts(self) -> (Tree<W>, RootFinder, Vec<NodeT>) {
        (self.tree, self.finder, self.redirect)
    }
}
