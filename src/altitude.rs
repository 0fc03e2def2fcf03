use super::*;
use std::cmp::Ordering;

/// Incremental altitude-tree (binary partition tree) construction over a
/// sorted edge stream.
///
/// Every accepted edge allocates one component with exactly the two
/// merged nodes as children, producing a strictly binary hierarchy with
/// `leaves - 1` components. No layer fusion happens during construction;
/// an optional canonicalisation pass collapses equal-level chains
/// afterwards, which yields the alpha-tree shape of the same stream.
pub struct AltitudeTreeBuilder<W: Weight> {
    tree: Tree<W>,
    finder: RootFinder,
    redirect: Vec<NodeT>,
    root_count: NodeT,
}

impl<W: Weight> AltitudeTreeBuilder<W> {
    pub fn new(leaves_number: NodeT) -> Result<AltitudeTreeBuilder<W>, String> {
        if leaves_number > NodeT::MAX / 2 {
            return Err(format!(
                "The requested number of leaves ({}) does not leave room for the component arena.",
                leaves_number
            ));
        }
        let comp_capacity = leaves_number.saturating_sub(1);
        let mut tree = Tree::with_capacity(leaves_number, comp_capacity);
        // children are recorded pairwise during construction
        tree.children = vec![0; 2 * comp_capacity as usize];
        Ok(AltitudeTreeBuilder {
            tree,
            finder: RootFinder::new(leaves_number),
            redirect: (0..=comp_capacity).collect(),
            root_count: leaves_number,
        })
    }

    pub fn get_roots_number(&self) -> NodeT {
        self.root_count
    }

    /// Feeds one edge of the sorted stream; returns the new component or
    /// `None` for cycle-closing edges.
    pub fn add_edge(&mut self, a: NodeT, b: NodeT, weight: W) -> Option<NodeT> {
        debug_assert_ne!(a, b);
        debug_assert!(self.tree.is_leaf(a));
        debug_assert!(self.tree.is_leaf(b));
        let ha = self.finder.find_update(a);
        let hb = self.finder.find_update(b);
        if ha == hb {
            return None;
        }
        let na = self.finder.get_data(ha);
        let nb = self.finder.get_data(hb);
        debug_assert!(self.tree.is_root(na));
        debug_assert!(self.tree.is_root(nb));
        let n = self.tree.alloc_component(weight);
        let c = n - self.tree.leaf_count;
        self.tree.parent[na as usize] = c;
        self.tree.parent[nb as usize] = c;
        self.tree.children[2 * c as usize] = na;
        self.tree.children[2 * c as usize + 1] = nb;
        self.root_count -= 1;
        self.finder.merge_set(ha, hb, n);
        Some(n)
    }

    /// Collapses components sitting at the same level as their parent,
    /// reconnecting their two children upward.
    fn canonicalize(&mut self) {
        let lc = self.tree.leaf_count;
        let mark = self.tree.root_mark();
        for node in (lc..self.tree.node_count).rev() {
            let c = (node - lc) as usize;
            let p = self.tree.parent[node as usize];
            if p == mark {
                continue;
            }
            if self.tree.comp_level[p as usize].cmp_weight(&self.tree.comp_level[c])
                == Ordering::Equal
            {
                let x = self.tree.children[2 * c];
                let y = self.tree.children[2 * c + 1];
                self.tree.parent[x as usize] = p;
                self.tree.parent[y as usize] = p;
                self.redirect[c] = p;
                self.tree.invalid_count += 1;
            }
        }
    }

    /// Compacts the arena and optionally collapses equal-level chains
    /// first and builds the child lists afterwards.
    pub fn finish(mut self, canonicalize: bool, child_list: bool) -> Tree<W> {
        if canonicalize {
            self.canonicalize();
        }
        // the pairwise construction-time children are discarded; the
        // compacted tree gets the uniform prefix-summed lists
        self.tree.children = Vec::new();
        self.tree.compact(&self.redirect);
        if child_list {
            self.tree.build_children();
        }
        self.tree
    }
}
