use super::*;
use std::cmp::Ordering;

/// # Validators
/// The naming convention we follow is:
/// * `validate_(.+)`
/// * `must_be_(.+)`
/// * `must_have_(.+)`
impl<W: Weight> Tree<W> {
    /// Validates provided node ID.
    ///
    /// # Arguments
    /// * `node_id`: NodeT - node ID to validate.
    pub fn validate_node_id(&self, node_id: NodeT) -> Result<NodeT, String> {
        if node_id >= self.get_nodes_number() {
            return Err(format!(
                "The given node id ({}) is higher than the number of nodes within the tree ({}).",
                node_id,
                self.get_nodes_number()
            ));
        }
        Ok(node_id)
    }

    /// Validates provided component ID.
    ///
    /// # Arguments
    /// * `component_id`: NodeT - component ID to validate.
    pub fn validate_component_id(&self, component_id: NodeT) -> Result<NodeT, String> {
        if component_id >= self.get_components_number() {
            return Err(format!(
                "The given component id ({}) is higher than the number of components within the tree ({}).",
                component_id,
                self.get_components_number()
            ));
        }
        Ok(component_id)
    }

    /// Raises an error if the arena still holds invalidated slots or
    /// spare capacity.
    pub fn must_be_compact(&self) -> Result<(), String> {
        if self.invalid_count != 0 {
            return Err(format!(
                "The current tree instance holds {} invalidated component slots.",
                self.invalid_count
            ));
        }
        if self.node_capacity != self.node_count {
            return Err(format!(
                "The current tree instance has {} unused component slots.",
                self.node_capacity - self.node_count
            ));
        }
        Ok(())
    }

    /// Raises an error if the child lists were not built.
    pub fn must_have_children_lists(&self) -> Result<(), String> {
        if self.child_offset.is_empty() {
            return Err("The current tree instance was built without child lists.".to_string());
        }
        Ok(())
    }

    /// Verifies the structural invariants of a finished tree.
    ///
    /// * parents sit at strictly higher node indices than their children,
    /// * levels never decrease towards the root,
    /// * an alpha/altitude arena holds at most `leaves - 1` components,
    /// * when built, the child lists partition the nodes and the
    ///   pseudo-root bucket holds exactly the forest roots.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.must_be_compact()?;
        let lc = self.leaf_count;
        let cc = self.get_components_number();
        if lc > 0 && cc > lc - 1 {
            return Err(format!(
                "The tree holds {} components, more than its {} leaves allow.",
                cc, lc
            ));
        }
        let mark = self.root_mark();
        let mut roots = 0;
        for i in 0..self.node_count {
            let p = self.parent[i as usize];
            if p == mark {
                roots += 1;
                continue;
            }
            if p >= cc {
                return Err(format!(
                    "Node {} points at component {}, which does not exist.",
                    i, p
                ));
            }
            if (p + lc) <= i {
                return Err(format!(
                    "Node {} has parent node {}, breaking the child-before-parent ordering.",
                    i,
                    p + lc
                ));
            }
            let node_level = self.get_node_level(i);
            if self.comp_level[p as usize].cmp_weight(&node_level) == Ordering::Less {
                return Err(format!(
                    "Node {} sits above its parent {} in level.",
                    i,
                    p + lc
                ));
            }
        }
        if roots != self.root_count {
            return Err(format!(
                "The tree claims {} roots but {} were found.",
                self.root_count, roots
            ));
        }
        if !self.child_offset.is_empty() {
            let mut total = 0;
            for c in 0..cc {
                for &child in self.get_children(c) {
                    if self.get_parent(child) != Some(c + lc) {
                        return Err(format!(
                            "Node {} is listed as a child of component {} but points elsewhere.",
                            child, c
                        ));
                    }
                }
                total += self.get_children(c).len() as NodeT;
            }
            for &root in self.get_roots() {
                if !self.is_root(root) {
                    return Err(format!("Node {} is listed as a root but has a parent.", root));
                }
            }
            total += self.get_roots().len() as NodeT;
            if total != self.node_count {
                return Err(format!(
                    "The child lists cover {} nodes out of {}.",
                    total, self.node_count
                ));
            }
        }
        Ok(())
    }
}
