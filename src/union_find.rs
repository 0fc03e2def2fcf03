use super::*;

/// Disjoint-set forest over leaf indices with the rank of every root
/// packed into its parent slot.
///
/// `parent[i] < len` links `i` to its parent; `parent[i] >= len` marks a
/// root of rank `parent[i] - len`. Every root carries the handle of the
/// tree node currently representing its component in a parallel `data`
/// array.
#[derive(Clone, Debug)]
pub struct RootFinder {
    pub(crate) parent: Vec<NodeT>,
    pub(crate) data: Vec<NodeT>,
}

impl RootFinder {
    /// Creates a union-find over the given number of leaves, each leaf a
    /// singleton root of rank zero carrying itself as handle.
    pub fn new(leaves_number: NodeT) -> RootFinder {
        RootFinder {
            parent: vec![leaves_number; leaves_number as usize],
            data: (0..leaves_number).collect(),
        }
    }

    pub fn get_leaves_number(&self) -> NodeT {
        self.parent.len() as NodeT
    }

    fn is_root(&self, i: NodeT) -> bool {
        self.parent[i as usize] >= self.get_leaves_number()
    }

    /// Follows parent links from `i` up to the root of its set.
    pub fn find(&self, mut i: NodeT) -> NodeT {
        let len = self.get_leaves_number();
        debug_assert!(i < len);
        while self.parent[i as usize] < len {
            i = self.parent[i as usize];
        }
        i
    }

    /// Rewrites every entry on the path from `i` to the root `h`
    /// (single-pass path compression).
    pub fn update(&mut self, mut i: NodeT, h: NodeT) {
        let len = self.get_leaves_number();
        debug_assert!(i < len);
        debug_assert!(h < len);
        debug_assert!(self.is_root(h));
        while self.parent[i as usize] < len {
            let next = self.parent[i as usize];
            self.parent[i as usize] = h;
            i = next;
        }
        debug_assert_eq!(i, h);
    }

    pub fn find_update(&mut self, i: NodeT) -> NodeT {
        let h = self.find(i);
        self.update(i, h);
        h
    }

    /// Merges the sets rooted at `a` and `b`, returning the new root.
    ///
    /// Union by rank; equal ranks pick the lower index and increment its
    /// rank. Calling this on non-roots or with `a == b` is a programming
    /// error.
    pub fn merge(&mut self, mut a: NodeT, mut b: NodeT) -> NodeT {
        let len = self.get_leaves_number();
        debug_assert_ne!(a, b);
        debug_assert!(self.is_root(a));
        debug_assert!(self.is_root(b));
        if self.parent[a as usize] < self.parent[b as usize] {
            std::mem::swap(&mut a, &mut b);
        } else if self.parent[a as usize] == self.parent[b as usize] {
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            debug_assert!(self.parent[a as usize] < NodeT::MAX);
            self.parent[a as usize] += 1;
        }
        debug_assert!(len <= self.parent[a as usize]);
        self.parent[b as usize] = a;
        a
    }

    /// Merges two sets and stores the handle of the merged component on
    /// the surviving root.
    pub fn merge_set(&mut self, a: NodeT, b: NodeT, handle: NodeT) -> NodeT {
        let h = self.merge(a, b);
        self.data[h as usize] = handle;
        h
    }

    /// Handle of the tree node associated with the root `h`.
    pub fn get_data(&self, h: NodeT) -> NodeT {
        self.data[h as usize]
    }

    pub fn set_data(&mut self, h: NodeT, handle: NodeT) {
        self.data[h as usize] = handle;
    }
}
